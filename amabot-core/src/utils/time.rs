// File: amabot-core/src/utils/time.rs

use chrono::{DateTime, Utc};

/// Convert a UTC timestamp to epoch microseconds.
pub fn to_epoch_micros(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_micros()
}

/// Convert epoch microseconds back to a UTC timestamp.
/// Out-of-range values fall back to 1970-01-01.
pub fn from_epoch_micros(micros: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_micros(micros).unwrap_or_default()
}
