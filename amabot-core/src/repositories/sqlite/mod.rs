// File: amabot-core/src/repositories/sqlite/mod.rs

pub mod messages;

pub use self::messages::SqliteWindowStore;
