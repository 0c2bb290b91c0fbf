// File: amabot-core/src/utils/mod.rs

pub mod time;
