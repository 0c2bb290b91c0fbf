// File: amabot-core/src/repositories/mod.rs

pub mod sqlite;

pub use sqlite::messages::SqliteWindowStore;
