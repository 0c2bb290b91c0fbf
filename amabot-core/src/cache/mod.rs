// File: amabot-core/src/cache/mod.rs

pub mod window_cache;

pub use window_cache::InMemoryWindowStore;
