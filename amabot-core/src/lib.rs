// File: amabot-core/src/lib.rs

pub mod cache;
pub mod config;
pub mod db;
pub mod platforms;
pub mod repositories;
pub mod services;
pub mod tasks;
pub mod utils;

pub use amabot_common::error::Error;
pub use config::BotConfig;
pub use db::Database;
