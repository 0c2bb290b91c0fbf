// File: amabot-core/src/platforms/mod.rs

use async_trait::async_trait;

use amabot_common::traits::platform_traits::ConnectionStatus;

use crate::Error;

pub mod discord;
pub mod history;

pub use history::PlatformWindowStore;

/// Connection lifecycle of a platform runtime.
#[async_trait]
pub trait PlatformIntegration {
    async fn connect(&mut self) -> Result<(), Error>;
    async fn disconnect(&self) -> Result<(), Error>;
    async fn get_connection_status(&self) -> Result<ConnectionStatus, Error>;
}
