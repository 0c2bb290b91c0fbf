// File: amabot-common/src/traits/platform_traits.rs

use async_trait::async_trait;

use crate::error::Error;
use crate::models::StoredMessage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

/// The subset of a chat platform the relay talks to.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// The bot's own account id, known once connected.
    fn bot_user_id(&self) -> Option<String>;

    /// Up to `limit` messages posted in `channel` before message `before`,
    /// newest first (the order the platform returns them in).
    async fn fetch_recent_messages(
        &self,
        channel: &str,
        limit: usize,
        before: &str,
    ) -> Result<Vec<StoredMessage>, Error>;

    /// Posts `text` and returns the message the platform created.
    async fn send_message(&self, channel: &str, text: &str) -> Result<StoredMessage, Error>;

    /// Shows a typing indicator. Purely cosmetic.
    async fn start_typing(&self, channel: &str) -> Result<(), Error>;
}
