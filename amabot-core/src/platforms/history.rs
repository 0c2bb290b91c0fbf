// File: amabot-core/src/platforms/history.rs

use std::sync::Arc;

use async_trait::async_trait;

use amabot_common::models::StoredMessage;
use amabot_common::traits::{ChatPlatform, WindowStore};

use crate::Error;

/// Read-through window store: the chat platform is the source of truth and
/// is queried on every turn. Nothing is written, pruned, or forgotten.
pub struct PlatformWindowStore {
    platform: Arc<dyn ChatPlatform>,
}

impl PlatformWindowStore {
    pub fn new(platform: Arc<dyn ChatPlatform>) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl WindowStore for PlatformWindowStore {
    fn owns_history(&self) -> bool {
        false
    }

    async fn append(&self, _message: &StoredMessage) -> Result<(), Error> {
        Ok(())
    }

    async fn last_n(
        &self,
        channel: &str,
        before: &str,
        n: usize,
    ) -> Result<Vec<StoredMessage>, Error> {
        if n == 0 {
            return Ok(Vec::new());
        }

        // Platform returns newest first.
        let mut messages = self.platform.fetch_recent_messages(channel, n, before).await?;
        messages.retain(|m| m.channel_id == channel && m.id != before);
        messages.truncate(n);
        messages.reverse();
        Ok(messages)
    }

    async fn prune(&self, _channel: &str, _keep: usize) -> Result<u64, Error> {
        Ok(0)
    }

    async fn forget(&self, _channel: &str) -> Result<u64, Error> {
        Ok(0)
    }
}
