// File: amabot-core/src/cache/window_cache.rs

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use amabot_common::models::StoredMessage;
use amabot_common::traits::WindowStore;

use crate::Error;

/// Process-local window store. History is lost on restart.
///
/// Each channel's messages are kept sorted by `created_at`; equal timestamps
/// keep insertion order.
#[derive(Clone, Default)]
pub struct InMemoryWindowStore {
    channels: Arc<RwLock<HashMap<String, Vec<StoredMessage>>>>,
}

impl InMemoryWindowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self, channel: &str) -> usize {
        let channels = self.channels.read().await;
        channels.get(channel).map(Vec::len).unwrap_or(0)
    }
}

#[async_trait]
impl WindowStore for InMemoryWindowStore {
    fn owns_history(&self) -> bool {
        true
    }

    async fn append(&self, message: &StoredMessage) -> Result<(), Error> {
        let mut channels = self.channels.write().await;
        let history = channels
            .entry(message.channel_id.clone())
            .or_insert_with(Vec::new);

        if history.iter().any(|m| m.id == message.id) {
            return Ok(());
        }

        let at = history.partition_point(|m| m.created_at <= message.created_at);
        history.insert(at, message.clone());
        Ok(())
    }

    async fn last_n(
        &self,
        channel: &str,
        before: &str,
        n: usize,
    ) -> Result<Vec<StoredMessage>, Error> {
        let channels = self.channels.read().await;
        let Some(history) = channels.get(channel) else {
            return Ok(Vec::new());
        };

        let mut recent: Vec<StoredMessage> = history
            .iter()
            .rev()
            .filter(|m| m.id != before)
            .take(n)
            .cloned()
            .collect();
        recent.reverse();
        Ok(recent)
    }

    async fn prune(&self, channel: &str, keep: usize) -> Result<u64, Error> {
        let mut channels = self.channels.write().await;
        let Some(history) = channels.get_mut(channel) else {
            return Ok(0);
        };

        let excess = history.len().saturating_sub(keep);
        history.drain(..excess);
        Ok(excess as u64)
    }

    async fn forget(&self, channel: &str) -> Result<u64, Error> {
        let mut channels = self.channels.write().await;
        Ok(channels.remove(channel).map(|h| h.len() as u64).unwrap_or(0))
    }
}
