// File: amabot-core/tests/test_utils/helpers.rs
#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Mutex;

use amabot_common::models::{InboundMessage, StoredMessage};
use amabot_common::traits::ChatPlatform;
use amabot_core::config::{ChannelAllowList, RelayConfig};
use amabot_core::{Database, Error};

pub const BOT_ID: &str = "900";
pub const USER_ID: &str = "100";
pub const CHANNEL: &str = "C1";

/// Fixed reference instant so ordering in tests never depends on the clock.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn at(secs: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(secs)
}

pub fn stored(id: &str, channel: &str, author: &str, content: &str, secs: i64) -> StoredMessage {
    StoredMessage::new(id, channel, author, content, at(secs))
}

pub fn inbound(id: &str, channel: &str, author: &str, content: &str, created_at: DateTime<Utc>) -> InboundMessage {
    InboundMessage {
        id: id.to_string(),
        channel_id: channel.to_string(),
        author_id: author.to_string(),
        author_is_bot: false,
        content: content.to_string(),
        created_at,
    }
}

pub fn relay_config(channels: &[&str], systems: &[&str], window_size: usize) -> RelayConfig {
    RelayConfig {
        allowed_channels: ChannelAllowList::new(channels.iter().copied()),
        system_instructions: systems.iter().map(|s| s.to_string()).collect(),
        window_size,
        max_message_age: None,
    }
}

/// Migrated, private in-memory SQLite database.
pub async fn setup_test_database() -> Result<Database, Error> {
    let db = Database::in_memory().await?;
    db.migrate().await?;
    Ok(db)
}

/// In-process stand-in for Discord: serves canned history and records what
/// the relay posts.
pub struct FakePlatform {
    bot_id: Option<String>,
    history: Mutex<Vec<StoredMessage>>,
    sent: Mutex<Vec<(String, String)>>,
    typing: Mutex<Vec<String>>,
    fail_history: bool,
    fail_send: bool,
    next_id: AtomicU64,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            bot_id: Some(BOT_ID.to_string()),
            history: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            typing: Mutex::new(Vec::new()),
            fail_history: false,
            fail_send: false,
            next_id: AtomicU64::new(5000),
        }
    }

    pub fn without_identity(mut self) -> Self {
        self.bot_id = None;
        self
    }

    pub fn failing_history(mut self) -> Self {
        self.fail_history = true;
        self
    }

    pub fn failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }

    /// Seeds history in any order; fetches return it newest first.
    pub async fn seed(&self, messages: Vec<StoredMessage>) {
        self.history.lock().await.extend(messages);
    }

    pub async fn sent_messages(&self) -> Vec<(String, String)> {
        self.sent.lock().await.clone()
    }

    pub async fn typing_channels(&self) -> Vec<String> {
        self.typing.lock().await.clone()
    }
}

#[async_trait]
impl ChatPlatform for FakePlatform {
    fn bot_user_id(&self) -> Option<String> {
        self.bot_id.clone()
    }

    async fn fetch_recent_messages(
        &self,
        channel: &str,
        limit: usize,
        before: &str,
    ) -> Result<Vec<StoredMessage>, Error> {
        if self.fail_history {
            return Err(Error::Platform("history unavailable".into()));
        }
        let mut found: Vec<StoredMessage> = self
            .history
            .lock()
            .await
            .iter()
            .filter(|m| m.channel_id == channel && m.id != before)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found.truncate(limit);
        Ok(found)
    }

    async fn send_message(&self, channel: &str, text: &str) -> Result<StoredMessage, Error> {
        if self.fail_send {
            return Err(Error::Platform("403 Forbidden".into()));
        }
        self.sent.lock().await.push((channel.to_string(), text.to_string()));
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let reply = StoredMessage::new(id.to_string(), channel, BOT_ID, text, Utc::now());
        self.history.lock().await.push(reply.clone());
        Ok(reply)
    }

    async fn start_typing(&self, channel: &str) -> Result<(), Error> {
        self.typing.lock().await.push(channel.to_string());
        Ok(())
    }
}
