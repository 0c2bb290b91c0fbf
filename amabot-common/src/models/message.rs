// File: amabot-common/src/models/message.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One historical chat turn in a monitored channel.
///
/// Identifiers are kept as opaque strings; the Discord runtime stores
/// snowflakes in their decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    pub channel_id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl StoredMessage {
    pub fn new(
        id: impl Into<String>,
        channel_id: impl Into<String>,
        author_id: impl Into<String>,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            channel_id: channel_id.into(),
            author_id: author_id.into(),
            content: content.into(),
            created_at,
        }
    }

    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.author_id == user_id
    }
}

/// A message-create event as delivered by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub id: String,
    pub channel_id: String,
    pub author_id: String,
    /// Set when the platform flags the author as an automated account.
    pub author_is_bot: bool,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl InboundMessage {
    pub fn to_stored(&self) -> StoredMessage {
        StoredMessage {
            id: self.id.clone(),
            channel_id: self.channel_id.clone(),
            author_id: self.author_id.clone(),
            content: self.content.clone(),
            created_at: self.created_at,
        }
    }
}
