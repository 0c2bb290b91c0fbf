// File: amabot-core/src/services/window.rs

use chrono::{DateTime, Duration, Utc};

use amabot_common::models::StoredMessage;

/// The prior messages of one channel plus the message that triggered the
/// turn, oldest first. The triggering message is always last and the window
/// never holds more than `capacity` messages in total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationWindow {
    history: Vec<StoredMessage>,
    triggering: StoredMessage,
}

impl ConversationWindow {
    /// Builds a window from whatever history the store returned.
    ///
    /// Messages from other channels and copies of the triggering message are
    /// dropped, the rest is ordered by `created_at` (stable, so equal
    /// timestamps keep the store's order) and cut to the newest
    /// `capacity - 1` entries.
    pub fn new(history: Vec<StoredMessage>, triggering: StoredMessage, capacity: usize) -> Self {
        let mut history: Vec<StoredMessage> = history
            .into_iter()
            .filter(|m| m.channel_id == triggering.channel_id && m.id != triggering.id)
            .collect();
        history.sort_by_key(|m| m.created_at);

        let room = capacity.saturating_sub(1);
        let excess = history.len().saturating_sub(room);
        history.drain(..excess);

        Self { history, triggering }
    }

    /// Drops prior messages created more than `max_age` before `now`.
    /// The triggering message is never dropped.
    pub fn retain_fresh(&mut self, now: DateTime<Utc>, max_age: Duration) {
        let cutoff = now - max_age;
        self.history.retain(|m| m.created_at >= cutoff);
    }

    pub fn history(&self) -> &[StoredMessage] {
        &self.history
    }

    pub fn triggering(&self) -> &StoredMessage {
        &self.triggering
    }

    /// Total number of messages, triggering message included.
    pub fn len(&self) -> usize {
        self.history.len() + 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoredMessage> {
        self.history.iter().chain(std::iter::once(&self.triggering))
    }
}
