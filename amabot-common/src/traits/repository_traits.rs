// File: amabot-common/src/traits/repository_traits.rs

use async_trait::async_trait;

use crate::error::Error;
use crate::models::StoredMessage;

/// Bounded, per-channel conversation history.
///
/// Every operation is scoped to a single channel; implementations must never
/// read or delete rows that belong to a different channel.
#[async_trait]
pub trait WindowStore: Send + Sync {
    /// Whether this store keeps its own copy of the history. Prune and
    /// forget are only scheduled against stores that do; a read-through view
    /// of the platform's history has nothing to discard.
    fn owns_history(&self) -> bool;

    /// Records a message for its channel. Appending a message id that is
    /// already stored is a no-op.
    async fn append(&self, message: &StoredMessage) -> Result<(), Error>;

    /// At most `n` most-recent messages of `channel`, excluding the message
    /// with id `before`, ordered oldest first.
    async fn last_n(
        &self,
        channel: &str,
        before: &str,
        n: usize,
    ) -> Result<Vec<StoredMessage>, Error>;

    /// Keeps the `keep` most-recent messages of `channel` and discards the
    /// rest. Returns the number of messages removed.
    async fn prune(&self, channel: &str, keep: usize) -> Result<u64, Error>;

    /// Discards all history for `channel`. Returns the number removed.
    async fn forget(&self, channel: &str) -> Result<u64, Error>;
}
