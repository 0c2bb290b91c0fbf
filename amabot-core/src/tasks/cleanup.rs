// File: amabot-core/src/tasks/cleanup.rs

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error};

use amabot_common::traits::WindowStore;

/// Spawns a one-shot task that trims `channel` down to its `keep` newest
/// messages. Errors are logged and otherwise dropped; nothing retries.
///
/// The handle is returned so callers (and tests) can wait for the cleanup,
/// but the relay never does.
pub fn spawn_prune_task(
    store: Arc<dyn WindowStore>,
    channel: String,
    keep: usize,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match store.prune(&channel, keep).await {
            Ok(0) => {}
            Ok(removed) => {
                debug!(target: "amabot::cleanup", "Pruned {} message(s) from channel {}", removed, channel);
            }
            Err(e) => {
                error!(target: "amabot::cleanup", "Failed to prune channel {}: {:?}", channel, e);
            }
        }
    })
}

/// Spawns a one-shot task that discards every stored message of `channel`.
pub fn spawn_forget_task(store: Arc<dyn WindowStore>, channel: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        match store.forget(&channel).await {
            Ok(0) => {}
            Ok(removed) => {
                debug!(target: "amabot::cleanup", "Discarded {} message(s) of unmonitored channel {}", removed, channel);
            }
            Err(e) => {
                error!(target: "amabot::cleanup", "Failed to discard history of channel {}: {:?}", channel, e);
            }
        }
    })
}
