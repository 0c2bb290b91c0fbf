// File: amabot-core/src/services/relay_service.rs
//
// The single entry point for inbound chat messages. One call handles one
// message to completion; calls for different messages may run concurrently
// and share nothing mutable.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use amabot_common::models::{InboundMessage, StoredMessage};
use amabot_common::traits::{ChatPlatform, CompletionApi, WindowStore};

use crate::config::RelayConfig;
use crate::services::prompt_assembler::PromptAssembler;
use crate::services::window::ConversationWindow;
use crate::tasks::cleanup::{spawn_forget_task, spawn_prune_task};
use crate::Error;

/// Where a failed turn stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayStage {
    History,
    Completion,
    Dispatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Exactly one reply with this text was posted.
    Replied(String),
    IgnoredChannel,
    IgnoredSelf,
    IgnoredBot,
    /// The turn was aborted and nothing was posted.
    Failed(RelayStage),
}

/// Result of one call to [`RelayService::handle_message`].
#[derive(Debug)]
pub struct RelayTurn {
    pub outcome: RelayOutcome,
    /// Background cleanup scheduled by this turn, if any.
    pub cleanup: Option<JoinHandle<()>>,
}

impl RelayTurn {
    fn new(outcome: RelayOutcome, cleanup: Option<JoinHandle<()>>) -> Self {
        Self { outcome, cleanup }
    }

    /// Waits for the scheduled cleanup (if any) and returns the outcome.
    pub async fn finish(self) -> RelayOutcome {
        if let Some(handle) = self.cleanup {
            if let Err(e) = handle.await {
                warn!("Cleanup task ended abnormally: {:?}", e);
            }
        }
        self.outcome
    }
}

pub struct RelayService {
    config: RelayConfig,
    assembler: PromptAssembler,
    store: Arc<dyn WindowStore>,
    platform: Arc<dyn ChatPlatform>,
    completion: Arc<dyn CompletionApi>,
}

impl RelayService {
    /// The platform must already be connected so the bot's own identity is known.
    pub fn new(
        config: RelayConfig,
        store: Arc<dyn WindowStore>,
        platform: Arc<dyn ChatPlatform>,
        completion: Arc<dyn CompletionApi>,
    ) -> Result<Self, Error> {
        let bot_user_id = platform
            .bot_user_id()
            .ok_or_else(|| Error::Platform("bot identity unknown; connect the platform first".into()))?;

        if config.window_size == 0 {
            return Err(Error::Config("window size must be at least 1".into()));
        }

        let assembler = PromptAssembler::new(config.system_instructions.clone(), bot_user_id);
        Ok(Self {
            config,
            assembler,
            store,
            platform,
            completion,
        })
    }

    pub fn bot_user_id(&self) -> &str {
        self.assembler.bot_user_id()
    }

    /// Prior messages read per turn. Read-through history asks the platform
    /// for `window_size` messages before the trigger; stored history counts
    /// the trigger, which is itself a stored row, against `window_size`.
    pub fn history_len(&self) -> usize {
        if self.store.owns_history() {
            self.config.window_size - 1
        } else {
            self.config.window_size
        }
    }

    pub async fn handle_message(&self, inbound: &InboundMessage) -> RelayTurn {
        if !self.config.allowed_channels.contains(&inbound.channel_id) {
            trace!("Ignoring message {} in unmonitored channel {}", inbound.id, inbound.channel_id);
            let cleanup = self
                .store
                .owns_history()
                .then(|| spawn_forget_task(self.store.clone(), inbound.channel_id.clone()));
            return RelayTurn::new(RelayOutcome::IgnoredChannel, cleanup);
        }
        if inbound.author_id == self.bot_user_id() {
            return RelayTurn::new(RelayOutcome::IgnoredSelf, None);
        }
        if inbound.author_is_bot {
            debug!("Ignoring bot message {} from {}", inbound.id, inbound.author_id);
            return RelayTurn::new(RelayOutcome::IgnoredBot, None);
        }

        match self.relay(inbound).await {
            Ok(reply) => {
                let cleanup = self.store.owns_history().then(|| {
                    spawn_prune_task(
                        self.store.clone(),
                        inbound.channel_id.clone(),
                        self.config.window_size,
                    )
                });
                RelayTurn::new(RelayOutcome::Replied(reply.content), cleanup)
            }
            Err(stage) => RelayTurn::new(RelayOutcome::Failed(stage), None),
        }
    }

    async fn relay(&self, inbound: &InboundMessage) -> Result<StoredMessage, RelayStage> {
        let channel = inbound.channel_id.as_str();
        let triggering = inbound.to_stored();

        if let Err(e) = self.platform.start_typing(channel).await {
            debug!("Typing indicator failed in channel {}: {:?}", channel, e);
        }

        let window = self.load_window(triggering).await.map_err(|e| {
            error!("Error loading history for channel {}: {:?}", channel, e);
            RelayStage::History
        })?;
        let prompt = self.assembler.build_window(&window);

        info!("Requesting completion for message {} in channel {} ({} window messages)",
              inbound.id, channel, window.len());
        let text = match self.completion.complete_chat(prompt).await {
            Ok(text) if text.trim().is_empty() => {
                error!("Completion for message {} was empty", inbound.id);
                return Err(RelayStage::Completion);
            }
            Ok(text) => text,
            Err(e) => {
                error!("Error: completion for message {} failed: {:?}", inbound.id, e);
                return Err(RelayStage::Completion);
            }
        };

        let reply = self.platform.send_message(channel, &text).await.map_err(|e| {
            error!("Error sending reply to channel {}: {:?}", channel, e);
            RelayStage::Dispatch
        })?;
        info!("Message sent to channel {}.", channel);

        if let Err(e) = self.store.append(&reply).await {
            warn!("Failed to record reply {} in channel {}: {:?}", reply.id, channel, e);
        }

        Ok(reply)
    }

    async fn load_window(&self, triggering: StoredMessage) -> Result<ConversationWindow, Error> {
        self.store.append(&triggering).await?;

        let history_len = self.history_len();
        let history = self
            .store
            .last_n(&triggering.channel_id, &triggering.id, history_len)
            .await?;

        let mut window = ConversationWindow::new(history, triggering, history_len + 1);
        if let Some(max_age) = self.config.max_message_age {
            window.retain_fresh(Utc::now(), max_age);
        }
        Ok(window)
    }
}
