// File: amabot-core/src/platforms/discord/runtime.rs

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use twilight_gateway::{
    self as gateway,
    CloseFrame,
    Config,
    Event,
    EventTypeFlags,
    Intents,
    Shard,
    MessageSender,
    StreamExt,
};
use twilight_http::Client as HttpClient;
use twilight_http::client::ClientBuilder;
use twilight_model::id::marker::{ChannelMarker, MessageMarker};
use twilight_model::gateway::payload::incoming::Ready as ReadyPayload;

use amabot_common::models::{InboundMessage, StoredMessage};
use amabot_common::traits::platform_traits::{ChatPlatform, ConnectionStatus};

use crate::platforms::discord::{parse_snowflake, to_inbound, to_stored, truncate_for_discord};
use crate::platforms::PlatformIntegration;
use crate::Error;

/// Discord caps history requests at this many messages.
const MAX_HISTORY_FETCH: usize = 100;

/// How long `disconnect` waits for shard runners before aborting them.
const SHARD_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// The shard runner:
///   - calls `shard.next_event(...)`
///   - forwards every created message to `tx`; filtering is the relay's job.
async fn shard_runner(mut shard: Shard, tx: UnboundedSender<InboundMessage>) {
    let shard_id = shard.id().number();
    info!("(ShardRunner) Shard {shard_id} started. Listening for events.");

    let wanted = EventTypeFlags::READY | EventTypeFlags::MESSAGE_CREATE;
    while let Some(item) = shard.next_event(wanted).await {
        match item {
            Ok(Event::Ready(ready)) => {
                let data: &ReadyPayload = ready.as_ref();
                info!(
                    "Shard {shard_id} => READY as {} (ID={})",
                    data.user.name, data.user.id
                );
            }
            Ok(Event::MessageCreate(msg_create)) => {
                trace!("Shard {shard_id} => message {} in channel {}", msg_create.id, msg_create.channel_id);
                if tx.send(to_inbound(&msg_create)).is_err() {
                    debug!("Shard {shard_id} => receiver dropped; stopping");
                    break;
                }
            }
            Ok(other) => {
                trace!("Shard {shard_id} => unhandled event: {:?}", other.kind());
            }
            Err(err) => {
                error!("Shard {shard_id} => error receiving event: {err:?}");
            }
        }
    }

    warn!("(ShardRunner) Shard {shard_id} event loop ended.");
}

/// Discord connection: gateway shards feed an unbounded channel of inbound
/// messages, the HTTP client serves history reads and replies.
pub struct DiscordPlatform {
    token: String,
    connection_status: Mutex<ConnectionStatus>,

    /// Receiver side of the inbound channel; `None` until connected.
    rx: Mutex<Option<UnboundedReceiver<InboundMessage>>>,

    shard_tasks: Mutex<Vec<JoinHandle<()>>>,
    shard_senders: Vec<MessageSender>,

    http: Option<Arc<HttpClient>>,
    bot_user_id: Option<String>,
}

impl DiscordPlatform {
    pub fn new(token: String) -> Self {
        Self {
            token,
            connection_status: Mutex::new(ConnectionStatus::Disconnected),
            rx: Mutex::new(None),
            shard_tasks: Mutex::new(Vec::new()),
            shard_senders: Vec::new(),
            http: None,
            bot_user_id: None,
        }
    }

    /// Callers can `await` the next inbound message. Returns `None` once
    /// disconnected or if never connected.
    pub async fn next_message_event(&self) -> Option<InboundMessage> {
        let mut guard = self.rx.lock().await;
        match guard.as_mut() {
            Some(r) => r.recv().await,
            None => None,
        }
    }

    fn http(&self) -> Result<&Arc<HttpClient>, Error> {
        self.http
            .as_ref()
            .ok_or_else(|| Error::Platform("Discord client is not connected".into()))
    }
}

#[async_trait]
impl PlatformIntegration for DiscordPlatform {
    async fn connect(&mut self) -> Result<(), Error> {
        if matches!(*self.connection_status.lock().await, ConnectionStatus::Connected) {
            info!("(DiscordPlatform) Already connected => skipping");
            return Ok(());
        }
        if self.token.is_empty() {
            return Err(Error::Auth("Discord token is empty".into()));
        }

        let http_client = Arc::new(
            ClientBuilder::new()
                .token(self.token.clone())
                .timeout(Duration::from_secs(30))
                .build()
        );

        // Validates the token and learns who we are before any event arrives.
        let me = http_client
            .current_user()
            .await
            .map_err(|e| Error::Auth(format!("Discord rejected the token: {e}")))?
            .model()
            .await
            .map_err(|e| Error::Platform(format!("Error parsing current user: {e}")))?;
        info!("(DiscordPlatform) Authenticated as {} (ID={})", me.name, me.id);
        self.bot_user_id = Some(me.id.to_string());

        let (tx, rx) = unbounded_channel::<InboundMessage>();
        *self.rx.lock().await = Some(rx);

        let config = Config::new(
            self.token.clone(),
            Intents::GUILD_MESSAGES | Intents::MESSAGE_CONTENT,
        );
        let shards = gateway::create_recommended(&http_client, config, |_, b| b.build())
            .await
            .map_err(|e| Error::Platform(format!("create_recommended error: {e}")))?;

        let mut tasks = self.shard_tasks.lock().await;
        for shard in shards {
            self.shard_senders.push(shard.sender());
            let tx_for_shard = tx.clone();
            tasks.push(tokio::spawn(shard_runner(shard, tx_for_shard)));
        }
        drop(tasks);

        self.http = Some(http_client);
        *self.connection_status.lock().await = ConnectionStatus::Connected;
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), Error> {
        *self.connection_status.lock().await = ConnectionStatus::Disconnected;

        for sender in &self.shard_senders {
            let _ = sender.close(CloseFrame::NORMAL);
        }

        let tasks = std::mem::take(&mut *self.shard_tasks.lock().await);
        for mut task in tasks {
            if tokio::time::timeout(SHARD_SHUTDOWN_GRACE, &mut task).await.is_err() {
                warn!("(DiscordPlatform) Shard did not close in time; aborting");
                task.abort();
            }
        }

        *self.rx.lock().await = None;
        Ok(())
    }

    async fn get_connection_status(&self) -> Result<ConnectionStatus, Error> {
        Ok(self.connection_status.lock().await.clone())
    }
}

#[async_trait]
impl ChatPlatform for DiscordPlatform {
    fn bot_user_id(&self) -> Option<String> {
        self.bot_user_id.clone()
    }

    async fn fetch_recent_messages(
        &self,
        channel: &str,
        limit: usize,
        before: &str,
    ) -> Result<Vec<StoredMessage>, Error> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let channel_id = parse_snowflake::<ChannelMarker>(channel)?;
        let before_id = parse_snowflake::<MessageMarker>(before)?;
        let limit = u16::try_from(limit.min(MAX_HISTORY_FETCH)).unwrap_or(100);

        let messages = self
            .http()?
            .channel_messages(channel_id)
            .before(before_id)
            .limit(limit)
            .await
            .map_err(|e| Error::Platform(format!("Error fetching channel history: {e}")))?
            .models()
            .await
            .map_err(|e| Error::Platform(format!("Error parsing channel history: {e}")))?;

        Ok(messages.iter().map(to_stored).collect())
    }

    async fn send_message(&self, channel: &str, text: &str) -> Result<StoredMessage, Error> {
        let channel_id = parse_snowflake::<ChannelMarker>(channel)?;
        let body = truncate_for_discord(text);
        if body.len() < text.len() {
            warn!("Reply to channel {channel} truncated to Discord's message limit");
        }

        let created = self
            .http()?
            .create_message(channel_id)
            .content(body)
            .await
            .map_err(|e| Error::Platform(format!("Error sending Discord message: {e:?}")))?
            .model()
            .await
            .map_err(|e| Error::Platform(format!("Error parsing sent message: {e}")))?;

        Ok(to_stored(&created))
    }

    async fn start_typing(&self, channel: &str) -> Result<(), Error> {
        let channel_id = parse_snowflake::<ChannelMarker>(channel)?;
        self.http()?
            .create_typing_trigger(channel_id)
            .await
            .map_err(|e| Error::Platform(format!("Error triggering typing: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_token_is_rejected_before_any_network_call() {
        let mut platform = DiscordPlatform::new(String::new());
        let err = platform.connect().await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert_eq!(platform.get_connection_status().await.unwrap(), ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn unconnected_platform_has_no_identity_or_events() {
        let platform = DiscordPlatform::new("token".into());
        assert!(platform.bot_user_id().is_none());
        assert!(platform.next_message_event().await.is_none());
        assert!(platform.send_message("1", "hi").await.is_err());
    }
}
