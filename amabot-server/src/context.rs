// File: amabot-server/src/context.rs
//
// Wires the configured collaborators together once at startup.

use std::sync::Arc;

use tracing::info;

use amabot_ai::{AiClient, Provider, ProviderConfig};
use amabot_common::traits::{ChatPlatform, CompletionApi, WindowStore};
use amabot_core::cache::InMemoryWindowStore;
use amabot_core::config::{BotConfig, CompletionConfig, HistoryBackend};
use amabot_core::db::Database;
use amabot_core::platforms::PlatformWindowStore;
use amabot_core::repositories::SqliteWindowStore;
use amabot_core::services::RelayService;
use amabot_core::Error;

/// Everything the event loop needs.
pub struct ServerContext {
    pub relay: Arc<RelayService>,
    pub db: Option<Database>,
}

impl ServerContext {
    pub async fn new(config: &BotConfig, platform: Arc<dyn ChatPlatform>) -> Result<Self, Error> {
        let (store, db) = build_store(config, platform.clone()).await?;
        let completion = build_completion(&config.completion).await?;

        let relay = RelayService::new(config.relay.clone(), store, platform, completion)?;
        Ok(Self {
            relay: Arc::new(relay),
            db,
        })
    }
}

async fn build_store(
    config: &BotConfig,
    platform: Arc<dyn ChatPlatform>,
) -> Result<(Arc<dyn WindowStore>, Option<Database>), Error> {
    match config.history.backend {
        HistoryBackend::Platform => {
            info!("History is read back from Discord on every turn");
            Ok((Arc::new(PlatformWindowStore::new(platform)), None))
        }
        HistoryBackend::Sqlite => {
            let db = Database::new(&config.history.database_path).await?;
            db.migrate().await?;
            info!("History is stored in {}", config.history.database_path);
            let store = SqliteWindowStore::new(db.pool().clone());
            Ok((Arc::new(store), Some(db)))
        }
        HistoryBackend::Memory => {
            info!("History is kept in memory only");
            Ok((Arc::new(InMemoryWindowStore::new()), None))
        }
    }
}

async fn build_completion(config: &CompletionConfig) -> Result<Arc<dyn CompletionApi>, Error> {
    let provider_config = ProviderConfig::openai(config.api_key.clone(), config.model.clone())
        .with_api_base(config.api_base.clone());

    let provider = Provider::create(provider_config)
        .map_err(|e| Error::Config(e.to_string()))?;
    let registry = Arc::new(Provider::new());
    registry.register(provider).await;

    let client = AiClient::new(registry, "openai").with_timeout(config.timeout);
    Ok(Arc::new(client))
}
