// File: amabot-ai/src/client.rs

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use amabot_common::error::Error;
use amabot_common::models::RoleMessage;
use amabot_common::traits::api::CompletionApi;

use crate::provider::Provider;
use crate::traits::ModelProvider;

/// Default upper bound on a single completion round trip.
pub const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);

/// Represents a client for AI services
pub struct AiClient {
    /// Provider registry for different AI models
    provider: Arc<Provider>,

    /// Default provider to use
    default_provider: String,

    /// Every chat call is cut off after this long
    timeout: Duration,
}

impl AiClient {
    /// Create a new AI client over the given registry
    pub fn new(provider: Arc<Provider>, default_provider: impl Into<String>) -> Self {
        Self {
            provider,
            default_provider: default_provider.into(),
            timeout: DEFAULT_COMPLETION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Chat completion with the default provider
    pub async fn chat(&self, messages: Vec<RoleMessage>) -> anyhow::Result<String> {
        let provider = self.get_provider(None).await?;
        provider.chat(messages).await
    }

    /// Get a provider by name or the default provider
    async fn get_provider(&self, name: Option<&str>) -> anyhow::Result<Arc<dyn ModelProvider>> {
        if let Some(provider_name) = name {
            return self.provider.get(provider_name).await
                .ok_or_else(|| anyhow::anyhow!("Provider not found: {}", provider_name));
        }

        if let Some(provider) = self.provider.get(&self.default_provider).await {
            return Ok(provider);
        }

        // Fall back to whatever is registered first
        let providers = self.provider.get_all().await;
        let first_provider = providers
            .first()
            .ok_or_else(|| anyhow::anyhow!("No AI providers configured"))?;
        self.provider.get(first_provider).await
            .ok_or_else(|| anyhow::anyhow!("Provider not found: {}", first_provider))
    }
}

#[async_trait]
impl CompletionApi for AiClient {
    async fn complete_chat(&self, messages: Vec<RoleMessage>) -> Result<String, Error> {
        debug!("Requesting completion for {} messages", messages.len());

        let reply = tokio::time::timeout(self.timeout, self.chat(messages))
            .await
            .map_err(|elapsed| {
                warn!("Completion call timed out after {:?}", self.timeout);
                Error::Timeout(elapsed)
            })??;

        Ok(reply)
    }
}
