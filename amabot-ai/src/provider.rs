// File: amabot-ai/src/provider.rs

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tokio::sync::RwLock;

use amabot_common::models::RoleMessage;

use crate::models::{ProviderConfig, OPENAI_API_BASE};
use crate::traits::ModelProvider;

/// OpenAI chat-completions provider
pub struct OpenAIProvider {
    config: ProviderConfig,
    client: Client,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with the given configuration
    pub fn new(config: ProviderConfig) -> Self {
        let client = Client::new();
        Self { config, client }
    }

    fn request_payload(&self, messages: &[RoleMessage]) -> serde_json::Value {
        let formatted_messages: Vec<serde_json::Value> = messages
            .iter()
            .map(|msg| {
                json!({
                    "role": msg.role.as_str(),
                    "content": msg.content
                })
            })
            .collect();

        let mut payload = json!({
            "model": self.config.default_model,
            "messages": formatted_messages,
        });

        if let Some(temperature) = self
            .config
            .options
            .get("temperature")
            .and_then(|t| t.parse::<f64>().ok())
        {
            payload["temperature"] = json!(temperature);
        }

        payload
    }
}

/// Pulls the first choice's message content out of a chat-completions body.
pub fn parse_chat_response(response_text: &str) -> anyhow::Result<String> {
    let data = match serde_json::from_str::<serde_json::Value>(response_text) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to parse API response as JSON: {:?}", e);
            return Err(anyhow::anyhow!("API returned non-JSON response: {}", e));
        }
    };

    if let Some(error) = data.get("error") {
        tracing::error!("API returned error: {:?}", error);
        let error_message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error");
        return Err(anyhow::anyhow!("API error: {}", error_message));
    }

    let choices = match data.get("choices").and_then(|c| c.as_array()) {
        Some(choices) => choices,
        None => {
            tracing::error!("Response missing 'choices' array: {:?}", data);
            return Err(anyhow::anyhow!("Response missing 'choices' array"));
        }
    };

    let first = choices
        .first()
        .ok_or_else(|| anyhow::anyhow!("No completions returned"))?;

    let message = first.get("message").ok_or_else(|| {
        tracing::error!("First choice missing 'message': {:?}", first);
        anyhow::anyhow!("Response choice missing 'message'")
    })?;

    let content = message
        .get("content")
        .and_then(|c| c.as_str())
        .ok_or_else(|| anyhow::anyhow!("Response message missing 'content'"))?;

    Ok(content.to_string())
}

#[async_trait]
impl ModelProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat(&self, messages: Vec<RoleMessage>) -> anyhow::Result<String> {
        let api_base = self.config.api_base_or(OPENAI_API_BASE);
        let request_payload = self.request_payload(&messages);

        tracing::debug!(
            "Making API call to {}/chat/completions with {} messages (model={})",
            api_base,
            messages.len(),
            self.config.default_model
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", api_base))
            .bearer_auth(&self.config.api_key)
            .json(&request_payload)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;
        tracing::trace!("Raw API response ({}): {}", status, response_text);

        match parse_chat_response(&response_text) {
            Ok(content) => Ok(content),
            Err(e) if !status.is_success() => {
                Err(anyhow::anyhow!("HTTP {} from completion API: {}", status, e))
            }
            Err(e) => Err(e),
        }
    }
}

/// Registry of AI providers
pub struct Provider {
    providers: Arc<RwLock<HashMap<String, Arc<dyn ModelProvider>>>>,
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            providers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a new provider
    pub async fn register<P: ModelProvider + 'static>(&self, provider: P) {
        let mut providers = self.providers.write().await;
        providers.insert(provider.name().to_string(), Arc::new(provider));
    }

    /// Get a provider by name
    pub async fn get(&self, name: &str) -> Option<Arc<dyn ModelProvider>> {
        let providers = self.providers.read().await;
        providers.get(name).cloned()
    }

    /// Names of all registered providers, sorted
    pub async fn get_all(&self) -> Vec<String> {
        let providers = self.providers.read().await;
        let mut names: Vec<String> = providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Create a provider from a configuration
    pub fn create(config: ProviderConfig) -> anyhow::Result<OpenAIProvider> {
        match config.provider_type.as_str() {
            "openai" => Ok(OpenAIProvider::new(config)),
            other => Err(anyhow::anyhow!("Unsupported provider type: {}", other)),
        }
    }
}
