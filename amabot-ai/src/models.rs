// File: amabot-ai/src/models.rs

use serde::{Serialize, Deserialize};
use std::collections::HashMap;

/// Base URL of the OpenAI REST API.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Configuration for an AI provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// The type of provider (only "openai" is shipped)
    pub provider_type: String,

    /// Base URL for API requests
    pub api_base: Option<String>,

    /// API key for authentication
    pub api_key: String,

    /// Default model to use with this provider
    pub default_model: String,

    /// Additional provider-specific configuration options
    pub options: HashMap<String, String>,
}

impl ProviderConfig {
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider_type: "openai".to_string(),
            api_base: None,
            api_key: api_key.into(),
            default_model: model.into(),
            options: HashMap::new(),
        }
    }

    pub fn with_api_base(mut self, api_base: Option<String>) -> Self {
        self.api_base = api_base;
        self
    }

    pub fn api_base_or(&self, fallback: &str) -> String {
        self.api_base
            .clone()
            .unwrap_or_else(|| fallback.to_string())
            .trim_end_matches('/')
            .to_string()
    }
}
