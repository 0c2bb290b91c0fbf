// File: amabot-ai/src/traits.rs

use async_trait::async_trait;

use amabot_common::models::RoleMessage;

/// A backend that can turn a role-tagged conversation into a reply.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Registry key of this provider
    fn name(&self) -> &str;

    /// Chat completion; returns the first choice's text
    async fn chat(&self, messages: Vec<RoleMessage>) -> anyhow::Result<String>;
}
