// File: amabot-common/src/traits/api.rs

use async_trait::async_trait;

use crate::error::Error;
use crate::models::RoleMessage;

/// A chat-completion backend.
#[async_trait]
pub trait CompletionApi: Send + Sync {
    /// Sends the ordered conversation and returns the text of the first
    /// completion choice. Any network, quota, auth, or format problem is a
    /// single error.
    async fn complete_chat(&self, messages: Vec<RoleMessage>) -> Result<String, Error>;
}
