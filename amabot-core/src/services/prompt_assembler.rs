// File: amabot-core/src/services/prompt_assembler.rs

use amabot_common::models::{RoleMessage, StoredMessage};

use crate::services::window::ConversationWindow;

/// Turns a conversation window into the role-tagged message list sent to the
/// completion API.
///
/// Output order is fixed: configured system entries, then prior messages
/// oldest to newest, then the triggering message. Messages written by the
/// bot's own account become `assistant` turns, everything else `user`.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    system_instructions: Vec<String>,
    bot_user_id: String,
}

impl PromptAssembler {
    pub fn new(system_instructions: Vec<String>, bot_user_id: impl Into<String>) -> Self {
        Self {
            system_instructions,
            bot_user_id: bot_user_id.into(),
        }
    }

    pub fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    pub fn build(&self, history: &[StoredMessage], triggering: &StoredMessage) -> Vec<RoleMessage> {
        let mut out = Vec::with_capacity(self.system_instructions.len() + history.len() + 1);

        out.extend(self.system_instructions.iter().map(|s| RoleMessage::system(s.clone())));
        out.extend(
            history
                .iter()
                .chain(std::iter::once(triggering))
                .map(|m| self.tag(m)),
        );
        out
    }

    pub fn build_window(&self, window: &ConversationWindow) -> Vec<RoleMessage> {
        self.build(window.history(), window.triggering())
    }

    fn tag(&self, message: &StoredMessage) -> RoleMessage {
        if message.is_authored_by(&self.bot_user_id) {
            RoleMessage::assistant(message.content.clone())
        } else {
            RoleMessage::user(message.content.clone())
        }
    }
}
