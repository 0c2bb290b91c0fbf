// File: amabot-core/src/services/mod.rs

pub mod prompt_assembler;
pub mod relay_service;
pub mod window;

pub use prompt_assembler::PromptAssembler;
pub use relay_service::{RelayOutcome, RelayService, RelayStage, RelayTurn};
pub use window::ConversationWindow;
