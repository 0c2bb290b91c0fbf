// File: amabot-common/src/models/mod.rs
pub mod chat;
pub mod message;

pub use chat::{ChatRole, RoleMessage};
pub use message::{InboundMessage, StoredMessage};
