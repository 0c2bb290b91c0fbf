// File: amabot-common/src/traits/mod.rs
pub mod api;
pub mod platform_traits;
pub mod repository_traits;

pub use api::CompletionApi;
pub use platform_traits::{ChatPlatform, ConnectionStatus};
pub use repository_traits::WindowStore;
