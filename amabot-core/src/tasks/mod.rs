// File: amabot-core/src/tasks/mod.rs

pub mod cleanup;

pub use cleanup::{spawn_forget_task, spawn_prune_task};
