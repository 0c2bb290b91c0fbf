// File: amabot-common/src/error.rs

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeout error: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        // Provider internals report through anyhow; at our seams those are completion failures.
        Error::Completion(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_become_completion_failures() {
        let err: Error = anyhow::anyhow!("API error: insufficient_quota").into();
        assert!(matches!(err, Error::Completion(ref msg) if msg.contains("insufficient_quota")));
    }

    #[test]
    fn yaml_errors_convert() {
        let bad = serde_yaml::from_str::<Vec<String>>("{ not: [a list").unwrap_err();
        let err: Error = bad.into();
        assert!(err.to_string().starts_with("YAML error"));
    }

    #[tokio::test]
    async fn elapsed_becomes_timeout() {
        let elapsed = tokio::time::timeout(
            std::time::Duration::from_millis(1),
            std::future::pending::<()>(),
        )
        .await
        .unwrap_err();
        assert!(matches!(Error::from(elapsed), Error::Timeout(_)));
    }
}
