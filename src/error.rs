use std::io;
use std::time::Duration;

/// Custom error type for autodock operations
#[derive(Debug, thiserror::Error)]
pub enum AutodockError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid repository entry '{key}': {reason}")]
    InvalidEntry { key: String, reason: String },

    #[error("No repositories configured (set at least one AUTODOCK_* variable)")]
    NoRepositoriesConfigured,

    #[error("Command failed to start: {0}")]
    CommandSpawn(#[source] io::Error),

    #[error("Command exited with {}:\n{stderr}", .code.map_or("signal".to_string(), |c| format!("code {c}")))]
    CommandFailed { code: Option<i32>, stderr: String },

    #[error("Command timed out after {0:?}")]
    CommandTimeout(Duration),

    #[error("Callback request failed: {0}")]
    Callback(#[from] reqwest::Error),

    #[error("Callback request timed out after {0:?}")]
    CallbackTimeout(Duration),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Helper type for Results that use AutodockError
pub type Result<T> = std::result::Result<T, AutodockError>;
