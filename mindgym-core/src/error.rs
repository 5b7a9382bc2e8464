//! Error types shared across the progress engine.

use thiserror::Error;

/// Failure reported by a [`crate::DurableStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Write rejected for {key}: {reason}")]
    Write { key: String, reason: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Why a typed payload could not be produced from the store.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("No payload stored under {0}")]
    Missing(String),
    #[error("Payload under {key} is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Storage read failed: {0}")]
    Unavailable(#[from] StoreError),
}

/// Errors surfaced by [`crate::ProgressTracker`] mutations.
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown difficulty: {0}")]
pub struct ParseDifficultyError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_convert_into_progress_errors() {
        let err: ProgressError = StoreError::Unavailable("quota".into()).into();
        assert!(matches!(err, ProgressError::Store(_)));
        assert_eq!(err.to_string(), "Storage unavailable: quota");
    }

    #[test]
    fn config_errors_convert_into_progress_errors() {
        let err: ProgressError = ConfigError::Invalid("history_cap must be at least 1".into()).into();
        assert!(matches!(err, ProgressError::Config(_)));
        assert!(err.to_string().contains("history_cap"));
    }

    #[test]
    fn corrupt_load_error_names_key() {
        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = LoadError::Corrupt {
            key: "mindgym.streak".into(),
            source,
        };
        assert!(err.to_string().contains("mindgym.streak"));
    }
}
