//! Error types for the rollout annotation and configuration.

use thiserror::Error;

/// Result type alias for annotation encoding and decoding.
pub type AnnotationResult<T> = Result<T, AnnotationError>;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while reading or writing the rollout annotation.
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("malformed rollout annotation: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("inconsistent rollout annotation: {0}")]
    Inconsistent(String),
}

/// Errors raised while loading the rollout configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
