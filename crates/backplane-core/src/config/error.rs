//! Configuration error types

use thiserror::Error;

use crate::auth::SecretProviderError;

/// Errors that can occur while loading or applying configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// `key_engines` names an engine this build does not provide
    #[error("Unknown key engine: '{0}'")]
    UnknownEngine(String),

    #[error("Secret store configuration error: {0}")]
    SecretStore(#[from] SecretProviderError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
