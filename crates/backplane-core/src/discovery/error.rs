//! Discovery error types

use thiserror::Error;

use crate::auth::SecretProviderError;

/// Errors that can occur while selecting or talking to a registry backend
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Host or port missing; detected before any I/O
    #[error("Invalid registry configuration: host and port must be set")]
    InvalidConfig,

    /// The config `type` tag names no known backend
    #[error("Unsupported registry backend type: '{0}'")]
    UnsupportedBackend(String),

    /// The backend client could not be built
    #[error("Failed to create {backend} client: {message}")]
    Construction { backend: String, message: String },

    /// Registration attempted without the service's own details
    #[error("Unable to register service with {backend}: service information not set")]
    ServiceInfoMissing { backend: String },

    /// The injector could not obtain a token for the outbound request
    #[error("Authentication failed: {0}")]
    Auth(#[from] SecretProviderError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{backend} returned status {status}: {message}")]
    Status {
        backend: String,
        status: u16,
        message: String,
    },

    #[error("Invalid response from {backend}: {message}")]
    InvalidResponse { backend: String, message: String },

    #[error("Service '{0}' is not registered")]
    NotRegistered(String),

    #[error("Service '{0}' has been unregistered")]
    Deregistered(String),

    #[error("Service '{0}' is not healthy")]
    Unhealthy(String),

    #[error("{0}")]
    Other(String),
}

impl DiscoveryError {
    pub fn construction(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Construction {
            backend: backend.into(),
            message: message.into(),
        }
    }

    pub fn status(backend: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            backend: backend.into(),
            status,
            message: message.into(),
        }
    }

    pub fn invalid_response(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            backend: backend.into(),
            message: message.into(),
        }
    }
}

pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
