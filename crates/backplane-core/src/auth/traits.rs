//! Secret provider trait and errors

use async_trait::async_trait;
use thiserror::Error;

/// Errors a secret provider can report
///
/// None of these ever include the token being fetched.
#[derive(Error, Debug)]
pub enum SecretProviderError {
    #[error("Invalid secret store configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported secret store type: '{0}'")]
    UnsupportedStore(String),

    #[error("Secret store not available: {0}")]
    NotAvailable(String),

    #[error("Secret store returned status {status}")]
    Status { status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid secret store response: {0}")]
    InvalidResponse(String),

    #[error("Token contains characters not allowed in an HTTP header")]
    InvalidToken,

    #[error("Secret store error: {0}")]
    Other(String),
}

pub type SecretProviderResult<T> = Result<T, SecretProviderError>;

/// Source of the calling service's own identity token
///
/// Implementations may cache or refresh tokens internally; callers fetch on every
/// request and never cache. An empty token means "no credential available".
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Human-readable name of this provider
    fn name(&self) -> &str;

    /// Current bearer token for this service's identity
    async fn get_self_token(&self) -> SecretProviderResult<String>;
}
