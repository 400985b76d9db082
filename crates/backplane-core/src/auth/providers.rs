//! Providers that need no secret store

use async_trait::async_trait;

use super::traits::{SecretProvider, SecretProviderResult};

/// Provider used when security is disabled
///
/// Always yields an empty token, so injectors leave requests untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct InsecureSecretProvider;

impl InsecureSecretProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SecretProvider for InsecureSecretProvider {
    fn name(&self) -> &str {
        "insecure"
    }

    async fn get_self_token(&self) -> SecretProviderResult<String> {
        Ok(String::new())
    }
}

/// Provider that returns a fixed token
///
/// For development setups and tests.
#[derive(Clone)]
pub struct StaticSecretProvider {
    token: String,
}

impl StaticSecretProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl std::fmt::Debug for StaticSecretProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticSecretProvider")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl SecretProvider for StaticSecretProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn get_self_token(&self) -> SecretProviderResult<String> {
        Ok(self.token.clone())
    }
}
