//! Bearer token injection for outbound requests

use std::fmt;
use std::sync::Arc;

use http::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use super::config::SecretStoreConfig;
use super::traits::{SecretProvider, SecretProviderError, SecretProviderResult};

/// Anything with a mutable header collection
pub trait HeaderCarrier {
    fn headers_mut(&mut self) -> &mut HeaderMap;
}

impl HeaderCarrier for HeaderMap {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self
    }
}

impl HeaderCarrier for reqwest::Request {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        reqwest::Request::headers_mut(self)
    }
}

impl<B> HeaderCarrier for http::Request<B> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        http::Request::headers_mut(self)
    }
}

/// Attaches this service's identity token to outbound requests
///
/// Without a provider every call succeeds and leaves the request alone. With one,
/// each call fetches a fresh token; an empty token leaves the request alone, a
/// non-empty one replaces any existing `Authorization` header. Provider errors are
/// returned as-is and the request is not modified.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use backplane_core::auth::{AuthInjector, StaticSecretProvider};
/// use http::header::{HeaderMap, AUTHORIZATION};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let injector = AuthInjector::with_provider(Arc::new(StaticSecretProvider::new("abc123")));
/// let mut headers = HeaderMap::new();
/// injector.add_authentication_data(&mut headers).await.unwrap();
/// assert_eq!(headers[AUTHORIZATION], "Bearer abc123");
/// # });
/// ```
#[derive(Clone, Default)]
pub struct AuthInjector {
    provider: Option<Arc<dyn SecretProvider>>,
}

impl AuthInjector {
    /// Create an injector around an optional provider
    pub fn new(provider: Option<Arc<dyn SecretProvider>>) -> Self {
        Self { provider }
    }

    /// Create an injector backed by `provider`
    pub fn with_provider(provider: Arc<dyn SecretProvider>) -> Self {
        Self::new(Some(provider))
    }

    /// Create an injector that never touches requests
    pub fn none() -> Self {
        Self::new(None)
    }

    /// Create an injector for the secret store a config names
    pub fn from_config(config: &SecretStoreConfig) -> SecretProviderResult<Self> {
        Ok(Self::new(super::create_secret_provider(config)?))
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Set `Authorization: Bearer <token>` on `request`
    pub async fn add_authentication_data<R>(&self, request: &mut R) -> SecretProviderResult<()>
    where
        R: HeaderCarrier + ?Sized,
    {
        let Some(provider) = self.provider.as_ref() else {
            return Ok(());
        };

        let token = provider.get_self_token().await?;
        if token.is_empty() {
            crate::debug_log!(
                "Provider '{}' returned no token; request left unauthenticated",
                provider.name()
            );
            return Ok(());
        }

        let value = bearer_value(&token)?;
        request.headers_mut().insert(AUTHORIZATION, value);
        Ok(())
    }
}

fn bearer_value(token: &str) -> SecretProviderResult<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| SecretProviderError::InvalidToken)?;
    value.set_sensitive(true);
    Ok(value)
}

impl fmt::Debug for AuthInjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthInjector")
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .finish()
    }
}
