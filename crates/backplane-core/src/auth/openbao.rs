//! OpenBao / Vault identity token provider

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use crate::logging::{NoOpLogger, SharedLogger};

use super::config::SecretStoreConfig;
use super::traits::{SecretProvider, SecretProviderError, SecretProviderResult};

const TOKEN_HEADER: &str = "X-Vault-Token";
const NAMESPACE_HEADER: &str = "X-Vault-Namespace";
const OIDC_TOKEN_PATH: [&str; 4] = ["v1", "identity", "oidc", "token"];

#[derive(Deserialize)]
struct TokenResponse {
    data: TokenData,
}

#[derive(Deserialize)]
struct TokenData {
    #[serde(default)]
    token: String,
}

/// Fetches the service's identity JWT from an OpenBao (or Vault) server
///
/// Every call is a `GET /v1/identity/oidc/token/<service_key>` authenticated with
/// the store access token. Nothing is cached here.
pub struct OpenBaoSecretProvider {
    base_url: Url,
    access_token: String,
    namespace: Option<String>,
    service_key: String,
    client: reqwest::Client,
    logger: SharedLogger,
}

impl OpenBaoSecretProvider {
    /// Create a provider for the store at `base_url`
    pub fn new(
        base_url: &str,
        access_token: impl Into<String>,
        service_key: impl Into<String>,
    ) -> SecretProviderResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SecretProviderError::InvalidConfig(format!("bad secret store URL: {}", e)))?;
        let service_key = service_key.into();
        if service_key.is_empty() {
            return Err(SecretProviderError::InvalidConfig(
                "service_key is required to request an identity token".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            access_token: access_token.into(),
            namespace: None,
            service_key,
            client: reqwest::Client::new(),
            logger: NoOpLogger::shared(),
        })
    }

    /// Create a provider from secret store settings
    pub fn from_config(config: &SecretStoreConfig) -> SecretProviderResult<Self> {
        if config.host.is_empty() || config.port == 0 {
            return Err(SecretProviderError::InvalidConfig(
                "secret store host and port must be set".to_string(),
            ));
        }

        let mut provider = Self::new(&config.base_url(), config.token.clone(), config.service_key.clone())?;
        provider.namespace = config.namespace.clone().filter(|ns| !ns.is_empty());
        Ok(provider)
    }

    /// Send requests with a namespace header
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Use a preconfigured HTTP client (timeouts, TLS roots)
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    fn token_url(&self) -> SecretProviderResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SecretProviderError::InvalidConfig("secret store URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(OIDC_TOKEN_PATH)
            .push(&self.service_key);
        Ok(url)
    }
}

impl std::fmt::Debug for OpenBaoSecretProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenBaoSecretProvider")
            .field("base_url", &self.base_url.as_str())
            .field("namespace", &self.namespace)
            .field("service_key", &self.service_key)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SecretProvider for OpenBaoSecretProvider {
    fn name(&self) -> &str {
        "openbao"
    }

    async fn get_self_token(&self) -> SecretProviderResult<String> {
        let url = self.token_url()?;
        self.logger
            .debug(&format!("Requesting identity token from {}", url));

        let mut request = self.client.get(url).header(TOKEN_HEADER, &self.access_token);
        if let Some(namespace) = &self.namespace {
            request = request.header(NAMESPACE_HEADER, namespace);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            self.logger
                .warn(&format!("Secret store answered {} for identity token", status.as_u16()));
            return Err(SecretProviderError::Status {
                status: status.as_u16(),
            });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| SecretProviderError::InvalidResponse(e.to_string()))?;
        Ok(body.data.token)
    }
}
