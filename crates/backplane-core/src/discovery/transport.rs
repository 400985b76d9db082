//! HTTP plumbing shared by the registry backends

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::auth::AuthInjector;

use super::config::RegistryConfig;
use super::error::{DiscoveryError, DiscoveryResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Base URL, HTTP client and auth injector for one registry
pub(crate) struct HttpTransport {
    backend: &'static str,
    base_url: Url,
    client: reqwest::Client,
    injector: AuthInjector,
}

impl HttpTransport {
    pub(crate) fn new(backend: &'static str, config: &RegistryConfig) -> DiscoveryResult<Self> {
        let base_url = Url::parse(&config.registry_url())
            .map_err(|e| DiscoveryError::construction(backend, format!("bad registry URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(DiscoveryError::construction(backend, "registry URL cannot be a base"));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DiscoveryError::construction(backend, e.to_string()))?;

        Ok(Self {
            backend,
            base_url,
            client,
            injector: config.auth_injector.clone(),
        })
    }

    pub(crate) fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `base_url` with each segment appended (percent-encoded)
    pub(crate) fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Authenticate and send a request
    pub(crate) async fn send(&self, builder: RequestBuilder) -> DiscoveryResult<Response> {
        let mut request = builder.build()?;
        self.injector.add_authentication_data(&mut request).await?;
        Ok(self.client.execute(request).await?)
    }

    /// Send and fail on any non-2xx status
    pub(crate) async fn send_ok(&self, builder: RequestBuilder) -> DiscoveryResult<Response> {
        let response = self.send(builder).await?;
        self.ensure_success(response).await
    }

    pub(crate) async fn ensure_success(&self, response: Response) -> DiscoveryResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(DiscoveryError::status(self.backend, status.as_u16(), message.trim()))
    }

    pub(crate) async fn json<T: DeserializeOwned>(&self, response: Response) -> DiscoveryResult<T> {
        response
            .json()
            .await
            .map_err(|e| DiscoveryError::invalid_response(self.backend, e.to_string()))
    }
}
