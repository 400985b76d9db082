//! Keeper registry backend
//!
//! Keeper folds the health check into the registration itself, so
//! `register_check`/`unregister_check` have nothing to do.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::logging::{NoOpLogger, SharedLogger};

use super::config::RegistryConfig;
use super::error::{DiscoveryError, DiscoveryResult};
use super::traits::{DiscoveryClient, HealthCheck, ServiceEndpoint, ServiceStatus};
use super::transport::HttpTransport;

const BACKEND: &str = "keeper";
const API_VERSION: &str = "v3";
const API_BASE: [&str; 2] = ["api", "v3"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Registration {
    service_id: String,
    #[serde(default)]
    host: String,
    #[serde(default)]
    port: u16,
    #[serde(default)]
    health_check: KeeperHealthCheck,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<ServiceStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeeperHealthCheck {
    #[serde(default)]
    interval: String,
    #[serde(default)]
    path: String,
    #[serde(rename = "type", default)]
    kind: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddRegistrationRequest<'a> {
    api_version: &'static str,
    registration: &'a Registration,
}

#[derive(Deserialize)]
struct RegistrationResponse {
    registration: Registration,
}

#[derive(Deserialize)]
struct AllRegistrationsResponse {
    #[serde(default)]
    registrations: Vec<Registration>,
}

/// Discovery client for the Keeper registry
pub struct KeeperClient {
    transport: HttpTransport,
    config: RegistryConfig,
    logger: SharedLogger,
}

impl KeeperClient {
    /// Create a client; no request is sent until a method is called
    pub fn new(config: &RegistryConfig) -> DiscoveryResult<Self> {
        Ok(Self {
            transport: HttpTransport::new(BACKEND, config)?,
            config: config.clone(),
            logger: NoOpLogger::shared(),
        })
    }

    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    fn route(&self, tail: &[&str]) -> reqwest::Url {
        let segments: Vec<&str> = API_BASE.iter().copied().chain(tail.iter().copied()).collect();
        self.transport.url(&segments)
    }

    fn own_registration(&self, status: Option<ServiceStatus>) -> Registration {
        Registration {
            service_id: self.config.service_key.clone(),
            host: self.config.service_host.clone(),
            port: self.config.service_port,
            health_check: KeeperHealthCheck {
                interval: self.config.check_interval.clone(),
                path: self.config.check_route.clone(),
                kind: "http".to_string(),
            },
            status,
        }
    }

    /// `None` when Keeper has no registration for `service_key`
    async fn registration(&self, service_key: &str) -> DiscoveryResult<Option<Registration>> {
        let url = self.route(&["registry", "serviceId", service_key]);
        let response = self.transport.send(self.transport.request(Method::GET, url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = self.transport.ensure_success(response).await?;
        let body: RegistrationResponse = self.transport.json(response).await?;
        Ok(Some(body.registration))
    }

    async fn submit(&self, method: Method, registration: &Registration) -> DiscoveryResult<()> {
        let body = AddRegistrationRequest {
            api_version: API_VERSION,
            registration,
        };
        let builder = self
            .transport
            .request(method, self.route(&["registry"]))
            .json(&body);
        self.transport.send_ok(builder).await?;
        Ok(())
    }
}

impl std::fmt::Debug for KeeperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeeperClient")
            .field("url", &self.transport.base_url().as_str())
            .field("service_key", &self.config.service_key)
            .finish()
    }
}

#[async_trait]
impl DiscoveryClient for KeeperClient {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn is_alive(&self) -> bool {
        let url = self.route(&["ping"]);
        match self.transport.send_ok(self.transport.request(Method::GET, url)).await {
            Ok(_) => true,
            Err(e) => {
                crate::log_debug!(self.logger, "Keeper ping failed: {}", e);
                false
            }
        }
    }

    async fn register(&self) -> DiscoveryResult<()> {
        if !self.config.has_service_info() {
            return Err(DiscoveryError::ServiceInfoMissing {
                backend: BACKEND.to_string(),
            });
        }

        let registration = self.own_registration(None);
        let existing = self.registration(&self.config.service_key).await?;
        // Keeper rejects a second POST for the same id.
        let method = if existing.is_some() { Method::PUT } else { Method::POST };
        self.submit(method, &registration).await?;

        crate::log_info!(
            self.logger,
            "Registered '{}' with Keeper at {}",
            self.config.service_key,
            self.transport.base_url()
        );
        Ok(())
    }

    async fn register_check(&self, _check: &HealthCheck) -> DiscoveryResult<()> {
        Ok(())
    }

    async fn unregister_check(&self, _check_id: &str) -> DiscoveryResult<()> {
        Ok(())
    }

    async fn unregister(&self) -> DiscoveryResult<()> {
        let registration = self.own_registration(Some(ServiceStatus::Halt));
        self.submit(Method::PUT, &registration).await?;
        self.logger
            .info(&format!("Deregistered '{}' from Keeper", self.config.service_key));
        Ok(())
    }

    async fn get_service_endpoint(&self, service_key: &str) -> DiscoveryResult<ServiceEndpoint> {
        let registration = self
            .registration(service_key)
            .await?
            .ok_or_else(|| DiscoveryError::NotRegistered(service_key.to_string()))?;
        Ok(ServiceEndpoint::new(service_key, registration.host, registration.port))
    }

    async fn get_all_service_endpoints(&self) -> DiscoveryResult<Vec<ServiceEndpoint>> {
        let mut url = self.route(&["registry", "all"]);
        url.query_pairs_mut().append_pair("deregistered", "false");

        let response = self
            .transport
            .send_ok(self.transport.request(Method::GET, url))
            .await?;
        let body: AllRegistrationsResponse = self.transport.json(response).await?;
        Ok(body
            .registrations
            .into_iter()
            .map(|r| ServiceEndpoint::new(r.service_id, r.host, r.port))
            .collect())
    }

    async fn is_service_available(&self, service_key: &str) -> DiscoveryResult<bool> {
        let registration = self
            .registration(service_key)
            .await?
            .ok_or_else(|| DiscoveryError::NotRegistered(service_key.to_string()))?;

        match registration.status.unwrap_or_default() {
            ServiceStatus::Up => Ok(true),
            ServiceStatus::Halt => Err(DiscoveryError::Deregistered(service_key.to_string())),
            ServiceStatus::Down | ServiceStatus::Unknown => {
                Err(DiscoveryError::Unhealthy(service_key.to_string()))
            }
        }
    }
}
