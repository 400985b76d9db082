//! Consul registry backend

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Method, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::logging::{NoOpLogger, SharedLogger};

use super::config::RegistryConfig;
use super::error::{DiscoveryError, DiscoveryResult};
use super::traits::{DiscoveryClient, HealthCheck, ServiceEndpoint};
use super::transport::HttpTransport;

const BACKEND: &str = "consul";
const TOKEN_HEADER: &str = "X-Consul-Token";
const HEALTH_PASSING: &str = "passing";

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ServiceRegistration<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
    name: &'a str,
    address: &'a str,
    port: u16,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CheckRegistration<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
    name: &'a str,
    notes: &'a str,
    #[serde(rename = "HTTP")]
    http: &'a str,
    interval: &'a str,
    #[serde(rename = "ServiceID")]
    service_id: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CatalogService {
    #[serde(rename = "ServiceID")]
    service_id: String,
    #[serde(default)]
    service_address: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    service_port: u16,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AgentService {
    #[serde(rename = "ID")]
    id: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    port: u16,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CheckStatus {
    #[serde(default)]
    status: String,
}

/// Discovery client for Consul's agent and catalog HTTP APIs
///
/// The optional `datacenter` extra setting scopes catalog and health queries.
pub struct ConsulClient {
    transport: HttpTransport,
    config: RegistryConfig,
    datacenter: Option<String>,
    registered_checks: Mutex<Vec<String>>,
    logger: SharedLogger,
}

impl ConsulClient {
    /// Create a client; no request is sent until a method is called
    pub fn new(config: &RegistryConfig) -> DiscoveryResult<Self> {
        Ok(Self {
            transport: HttpTransport::new(BACKEND, config)?,
            config: config.clone(),
            datacenter: config.extra_str("datacenter").map(str::to_string),
            registered_checks: Mutex::new(Vec::new()),
            logger: NoOpLogger::shared(),
        })
    }

    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    fn route(&self, segments: &[&str]) -> Url {
        let mut url = self.transport.url(segments);
        if let Some(dc) = &self.datacenter {
            url.query_pairs_mut().append_pair("dc", dc);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.transport.request(method, url);
        if self.config.access_token.is_empty() {
            builder
        } else {
            builder.header(TOKEN_HEADER, &self.config.access_token)
        }
    }

    fn own_check(&self) -> HealthCheck {
        let name = format!("Health Check: {}", self.config.service_key);
        HealthCheck {
            id: name.clone(),
            name,
            notes: "Check the health of the API".to_string(),
            url: self.config.health_check_url(),
            interval: self.config.check_interval.clone(),
        }
    }
}

impl std::fmt::Debug for ConsulClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsulClient")
            .field("url", &self.transport.base_url().as_str())
            .field("service_key", &self.config.service_key)
            .field("datacenter", &self.datacenter)
            .finish()
    }
}

#[async_trait]
impl DiscoveryClient for ConsulClient {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn is_alive(&self) -> bool {
        // The status endpoint needs no ACL token.
        let url = self.transport.url(&["v1", "status", "leader"]);
        match self.transport.send_ok(self.transport.request(Method::GET, url)).await {
            Ok(_) => true,
            Err(e) => {
                crate::log_debug!(self.logger, "Consul status check failed: {}", e);
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

        let body = ServiceRegistration {
            id: &self.config.service_key,
            name: &self.config.service_key,
            address: &self.config.service_host,
            port: self.config.service_port,
        };
        let url = self.transport.url(&["v1", "agent", "service", "register"]);
        self.transport
            .send_ok(self.request(Method::PUT, url).json(&body))
            .await?;

        self.register_check(&self.own_check()).await?;
        crate::log_info!(
            self.logger,
            "Registered '{}' with Consul at {}",
            self.config.service_key,
            self.transport.base_url()
        );
        Ok(())
    }

    async fn register_check(&self, check: &HealthCheck) -> DiscoveryResult<()> {
        let body = CheckRegistration {
            id: &check.id,
            name: &check.name,
            notes: &check.notes,
            http: &check.url,
            interval: &check.interval,
            service_id: &self.config.service_key,
        };
        let url = self.transport.url(&["v1", "agent", "check", "register"]);
        self.transport
            .send_ok(self.request(Method::PUT, url).json(&body))
            .await?;

        let mut checks = self.registered_checks.lock();
        if !checks.contains(&check.id) {
            checks.push(check.id.clone());
        }
        Ok(())
    }

    async fn unregister_check(&self, check_id: &str) -> DiscoveryResult<()> {
        let url = self.transport.url(&["v1", "agent", "check", "deregister", check_id]);
        self.transport.send_ok(self.request(Method::PUT, url)).await?;
        self.registered_checks.lock().retain(|id| id != check_id);
        Ok(())
    }

    async fn unregister(&self) -> DiscoveryResult<()> {
        let checks: Vec<String> = self.registered_checks.lock().clone();
        for check_id in checks {
            self.unregister_check(&check_id).await?;
        }

        let url = self
            .transport
            .url(&["v1", "agent", "service", "deregister", &self.config.service_key]);
        self.transport.send_ok(self.request(Method::PUT, url)).await?;
        self.logger
            .info(&format!("Deregistered '{}' from Consul", self.config.service_key));
        Ok(())
    }

    async fn get_service_endpoint(&self, service_key: &str) -> DiscoveryResult<ServiceEndpoint> {
        let url = self.route(&["v1", "catalog", "service", service_key]);
        let response = self.transport.send_ok(self.request(Method::GET, url)).await?;
        let services: Vec<CatalogService> = self.transport.json(response).await?;

        let service = services
            .into_iter()
            .next()
            .ok_or_else(|| DiscoveryError::NotRegistered(service_key.to_string()))?;
        // ServiceAddress is empty when the service registered without one.
        let host = if service.service_address.is_empty() {
            service.address
        } else {
            service.service_address
        };
        Ok(ServiceEndpoint::new(service.service_id, host, service.service_port))
    }

    async fn get_all_service_endpoints(&self) -> DiscoveryResult<Vec<ServiceEndpoint>> {
        let url = self.transport.url(&["v1", "agent", "services"]);
        let response = self.transport.send_ok(self.request(Method::GET, url)).await?;
        let services: HashMap<String, AgentService> = self.transport.json(response).await?;

        let mut endpoints: Vec<ServiceEndpoint> = services
            .into_values()
            .map(|s| ServiceEndpoint::new(s.id, s.address, s.port))
            .collect();
        endpoints.sort_by(|a, b| a.service_id.cmp(&b.service_id));
        Ok(endpoints)
    }

    async fn is_service_available(&self, service_key: &str) -> DiscoveryResult<bool> {
        let url = self.route(&["v1", "health", "checks", service_key]);
        let response = self.transport.send_ok(self.request(Method::GET, url)).await?;
        let checks: Vec<CheckStatus> = self.transport.json(response).await?;

        if checks.is_empty() {
            return Err(DiscoveryError::NotRegistered(service_key.to_string()));
        }
        if checks.iter().any(|c| c.status != HEALTH_PASSING) {
            return Err(DiscoveryError::Unhealthy(service_key.to_string()));
        }
        Ok(true)
    }
}
