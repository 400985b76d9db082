//! Discovery client trait and shared types

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use super::error::DiscoveryResult;

/// Where a registered service can be reached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    pub service_id: String,
    pub host: String,
    pub port: u16,
}

impl ServiceEndpoint {
    pub fn new(service_id: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            service_id: service_id.into(),
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Registration status as reported by the registry
///
/// Parsing ignores case; anything unrecognised becomes `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceStatus {
    Up,
    Down,
    /// Deregistered
    Halt,
    #[default]
    Unknown,
}

impl ServiceStatus {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "UP" => ServiceStatus::Up,
            "DOWN" => ServiceStatus::Down,
            "HALT" => ServiceStatus::Halt,
            _ => ServiceStatus::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for ServiceStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse(&value))
    }
}

/// An HTTP health check attached to a service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheck {
    pub id: String,
    pub name: String,
    pub notes: String,
    /// Full URL the registry polls
    pub url: String,
    /// Poll interval, e.g. `10s`
    pub interval: String,
}

/// Client for a service registry
///
/// Service details (key, host, port, check route, interval) come from the
/// [`RegistryConfig`](super::RegistryConfig) the client was built from and are only
/// needed for `register`/`unregister`.
#[async_trait]
pub trait DiscoveryClient: Send + Sync {
    /// Backend name (e.g. "keeper", "consul")
    fn name(&self) -> &str;

    /// Whether the registry answers at its configured address
    async fn is_alive(&self) -> bool;

    /// Register this service (and its health check) with the registry
    async fn register(&self) -> DiscoveryResult<()>;

    /// Register an additional health check
    async fn register_check(&self, check: &HealthCheck) -> DiscoveryResult<()>;

    /// Remove a health check by id
    async fn unregister_check(&self, check_id: &str) -> DiscoveryResult<()>;

    /// Deregister this service
    async fn unregister(&self) -> DiscoveryResult<()>;

    /// Endpoint of a registered service
    async fn get_service_endpoint(&self, service_key: &str) -> DiscoveryResult<ServiceEndpoint>;

    /// Endpoints of every registered (not deregistered) service
    async fn get_all_service_endpoints(&self) -> DiscoveryResult<Vec<ServiceEndpoint>>;

    /// `Ok(true)` when the service is registered and healthy
    ///
    /// The reason a service is unavailable is reported as an error
    /// (`NotRegistered`, `Deregistered`, `Unhealthy`).
    async fn is_service_available(&self, service_key: &str) -> DiscoveryResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_display() {
        let endpoint = ServiceEndpoint::new("core-data", "edgex-core-data", 59880);
        assert_eq!(endpoint.to_string(), "edgex-core-data:59880");
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(serde_json::to_string(&ServiceStatus::Halt).unwrap(), "\"HALT\"");
        let up: ServiceStatus = serde_json::from_str("\"UP\"").unwrap();
        assert_eq!(up, ServiceStatus::Up);
        let odd: ServiceStatus = serde_json::from_str("\"SLEEPING\"").unwrap();
        assert_eq!(odd, ServiceStatus::Unknown);
    }

    #[test]
    fn test_status_ignores_case() {
        for raw in ["\"up\"", "\"Up\"", "\" UP \""] {
            let status: ServiceStatus = serde_json::from_str(raw).unwrap();
            assert_eq!(status, ServiceStatus::Up, "{}", raw);
        }
        assert_eq!(ServiceStatus::parse("halt"), ServiceStatus::Halt);
        assert_eq!(ServiceStatus::parse("Down"), ServiceStatus::Down);
    }
}
