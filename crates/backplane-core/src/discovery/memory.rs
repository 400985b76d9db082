//! In-process registry for tests and single-node setups

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::config::RegistryConfig;
use super::error::{DiscoveryError, DiscoveryResult};
use super::traits::{DiscoveryClient, HealthCheck, ServiceEndpoint, ServiceStatus};

#[derive(Debug, Clone)]
struct Entry {
    endpoint: ServiceEndpoint,
    status: ServiceStatus,
}

/// Discovery client backed by a map in this process
///
/// Registrations made through one instance are only visible to that instance.
#[derive(Debug, Default)]
pub struct MemoryDiscoveryClient {
    config: RegistryConfig,
    services: RwLock<HashMap<String, Entry>>,
    checks: RwLock<HashMap<String, HealthCheck>>,
}

impl MemoryDiscoveryClient {
    pub fn new(config: &RegistryConfig) -> Self {
        Self {
            config: config.clone(),
            ..Self::default()
        }
    }

    /// Add or replace a service entry with status `Up`
    pub fn insert(&self, endpoint: ServiceEndpoint) {
        let entry = Entry {
            endpoint,
            status: ServiceStatus::Up,
        };
        self.services
            .write()
            .insert(entry.endpoint.service_id.clone(), entry);
    }

    /// Change a service's status; returns false when the service is unknown
    pub fn set_status(&self, service_key: &str, status: ServiceStatus) -> bool {
        match self.services.write().get_mut(service_key) {
            Some(entry) => {
                entry.status = status;
                true
            }
            None => false,
        }
    }

    /// Ids of the registered health checks, sorted
    pub fn check_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.checks.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl DiscoveryClient for MemoryDiscoveryClient {
    fn name(&self) -> &str {
        "memory"
    }

    async fn is_alive(&self) -> bool {
        true
    }

    async fn register(&self) -> DiscoveryResult<()> {
        if !self.config.has_service_info() {
            return Err(DiscoveryError::ServiceInfoMissing {
                backend: "memory".to_string(),
            });
        }
        self.insert(ServiceEndpoint::new(
            self.config.service_key.clone(),
            self.config.service_host.clone(),
            self.config.service_port,
        ));
        Ok(())
    }

    async fn register_check(&self, check: &HealthCheck) -> DiscoveryResult<()> {
        self.checks.write().insert(check.id.clone(), check.clone());
        Ok(())
    }

    async fn unregister_check(&self, check_id: &str) -> DiscoveryResult<()> {
        self.checks.write().remove(check_id);
        Ok(())
    }

    async fn unregister(&self) -> DiscoveryResult<()> {
        let key = &self.config.service_key;
        if !self.set_status(key, ServiceStatus::Halt) {
            return Err(DiscoveryError::NotRegistered(key.clone()));
        }
        Ok(())
    }

    async fn get_service_endpoint(&self, service_key: &str) -> DiscoveryResult<ServiceEndpoint> {
        self.services
            .read()
            .get(service_key)
            .map(|entry| entry.endpoint.clone())
            .ok_or_else(|| DiscoveryError::NotRegistered(service_key.to_string()))
    }

    async fn get_all_service_endpoints(&self) -> DiscoveryResult<Vec<ServiceEndpoint>> {
        let mut endpoints: Vec<ServiceEndpoint> = self
            .services
            .read()
            .values()
            .filter(|entry| entry.status != ServiceStatus::Halt)
            .map(|entry| entry.endpoint.clone())
            .collect();
        endpoints.sort_by(|a, b| a.service_id.cmp(&b.service_id));
        Ok(endpoints)
    }

    async fn is_service_available(&self, service_key: &str) -> DiscoveryResult<bool> {
        let status = self
            .services
            .read()
            .get(service_key)
            .map(|entry| entry.status)
            .ok_or_else(|| DiscoveryError::NotRegistered(service_key.to_string()))?;

        match status {
            ServiceStatus::Up => Ok(true),
            ServiceStatus::Halt => Err(DiscoveryError::Deregistered(service_key.to_string())),
            ServiceStatus::Down | ServiceStatus::Unknown => {
                Err(DiscoveryError::Unhealthy(service_key.to_string()))
            }
        }
    }
}
