//! Registry backend configuration

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::auth::AuthInjector;

fn default_protocol() -> String {
    "http".to_string()
}

/// Settings for one discovery backend
///
/// `type`, `host` and `port` select and locate the registry. The `service_*` and
/// `check_*` fields describe the calling service and are only needed to register
/// it. Unknown keys land in `extra` and are handed to the backend untouched.
#[derive(Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Backend type tag (`keeper`, `consul`)
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,

    /// Key this service registers under
    #[serde(default)]
    pub service_key: String,
    /// Empty when the client is only used for lookups
    #[serde(default)]
    pub service_host: String,
    #[serde(default)]
    pub service_port: u16,
    #[serde(default)]
    pub check_route: String,
    #[serde(default)]
    pub check_interval: String,

    /// ACL token for backends that take one (consul)
    #[serde(default)]
    pub access_token: String,

    /// Backend-specific settings
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,

    /// Authenticates every request the client sends to the registry
    #[serde(skip)]
    pub auth_injector: AuthInjector,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            kind: String::new(),
            protocol: default_protocol(),
            host: String::new(),
            port: 0,
            service_key: String::new(),
            service_host: String::new(),
            service_port: 0,
            check_route: String::new(),
            check_interval: String::new(),
            access_token: String::new(),
            extra: BTreeMap::new(),
            auth_injector: AuthInjector::none(),
        }
    }
}

impl RegistryConfig {
    /// Create a config for a backend at `host:port`
    pub fn new(kind: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            kind: kind.into(),
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Describe the calling service so it can register itself
    pub fn with_service(
        mut self,
        service_key: impl Into<String>,
        service_host: impl Into<String>,
        service_port: u16,
    ) -> Self {
        self.service_key = service_key.into();
        self.service_host = service_host.into();
        self.service_port = service_port;
        self
    }

    /// Set the health check route and interval
    pub fn with_check(mut self, route: impl Into<String>, interval: impl Into<String>) -> Self {
        self.check_route = route.into();
        self.check_interval = interval.into();
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = token.into();
        self
    }

    pub fn with_auth_injector(mut self, injector: AuthInjector) -> Self {
        self.auth_injector = injector;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<serde_yaml::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// String value of a backend-specific setting
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }

    /// `protocol://host:port`
    pub fn registry_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }

    /// All fields needed for registration are present
    pub fn has_service_info(&self) -> bool {
        !self.service_key.is_empty()
            && !self.service_host.is_empty()
            && self.service_port != 0
            && !self.check_route.is_empty()
            && !self.check_interval.is_empty()
    }

    /// URL the registry polls for this service's health
    pub fn health_check_url(&self) -> String {
        format!(
            "{}://{}:{}{}",
            self.protocol, self.service_host, self.service_port, self.check_route
        )
    }
}

impl fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("kind", &self.kind)
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("service_key", &self.service_key)
            .field("service_host", &self.service_host)
            .field("service_port", &self.service_port)
            .field("check_route", &self.check_route)
            .field("check_interval", &self.check_interval)
            .field(
                "access_token",
                &if self.access_token.is_empty() { "<unset>" } else { "<redacted>" },
            )
            .field("extra", &self.extra)
            .field("auth_injector", &self.auth_injector)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_url() {
        let config = RegistryConfig::new("keeper", "localhost", 59890);
        assert_eq!(config.registry_url(), "http://localhost:59890");
    }

    #[test]
    fn test_service_info() {
        let config = RegistryConfig::new("keeper", "localhost", 59890);
        assert!(!config.has_service_info());

        let config = config
            .with_service("core-data", "edgex-core-data", 59880)
            .with_check("/api/v3/ping", "10s");
        assert!(config.has_service_info());
        assert_eq!(config.health_check_url(), "http://edgex-core-data:59880/api/v3/ping");
    }

    #[test]
    fn test_yaml_with_extra_fields() {
        let yaml = r#"
type: consul
host: localhost
port: 8500
service_key: core-data
access_token: secret-acl
datacenter: dc1
"#;
        let config: RegistryConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.kind, "consul");
        assert_eq!(config.protocol, "http");
        assert_eq!(config.port, 8500);
        assert_eq!(config.extra_str("datacenter"), Some("dc1"));
        assert!(!config.auth_injector.has_provider());
    }

    #[test]
    fn test_debug_redacts_access_token() {
        let config = RegistryConfig::new("consul", "localhost", 8500).with_access_token("secret-acl");
        assert!(!format!("{:?}", config).contains("secret-acl"));
    }
}
