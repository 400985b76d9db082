//! Secret store configuration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::traits::{SecretProviderError, SecretProviderResult};

/// Kind of secret store a config selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretStoreType {
    /// No provider; outbound requests go out unauthenticated
    None,
    /// Security disabled; provider yields empty tokens
    Insecure,
    /// Fixed token from the config
    Static,
    /// OpenBao / Vault identity token endpoint
    OpenBao,
}

impl SecretStoreType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecretStoreType::None => "none",
            SecretStoreType::Insecure => "insecure",
            SecretStoreType::Static => "static",
            SecretStoreType::OpenBao => "openbao",
        }
    }
}

impl FromStr for SecretStoreType {
    type Err = SecretProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(SecretStoreType::None),
            "insecure" => Ok(SecretStoreType::Insecure),
            "static" => Ok(SecretStoreType::Static),
            "openbao" | "vault" => Ok(SecretStoreType::OpenBao),
            _ => Err(SecretProviderError::UnsupportedStore(s.to_string())),
        }
    }
}

fn default_protocol() -> String {
    "http".to_string()
}

/// Connection settings for the secret store
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecretStoreConfig {
    /// Store type tag (`none`, `insecure`, `static`, `openbao`/`vault`)
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    /// Access token presented to the store itself
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub namespace: Option<String>,
    /// Identity whose token is requested
    #[serde(default)]
    pub service_key: String,
    /// Token returned by the `static` store
    #[serde(default)]
    pub static_token: Option<String>,
}

impl Default for SecretStoreConfig {
    fn default() -> Self {
        Self {
            kind: String::new(),
            protocol: default_protocol(),
            host: String::new(),
            port: 0,
            token: String::new(),
            namespace: None,
            service_key: String::new(),
            static_token: None,
        }
    }
}

impl SecretStoreConfig {
    /// Create a config for the given store type
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Set host and port
    pub fn with_address(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Set the store access token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Set the service identity
    pub fn with_service_key(mut self, service_key: impl Into<String>) -> Self {
        self.service_key = service_key.into();
        self
    }

    /// Set the fixed token for the `static` store
    pub fn with_static_token(mut self, token: impl Into<String>) -> Self {
        self.static_token = Some(token.into());
        self
    }

    /// Set the store namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Parsed store type
    pub fn store_type(&self) -> SecretProviderResult<SecretStoreType> {
        self.kind.parse()
    }

    /// Base URL of the store (`protocol://host:port`)
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }
}

impl fmt::Debug for SecretStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |present: bool| if present { "<redacted>" } else { "<unset>" };
        f.debug_struct("SecretStoreConfig")
            .field("kind", &self.kind)
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("token", &redacted(!self.token.is_empty()))
            .field("namespace", &self.namespace)
            .field("service_key", &self.service_key)
            .field("static_token", &redacted(self.static_token.is_some()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_type_parsing() {
        assert_eq!("".parse::<SecretStoreType>().unwrap(), SecretStoreType::None);
        assert_eq!("Insecure".parse::<SecretStoreType>().unwrap(), SecretStoreType::Insecure);
        assert_eq!("vault".parse::<SecretStoreType>().unwrap(), SecretStoreType::OpenBao);
        assert_eq!("openbao".parse::<SecretStoreType>().unwrap(), SecretStoreType::OpenBao);

        let err = "bogus".parse::<SecretStoreType>().unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn test_deserialize_yaml() {
        let yaml = "type: openbao\nhost: localhost\nport: 8200\ntoken: s.root\nservice_key: core-data\n";
        let config: SecretStoreConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.store_type().unwrap(), SecretStoreType::OpenBao);
        assert_eq!(config.protocol, "http");
        assert_eq!(config.base_url(), "http://localhost:8200");
        assert_eq!(config.service_key, "core-data");
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let config = SecretStoreConfig::new("static")
            .with_token("s.root")
            .with_static_token("abc123");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("s.root"));
        assert!(!rendered.contains("abc123"));
        assert!(rendered.contains("<redacted>"));
    }
}
