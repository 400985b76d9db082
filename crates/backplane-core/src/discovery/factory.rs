//! Backend selection by config `type` tag

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;

use super::config::RegistryConfig;
use super::consul::ConsulClient;
use super::error::{DiscoveryError, DiscoveryResult};
use super::keeper::KeeperClient;
use super::traits::DiscoveryClient;

/// Known registry backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendType {
    Keeper,
    Consul,
}

impl BackendType {
    pub const ALL: [BackendType; 2] = [BackendType::Keeper, BackendType::Consul];

    /// Config tag for this backend
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendType::Keeper => "keeper",
            BackendType::Consul => "consul",
        }
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendType {
    type Err = DiscoveryError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_lowercase().as_str() {
            "keeper" => Ok(BackendType::Keeper),
            "consul" => Ok(BackendType::Consul),
            _ => Err(DiscoveryError::UnsupportedBackend(tag.to_string())),
        }
    }
}

/// Builds a client for one backend from the full registry config
pub type BackendConstructor =
    Box<dyn Fn(&RegistryConfig) -> DiscoveryResult<Box<dyn DiscoveryClient>> + Send + Sync>;

/// Dispatches a registry config to the constructor for its backend
///
/// The factory validates the config, picks a constructor and returns whatever
/// that constructor returns. It keeps no state between calls and never caches
/// clients.
pub struct BackendFactory {
    keeper: BackendConstructor,
    consul: BackendConstructor,
}

fn keeper_client(config: &RegistryConfig) -> DiscoveryResult<Box<dyn DiscoveryClient>> {
    Ok(Box::new(KeeperClient::new(config)?))
}

fn consul_client(config: &RegistryConfig) -> DiscoveryResult<Box<dyn DiscoveryClient>> {
    Ok(Box::new(ConsulClient::new(config)?))
}

impl Default for BackendFactory {
    fn default() -> Self {
        Self {
            keeper: Box::new(keeper_client),
            consul: Box::new(consul_client),
        }
    }
}

impl BackendFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the constructor used for `kind`
    pub fn with_constructor(mut self, kind: BackendType, constructor: BackendConstructor) -> Self {
        match kind {
            BackendType::Keeper => self.keeper = constructor,
            BackendType::Consul => self.consul = constructor,
        }
        self
    }

    /// Build a discovery client for `config`
    ///
    /// Host and port are checked before the tag, and both checks happen before
    /// any constructor runs.
    pub fn create(&self, config: &RegistryConfig) -> DiscoveryResult<Box<dyn DiscoveryClient>> {
        if config.host.is_empty() || config.port == 0 {
            return Err(DiscoveryError::InvalidConfig);
        }

        let constructor = match config.kind.parse::<BackendType>()? {
            BackendType::Keeper => &self.keeper,
            BackendType::Consul => &self.consul,
        };
        constructor(config)
    }
}

impl fmt::Debug for BackendFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendFactory")
            .field("backends", &BackendType::ALL)
            .finish()
    }
}

static DEFAULT_FACTORY: Lazy<BackendFactory> = Lazy::new(BackendFactory::default);

/// Create a discovery client with the built-in backends
pub fn create_discovery_client(config: &RegistryConfig) -> DiscoveryResult<Box<dyn DiscoveryClient>> {
    DEFAULT_FACTORY.create(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::discovery::MemoryDiscoveryClient;

    fn counting_constructor(calls: Arc<AtomicUsize>) -> BackendConstructor {
        Box::new(move |config: &RegistryConfig| -> DiscoveryResult<Box<dyn DiscoveryClient>> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(MemoryDiscoveryClient::new(config)))
        })
    }

    #[test]
    fn test_backend_type_parse() {
        assert_eq!("keeper".parse::<BackendType>().unwrap(), BackendType::Keeper);
        assert_eq!("Consul".parse::<BackendType>().unwrap(), BackendType::Consul);
        for kind in BackendType::ALL {
            assert_eq!(kind.as_str().parse::<BackendType>().unwrap(), kind);
        }
        assert!(matches!(
            "etcd".parse::<BackendType>(),
            Err(DiscoveryError::UnsupportedBackend(ref tag)) if tag == "etcd"
        ));
    }

    #[test]
    fn test_empty_host_rejected() {
        let config = RegistryConfig::new("keeper", "", 59890);
        assert!(matches!(
            create_discovery_client(&config),
            Err(DiscoveryError::InvalidConfig)
        ));
    }

    #[test]
    fn test_zero_port_rejected() {
        let config = RegistryConfig::new("consul", "localhost", 0);
        assert!(matches!(
            create_discovery_client(&config),
            Err(DiscoveryError::InvalidConfig)
        ));
    }

    #[test]
    fn test_address_checked_before_tag() {
        let config = RegistryConfig::new("bogus", "", 0);
        assert!(matches!(
            create_discovery_client(&config),
            Err(DiscoveryError::InvalidConfig)
        ));
    }

    #[test]
    fn test_unsupported_tag_named_in_error() {
        let config = RegistryConfig::new("bogus", "localhost", 59890);
        let err = create_discovery_client(&config).err().unwrap();
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn test_builtin_backends() {
        let keeper = create_discovery_client(&RegistryConfig::new("keeper", "localhost", 59890)).unwrap();
        assert_eq!(keeper.name(), "keeper");
        let consul = create_discovery_client(&RegistryConfig::new("consul", "localhost", 8500)).unwrap();
        assert_eq!(consul.name(), "consul");
    }

    #[test]
    fn test_dispatches_to_matching_constructor() {
        let keeper_calls = Arc::new(AtomicUsize::new(0));
        let consul_calls = Arc::new(AtomicUsize::new(0));
        let factory = BackendFactory::new()
            .with_constructor(BackendType::Keeper, counting_constructor(keeper_calls.clone()))
            .with_constructor(BackendType::Consul, counting_constructor(consul_calls.clone()));

        factory
            .create(&RegistryConfig::new("consul", "localhost", 8500))
            .unwrap();
        assert_eq!(keeper_calls.load(Ordering::SeqCst), 0);
        assert_eq!(consul_calls.load(Ordering::SeqCst), 1);

        // Invalid configs never reach a constructor.
        let _ = factory.create(&RegistryConfig::new("keeper", "", 59890));
        let _ = factory.create(&RegistryConfig::new("bogus", "localhost", 59890));
        assert_eq!(keeper_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_constructor_error_returned_unchanged() {
        let factory = BackendFactory::new().with_constructor(
            BackendType::Keeper,
            Box::new(|_: &RegistryConfig| -> DiscoveryResult<Box<dyn DiscoveryClient>> {
                Err(DiscoveryError::construction("keeper", "connection refused"))
            }),
        );

        let err = factory
            .create(&RegistryConfig::new("keeper", "localhost", 59890))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            DiscoveryError::Construction { ref backend, ref message }
                if backend == "keeper" && message == "connection refused"
        ));
    }
}
