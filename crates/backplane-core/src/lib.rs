//! Backplane Core
//!
//! Pluggable backends for a microservice platform. Three kinds of backend are
//! chosen at runtime by an identifier or a config value:
//!
//! - `engines`: private-key loading engines, bound by id in an `EngineRegistry`
//! - `discovery`: service registry clients, built by `BackendFactory` from a `type` tag
//! - `auth`: `AuthInjector`, which adds the service's bearer token to outbound requests
//!   when a secret provider is configured and does nothing otherwise
//!
//! ```rust,ignore
//! use backplane_core::config::FileConfigProvider;
//! use backplane_core::discovery::create_discovery_client;
//!
//! let config = FileConfigProvider::user().load()?;
//! let engines = config.engine_registry()?;
//! let key = engines.load_key("file:/etc/backplane/service.key")?;
//!
//! if let Some(registry) = config.registry_config()? {
//!     let client = create_discovery_client(&registry)?;
//!     client.register().await?;
//! }
//! ```

pub mod logging;
pub mod config;
pub mod engines;
pub mod discovery;
pub mod auth;

// Re-export commonly used types
pub use logging::{Logger, NoOpLogger, SharedLogger};

pub use config::{ConfigFile, ConfigError, FileConfigProvider};

pub use engines::{
    EngineRegistry, KeyEngine, KeyLocator, PrivateKeyMaterial,
    EngineError, EngineResult,
};

pub use discovery::{
    DiscoveryClient, DiscoveryError, DiscoveryResult, RegistryConfig,
    BackendFactory, BackendType, ServiceEndpoint,
    create_discovery_client,
};

pub use auth::{
    AuthInjector, HeaderCarrier, SecretProvider, SecretProviderError,
    SecretStoreConfig, create_secret_provider,
};
