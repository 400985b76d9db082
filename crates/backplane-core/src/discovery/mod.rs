//! Service registry / discovery backends
//!
//! The platform talks to its registry through the `DiscoveryClient` trait; which
//! backend sits behind it is chosen at runtime from the config `type` tag:
//! - `keeper`: `KeeperClient`
//! - `consul`: `ConsulClient`
//!
//! `MemoryDiscoveryClient` is an in-process stand-in for tests.
//!
//! ```
//! use backplane_core::discovery::{create_discovery_client, DiscoveryError, RegistryConfig};
//!
//! let config = RegistryConfig::new("bogus", "localhost", 59890);
//! let err = create_discovery_client(&config).err().unwrap();
//! assert!(matches!(err, DiscoveryError::UnsupportedBackend(ref tag) if tag == "bogus"));
//! ```

mod traits;
mod error;
mod config;
mod transport;
mod factory;
mod keeper;
mod consul;
mod memory;

pub use traits::{DiscoveryClient, HealthCheck, ServiceEndpoint, ServiceStatus};
pub use error::{DiscoveryError, DiscoveryResult};
pub use config::RegistryConfig;
pub use factory::{create_discovery_client, BackendConstructor, BackendFactory, BackendType};
pub use keeper::KeeperClient;
pub use consul::ConsulClient;
pub use memory::MemoryDiscoveryClient;
