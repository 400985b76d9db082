//! Bootstrap configuration
//!
//! One YAML file describes the registry backend, the secret store and the key
//! engines to enable. `FileConfigProvider` reads it; `ConfigFile` turns it into
//! the runtime pieces (engine registry, auth injector, registry config).

mod error;
mod file;

pub use error::{ConfigError, ConfigResult};
pub use file::{ConfigFile, FileConfigProvider};
