//! File-based configuration (YAML)
//!
//! Default location is `~/.config/backplane/config.yaml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::{AuthInjector, SecretStoreConfig};
use crate::discovery::RegistryConfig;
use crate::engines::{EngineRegistry, FileEngine, KeyEngine, PemEngine};

use super::error::{ConfigError, ConfigResult};

/// Configuration file structure
///
/// ```yaml
/// registry:
///   type: consul
///   host: localhost
///   port: 8500
///   service_key: core-data
/// secret_store:
///   type: openbao
///   host: localhost
///   port: 8200
///   service_key: core-data
/// key_engines: [file, pem]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub registry: Option<RegistryConfig>,

    #[serde(default)]
    pub secret_store: Option<SecretStoreConfig>,

    /// Engines to register at startup; empty means every built-in engine
    #[serde(default)]
    pub key_engines: Vec<String>,
}

impl ConfigFile {
    /// Parse a config from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Engine registry holding the engines listed in `key_engines`
    pub fn engine_registry(&self) -> ConfigResult<EngineRegistry> {
        if self.key_engines.is_empty() {
            return Ok(EngineRegistry::with_builtin_engines());
        }

        let registry = EngineRegistry::new();
        for id in &self.key_engines {
            let engine: Arc<dyn KeyEngine> = match id.as_str() {
                FileEngine::ID => Arc::new(FileEngine::new()),
                PemEngine::ID => Arc::new(PemEngine::new()),
                _ => return Err(ConfigError::UnknownEngine(id.clone())),
            };
            registry.register(engine);
        }
        Ok(registry)
    }

    /// Injector for the configured secret store; a no-op when none is configured
    pub fn auth_injector(&self) -> ConfigResult<AuthInjector> {
        match &self.secret_store {
            Some(store) => Ok(AuthInjector::from_config(store)?),
            None => Ok(AuthInjector::none()),
        }
    }

    /// Registry settings with the secret store's injector attached
    pub fn registry_config(&self) -> ConfigResult<Option<RegistryConfig>> {
        let Some(registry) = &self.registry else {
            return Ok(None);
        };
        let injector = self.auth_injector()?;
        Ok(Some(registry.clone().with_auth_injector(injector)))
    }
}

/// Reads and writes a YAML config file
pub struct FileConfigProvider {
    path: PathBuf,
}

impl FileConfigProvider {
    /// Create a provider for a specific path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a user-level provider (~/.config/backplane/config.yaml)
    pub fn user() -> Self {
        // XDG config directory on Linux, Application Support on macOS
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("backplane").join("config.yaml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the config; a missing file yields the default config
    pub fn load(&self) -> ConfigResult<ConfigFile> {
        if !self.exists() {
            crate::debug_log!("No config at {}, using defaults", self.path.display());
            return Ok(ConfigFile::default());
        }

        let content = fs::read_to_string(&self.path)?;
        ConfigFile::from_yaml(&content)
    }

    /// Write the config, creating parent directories as needed
    pub fn save(&self, config: &ConfigFile) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(config)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl std::fmt::Debug for FileConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigProvider")
            .field("path", &self.path)
            .field("exists", &self.exists())
            .finish()
    }
}
