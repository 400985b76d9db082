//! Outbound request authentication
//!
//! A service attaches its own identity token to calls it makes to other services:
//! - `SecretProvider` trait for anything that can hand out the service's token
//! - Built-in providers: `InsecureSecretProvider`, `StaticSecretProvider`,
//!   `OpenBaoSecretProvider`
//! - `AuthInjector`, which sets `Authorization: Bearer <token>` on a request and
//!   does nothing at all when no provider is configured
//!
//! ```
//! use backplane_core::auth::AuthInjector;
//!
//! let injector = AuthInjector::none();
//! assert!(!injector.has_provider());
//! ```

mod traits;
mod config;
mod injector;
mod providers;
mod openbao;

pub use traits::{SecretProvider, SecretProviderError, SecretProviderResult};
pub use config::{SecretStoreConfig, SecretStoreType};
pub use injector::{AuthInjector, HeaderCarrier};
pub use providers::{InsecureSecretProvider, StaticSecretProvider};
pub use openbao::OpenBaoSecretProvider;

use std::sync::Arc;

/// Build the secret provider a config names
///
/// Returns `Ok(None)` for store type `none`, which leaves any injector built from the
/// result as a no-op.
pub fn create_secret_provider(
    config: &SecretStoreConfig,
) -> SecretProviderResult<Option<Arc<dyn SecretProvider>>> {
    let kind = config.store_type()?;
    crate::debug_log!("Creating secret provider '{}'", kind.as_str());

    let provider: Arc<dyn SecretProvider> = match kind {
        SecretStoreType::None => return Ok(None),
        SecretStoreType::Insecure => Arc::new(InsecureSecretProvider::new()),
        SecretStoreType::Static => {
            let token = config.static_token.clone().ok_or_else(|| {
                SecretProviderError::InvalidConfig("static secret store requires static_token".to_string())
            })?;
            Arc::new(StaticSecretProvider::new(token))
        }
        SecretStoreType::OpenBao => Arc::new(OpenBaoSecretProvider::from_config(config)?),
    };
    Ok(Some(provider))
}
