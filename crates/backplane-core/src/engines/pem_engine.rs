//! Keys embedded directly in the address

use super::locator::KeyLocator;
use super::pem::decode_private_key;
use super::traits::{EngineResult, KeyEngine, PrivateKeyMaterial};

/// Engine for `pem:<PEM text>` addresses
#[derive(Debug, Default, Clone, Copy)]
pub struct PemEngine;

impl PemEngine {
    pub const ID: &'static str = "pem";

    pub fn new() -> Self {
        Self
    }
}

impl KeyEngine for PemEngine {
    fn id(&self) -> &str {
        Self::ID
    }

    fn load_key(&self, locator: &KeyLocator) -> EngineResult<PrivateKeyMaterial> {
        // The whole remainder is PEM; '?' has no special meaning here.
        decode_private_key(locator.opaque())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::test_keys::EC_P256_SEC1;
    use crate::engines::{EngineError, KeyFormat};

    #[test]
    fn test_load_inline_key() {
        let address = format!("pem:{}", EC_P256_SEC1);
        let key = PemEngine::new().load_key(&KeyLocator::parse(&address).unwrap()).unwrap();
        assert_eq!(key.format(), KeyFormat::Sec1);
    }

    #[test]
    fn test_inline_garbage() {
        let locator = KeyLocator::parse("pem:not a key").unwrap();
        assert!(matches!(PemEngine::new().load_key(&locator), Err(EngineError::InvalidPem(_))));
    }
}
