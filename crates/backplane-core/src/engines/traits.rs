//! Core traits and types for key-loading engines

use std::fmt;

use rustls::pki_types::PrivateKeyDer;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::locator::KeyLocator;

/// Errors that can occur while resolving or loading a private key
///
/// No variant carries key material; messages are safe to log.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Key locator is empty")]
    EmptyLocator,

    #[error("No key engine registered for '{0}'")]
    UnknownEngine(String),

    #[error("Failed to read key file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid PEM data: {0}")]
    InvalidPem(String),

    #[error("Encrypted private keys are not supported")]
    EncryptedKey,

    #[error("PEM block '{0}' is not a private key")]
    NotAPrivateKey(String),

    /// The DER does not parse as an RSA, ECDSA or EdDSA key
    #[error("Unusable private key: {0}")]
    UnsupportedKey(String),

    #[error("Engine error: {0}")]
    Other(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Encoding of the DER bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFormat {
    /// PKCS#1 RSA key (`RSA PRIVATE KEY`)
    Pkcs1,
    /// SEC1 EC key (`EC PRIVATE KEY`)
    Sec1,
    /// PKCS#8 (`PRIVATE KEY`)
    Pkcs8,
    /// Engine-specific encoding
    Other,
}

impl KeyFormat {
    /// PEM label for this encoding
    pub fn pem_label(&self) -> &'static str {
        match self {
            KeyFormat::Pkcs1 => "RSA PRIVATE KEY",
            KeyFormat::Sec1 => "EC PRIVATE KEY",
            KeyFormat::Pkcs8 => "PRIVATE KEY",
            KeyFormat::Other => "PRIVATE KEY DATA",
        }
    }
}

impl From<&PrivateKeyDer<'_>> for KeyFormat {
    fn from(key: &PrivateKeyDer<'_>) -> Self {
        match key {
            PrivateKeyDer::Pkcs1(_) => KeyFormat::Pkcs1,
            PrivateKeyDer::Sec1(_) => KeyFormat::Sec1,
            PrivateKeyDer::Pkcs8(_) => KeyFormat::Pkcs8,
            _ => KeyFormat::Other,
        }
    }
}

/// Private key material returned by an engine
///
/// The DER bytes are wiped when the value is dropped, and `Debug` never prints them.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKeyMaterial {
    #[zeroize(skip)]
    format: KeyFormat,
    der: Vec<u8>,
}

impl PrivateKeyMaterial {
    pub fn new(format: KeyFormat, der: Vec<u8>) -> Self {
        Self { format, der }
    }

    pub fn format(&self) -> KeyFormat {
        self.format
    }

    /// PEM label matching the encoding (e.g. `EC PRIVATE KEY`)
    pub fn label(&self) -> &'static str {
        self.format.pem_label()
    }

    /// Raw DER encoding
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Borrow the key as a rustls key, `None` for engine-specific encodings
    pub fn as_key_der(&self) -> Option<PrivateKeyDer<'_>> {
        let der = self.der.as_slice();
        match self.format {
            KeyFormat::Pkcs1 => Some(PrivateKeyDer::Pkcs1(der.into())),
            KeyFormat::Sec1 => Some(PrivateKeyDer::Sec1(der.into())),
            KeyFormat::Pkcs8 => Some(PrivateKeyDer::Pkcs8(der.into())),
            KeyFormat::Other => None,
        }
    }
}

impl From<PrivateKeyDer<'_>> for PrivateKeyMaterial {
    fn from(key: PrivateKeyDer<'_>) -> Self {
        Self::new(KeyFormat::from(&key), key.secret_der().to_vec())
    }
}

impl fmt::Debug for PrivateKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKeyMaterial")
            .field("format", &self.format)
            .field("der", &format_args!("<{} bytes redacted>", self.der.len()))
            .finish()
    }
}

/// Trait for private-key loading engines
///
/// An engine is identified by the scheme it serves in a key address. Engines are
/// registered with an [`EngineRegistry`](super::EngineRegistry) during startup and
/// looked up by that id afterwards.
pub trait KeyEngine: Send + Sync {
    /// Identifier this engine serves (the key address scheme, lowercase)
    fn id(&self) -> &str;

    /// Load the private key the locator points at
    fn load_key(&self, locator: &KeyLocator) -> EngineResult<PrivateKeyMaterial>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_rustls_key() {
        let key = PrivateKeyDer::Sec1(vec![1, 2, 3].into());
        let material = PrivateKeyMaterial::from(key);
        assert_eq!(material.format(), KeyFormat::Sec1);
        assert_eq!(material.label(), "EC PRIVATE KEY");
        assert_eq!(material.der(), &[1, 2, 3]);
        assert!(matches!(material.as_key_der(), Some(PrivateKeyDer::Sec1(_))));
    }

    #[test]
    fn test_engine_specific_format_has_no_rustls_form() {
        let material = PrivateKeyMaterial::new(KeyFormat::Other, b"handle:7".to_vec());
        assert!(material.as_key_der().is_none());
    }

    #[test]
    fn test_debug_redacts_der() {
        let key = PrivateKeyMaterial::new(KeyFormat::Pkcs8, vec![0xde, 0xad, 0xbe, 0xef]);
        let rendered = format!("{:?}", key);
        assert!(rendered.contains("<4 bytes redacted>"));
        assert!(!rendered.contains("222")); // 0xde
        assert!(!rendered.contains("173")); // 0xad
    }
}
