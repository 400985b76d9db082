//! PEM files on the local filesystem

use std::fs;
use std::path::PathBuf;

use super::locator::KeyLocator;
use super::pem::decode_private_key;
use super::traits::{EngineError, EngineResult, KeyEngine, PrivateKeyMaterial};

/// Engine for `file:` addresses and bare paths
///
/// Accepts `file:/abs/path`, `file:///abs/path`, `file:relative/path` and plain paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileEngine;

impl FileEngine {
    pub const ID: &'static str = "file";

    pub fn new() -> Self {
        Self
    }

    /// Filesystem path a locator refers to
    ///
    /// `file://host/path` names a remote host and is rejected; only an empty
    /// authority (`file:///path`) is accepted.
    pub fn resolve_path(locator: &KeyLocator) -> EngineResult<PathBuf> {
        let path = locator.path();
        let Some(rest) = path.strip_prefix("//") else {
            return Ok(PathBuf::from(path));
        };

        let authority = rest.split('/').next().unwrap_or_default();
        if !authority.is_empty() {
            return Err(EngineError::Other(format!(
                "file addresses with a host are not supported: '{}'",
                authority
            )));
        }
        Ok(PathBuf::from(rest))
    }
}

impl KeyEngine for FileEngine {
    fn id(&self) -> &str {
        Self::ID
    }

    fn load_key(&self, locator: &KeyLocator) -> EngineResult<PrivateKeyMaterial> {
        let path = Self::resolve_path(locator)?;
        let content = fs::read_to_string(&path).map_err(|source| EngineError::Read {
            path: path.display().to_string(),
            source,
        })?;
        decode_private_key(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::engines::test_keys::ED25519_PKCS8;
    use crate::engines::KeyFormat;

    #[test]
    fn test_resolve_path_forms() {
        let cases = [
            ("file:/etc/key.pem", "/etc/key.pem"),
            ("file:///etc/key.pem", "/etc/key.pem"),
            ("file:certs/key.pem", "certs/key.pem"),
            ("/etc/key.pem", "/etc/key.pem"),
        ];
        for (address, expected) in cases {
            let locator = KeyLocator::parse(address).unwrap();
            assert_eq!(FileEngine::resolve_path(&locator).unwrap(), PathBuf::from(expected), "{}", address);
        }
    }

    #[test]
    fn test_remote_host_rejected() {
        let locator = KeyLocator::parse("file://keyserver/etc/key.pem").unwrap();
        let err = FileEngine::resolve_path(&locator).unwrap_err();
        assert!(matches!(err, EngineError::Other(ref msg) if msg.contains("keyserver")));

        // Never falls through to a relative `keyserver/etc/key.pem`.
        assert!(matches!(
            FileEngine::new().load_key(&locator),
            Err(EngineError::Other(_))
        ));
    }

    #[test]
    fn test_load_key_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ED25519_PKCS8.as_bytes()).unwrap();

        let address = format!("file:{}", file.path().display());
        let key = FileEngine::new().load_key(&KeyLocator::parse(&address).unwrap()).unwrap();
        assert_eq!(key.format(), KeyFormat::Pkcs8);
    }

    #[test]
    fn test_missing_file() {
        let locator = KeyLocator::parse("file:/definitely/not/here.pem").unwrap();
        let err = FileEngine::new().load_key(&locator).unwrap_err();
        assert!(matches!(err, EngineError::Read { ref path, .. } if path == "/definitely/not/here.pem"));
    }
}
