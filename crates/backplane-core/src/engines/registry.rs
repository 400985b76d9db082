//! Engine registry: id → engine

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::file_engine::FileEngine;
use super::locator::KeyLocator;
use super::pem_engine::PemEngine;
use super::traits::{EngineError, EngineResult, KeyEngine, PrivateKeyMaterial};

/// Thread-safe map from engine id to engine
///
/// Build one at process startup, register every available engine, then hand an
/// `Arc<EngineRegistry>` to whatever needs to resolve key addresses. Registration
/// may happen from several threads at once; lookups take a shared read lock.
///
/// Registering an engine under an id that is already bound replaces the previous
/// engine (last write wins). An engine reporting an empty id is ignored.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use backplane_core::engines::{EngineRegistry, PemEngine};
///
/// let registry = EngineRegistry::new();
/// registry.register(Arc::new(PemEngine::new()));
///
/// assert!(registry.lookup("pem").is_some());
/// assert!(registry.list_ids().contains("pem"));
/// ```
pub struct EngineRegistry {
    engines: RwLock<HashMap<String, Arc<dyn KeyEngine>>>,
}

impl EngineRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            engines: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry holding the `file` and `pem` engines
    pub fn with_builtin_engines() -> Self {
        let registry = Self::new();
        registry.register(Arc::new(FileEngine::new()));
        registry.register(Arc::new(PemEngine::new()));
        registry
    }

    /// Bind an engine under its own id, replacing any previous binding
    pub fn register(&self, engine: Arc<dyn KeyEngine>) {
        let id = engine.id().to_string();
        if id.is_empty() {
            crate::warn_log!("Ignoring key engine with an empty id");
            return;
        }

        let previous = self.engines.write().insert(id.clone(), engine);
        if previous.is_some() {
            crate::debug_log!("Replaced key engine '{}'", id);
        } else {
            crate::debug_log!("Registered key engine '{}'", id);
        }
    }

    /// Engine bound to `id`, if any
    pub fn lookup(&self, id: &str) -> Option<Arc<dyn KeyEngine>> {
        self.engines.read().get(id).cloned()
    }

    /// Check if an engine is bound to `id`
    pub fn contains(&self, id: &str) -> bool {
        self.engines.read().contains_key(id)
    }

    /// All registered ids (diagnostics only; order is meaningless)
    pub fn list_ids(&self) -> HashSet<String> {
        self.engines.read().keys().cloned().collect()
    }

    /// Remove a binding (mainly for test harnesses)
    pub fn unregister(&self, id: &str) -> Option<Arc<dyn KeyEngine>> {
        self.engines.write().remove(id)
    }

    pub fn len(&self) -> usize {
        self.engines.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.read().is_empty()
    }

    /// Resolve a key address to key material
    ///
    /// The address scheme selects the engine; addresses without a scheme go to `file`.
    pub fn load_key(&self, address: &str) -> EngineResult<PrivateKeyMaterial> {
        let locator = KeyLocator::parse(address)?;
        let engine = self
            .lookup(locator.engine())
            .ok_or_else(|| EngineError::UnknownEngine(locator.engine().to_string()))?;

        crate::debug_log!("Loading key with engine '{}'", locator.engine());
        engine.load_key(&locator)
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.list_ids().into_iter().collect();
        ids.sort();
        f.debug_struct("EngineRegistry").field("engines", &ids).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use crate::engines::test_keys::ED25519_PKCS8;
    use crate::engines::KeyFormat;

    /// Test engine whose keys carry its name as the DER bytes
    struct NamedEngine {
        id: String,
        name: String,
    }

    impl NamedEngine {
        fn new(id: &str, name: &str) -> Arc<dyn KeyEngine> {
            Arc::new(Self {
                id: id.to_string(),
                name: name.to_string(),
            })
        }
    }

    impl KeyEngine for NamedEngine {
        fn id(&self) -> &str {
            &self.id
        }

        fn load_key(&self, _locator: &KeyLocator) -> EngineResult<PrivateKeyMaterial> {
            Ok(PrivateKeyMaterial::new(KeyFormat::Other, self.name.as_bytes().to_vec()))
        }
    }

    fn name_of(registry: &EngineRegistry, id: &str) -> String {
        let engine = registry.lookup(id).unwrap();
        let locator = KeyLocator::parse(&format!("{}:x", id)).unwrap();
        String::from_utf8(engine.load_key(&locator).unwrap().der().to_vec()).unwrap()
    }

    #[test]
    fn test_builtin_engines_registered() {
        let registry = EngineRegistry::with_builtin_engines();
        assert_eq!(
            registry.list_ids(),
            HashSet::from(["file".to_string(), "pem".to_string()])
        );
    }

    #[test]
    fn test_distinct_ids_resolve_to_their_engines() {
        let registry = EngineRegistry::new();
        registry.register(NamedEngine::new("tpm", "first"));
        registry.register(NamedEngine::new("pkcs11", "second"));

        assert_eq!(name_of(&registry, "tpm"), "first");
        assert_eq!(name_of(&registry, "pkcs11"), "second");
    }

    #[test]
    fn test_reregister_last_write_wins() {
        let registry = EngineRegistry::new();
        registry.register(NamedEngine::new("tpm", "old"));
        registry.register(NamedEngine::new("tpm", "new"));

        assert_eq!(registry.len(), 1);
        assert_eq!(name_of(&registry, "tpm"), "new");
    }

    #[test]
    fn test_empty_id_is_ignored() {
        let registry = EngineRegistry::new();
        registry.register(NamedEngine::new("", "nameless"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_lookup_unknown_is_none() {
        let registry = EngineRegistry::with_builtin_engines();
        assert!(registry.lookup("nonexistent_xyz").is_none());
        assert!(!registry.contains("nonexistent_xyz"));
    }

    #[test]
    fn test_unregister() {
        let registry = EngineRegistry::with_builtin_engines();
        assert!(registry.unregister("pem").is_some());
        assert!(registry.unregister("pem").is_none());
        assert!(!registry.contains("pem"));
    }

    #[test]
    fn test_load_key_dispatches_on_scheme() {
        let registry = EngineRegistry::with_builtin_engines();
        registry.register(NamedEngine::new("pkcs11", "hsm"));

        let key = registry.load_key("pkcs11:softhsm2?slot=0").unwrap();
        assert_eq!(key.format(), KeyFormat::Other);
        assert_eq!(key.der(), b"hsm");

        let inline = registry.load_key(&format!("pem:{}", ED25519_PKCS8)).unwrap();
        assert_eq!(inline.format(), KeyFormat::Pkcs8);
    }

    #[test]
    fn test_load_key_unknown_engine() {
        let registry = EngineRegistry::with_builtin_engines();
        let err = registry.load_key("tpm:slot0").unwrap_err();
        assert!(matches!(err, EngineError::UnknownEngine(ref id) if id == "tpm"));
        assert!(err.to_string().contains("tpm"));
    }

    #[test]
    fn test_debug_lists_sorted_ids() {
        let registry = EngineRegistry::with_builtin_engines();
        assert_eq!(
            format!("{:?}", registry),
            r#"EngineRegistry { engines: ["file", "pem"] }"#
        );
    }

    #[test]
    fn test_concurrent_registration_and_lookup() {
        const N: usize = 32;
        let registry = Arc::new(EngineRegistry::new());

        let writers: Vec<_> = (0..N)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let id = format!("engine-{}", i);
                    registry.register(NamedEngine::new(&id, &format!("name-{}", i)));
                })
            })
            .collect();
        for handle in writers {
            handle.join().unwrap();
        }

        let readers: Vec<_> = (0..N)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || name_of(&registry, &format!("engine-{}", i)))
            })
            .collect();
        for (i, handle) in readers.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), format!("name-{}", i));
        }

        assert_eq!(registry.len(), N);
    }
}
