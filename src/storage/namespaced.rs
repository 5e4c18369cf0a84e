//! Namespaced read/write store
//!
//! Composes an identifier type, a serializer and a backend. This is the only
//! layer that understands structured keys: it converts identifiers to tuples
//! for the backend and values to bytes through the serializer.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::backend::{Backend, StoreBackend, StoreBackendConfig};
use super::error::{StoreError, StoreResult};
use super::serializer::{SerializationType, Serializer};
use crate::domain::{IdentifierKind, ResourceIdentifier, Value};

/// Configuration of a [`NamespacedReadWriteStore`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespacedReadWriteStoreConfig {
    pub resource_identifier_class_name: IdentifierKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serialization_type: Option<SerializationType>,

    pub store_backend: StoreBackendConfig,
}

#[derive(Debug)]
pub struct NamespacedReadWriteStore {
    kind: IdentifierKind,
    serializer: Serializer,
    backend: Backend,
}

impl NamespacedReadWriteStore {
    /// Builds a store; `root_directory` anchors relative backend directories
    pub fn new(
        config: &NamespacedReadWriteStoreConfig,
        root_directory: Option<&Path>,
    ) -> StoreResult<Self> {
        let kind = config.resource_identifier_class_name;
        let backend = Backend::from_config(&config.store_backend, root_directory, kind.key_length())?;

        Ok(Self {
            kind,
            serializer: config.serialization_type.into(),
            backend,
        })
    }

    pub fn serializer(&self) -> Serializer {
        self.serializer
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Checks the identifier type, then flattens it for the backend
    pub fn convert_resource_identifier_to_tuple(
        &self,
        key: &ResourceIdentifier,
    ) -> StoreResult<Vec<String>> {
        if key.kind() != self.kind {
            return Err(StoreError::TypeMismatch {
                expected: self.kind.to_string(),
                found: key.kind().to_string(),
            });
        }
        Ok(key.to_tuple())
    }

    pub fn get(&self, key: &ResourceIdentifier) -> StoreResult<Value> {
        let tuple = self.convert_resource_identifier_to_tuple(key)?;
        let bytes = self.backend.get(&tuple).map_err(|e| match e {
            StoreError::KeyNotFound(_) => StoreError::KeyNotFound(key.to_string()),
            other => other,
        })?;

        tracing::debug!(key = %key, serializer = self.serializer.name(), "store get");
        self.serializer.deserialize(bytes)
    }

    pub fn set(&mut self, key: &ResourceIdentifier, value: &Value) -> StoreResult<()> {
        let tuple = self.convert_resource_identifier_to_tuple(key)?;
        let bytes = self.serializer.serialize(value)?;

        tracing::debug!(key = %key, serializer = self.serializer.name(), "store set");
        self.backend.set(&tuple, &bytes)
    }

    pub fn has_key(&self, key: &ResourceIdentifier) -> StoreResult<bool> {
        let tuple = self.convert_resource_identifier_to_tuple(key)?;
        self.backend.has_key(&tuple)
    }

    /// Every stored identifier, rebuilt from backend keys
    ///
    /// Backend keys that do not form a valid identifier, such as a stray
    /// `orders.bak.json` captured as the suite name `orders.bak`, are skipped.
    pub fn list_keys(&self) -> StoreResult<HashSet<ResourceIdentifier>> {
        let keys = self.backend.list_keys()?;
        tracing::trace!(count = keys.len(), "store list_keys");

        Ok(keys
            .iter()
            .filter_map(|tuple| match ResourceIdentifier::from_tuple(self.kind, tuple) {
                Ok(id) => Some(id),
                Err(e) => {
                    tracing::trace!(key = ?tuple, error = %e, "skipping key that is not an identifier");
                    None
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DataAssetIdentifier, Table, ValidationResultIdentifier};
    use crate::storage::FilesystemStoreBackendConfig;
    use tempfile::TempDir;

    fn in_memory_store(serialization_type: Option<SerializationType>) -> NamespacedReadWriteStore {
        let config = NamespacedReadWriteStoreConfig {
            resource_identifier_class_name: IdentifierKind::ValidationResultIdentifier,
            serialization_type,
            store_backend: StoreBackendConfig::default(),
        };
        NamespacedReadWriteStore::new(&config, None).unwrap()
    }

    fn vid(s: &str) -> ResourceIdentifier {
        s.parse().unwrap()
    }

    #[test]
    fn rejects_identifiers_of_another_type() {
        let mut store = in_memory_store(None);
        let wrong: ResourceIdentifier = DataAssetIdentifier::new("a", "b", "c").unwrap().into();

        assert!(matches!(store.get(&wrong), Err(StoreError::TypeMismatch { .. })));
        assert!(matches!(
            store.set(&wrong, &"x".into()),
            Err(StoreError::TypeMismatch { .. })
        ));
        assert!(matches!(store.has_key(&wrong), Err(StoreError::TypeMismatch { .. })));
    }

    #[test]
    fn empty_identifier_is_not_found() {
        let store = in_memory_store(None);
        let empty = ValidationResultIdentifier::default().into();

        match store.get(&empty) {
            Err(StoreError::KeyNotFound(k)) => assert_eq!(k, "ValidationResultIdentifier....."),
            other => panic!("expected KeyNotFound, got {:?}", other),
        }
    }

    #[test]
    fn convert_to_tuple() {
        let store = in_memory_store(None);
        let id = vid("ValidationResultIdentifier.a.b.c.quarantine.prod-100");

        assert_eq!(
            store.convert_resource_identifier_to_tuple(&id).unwrap(),
            vec!["a", "b", "c", "quarantine", "prod-100"]
        );
    }

    #[test]
    fn serializer_rejects_before_backend_write() {
        let mut store = in_memory_store(Some(SerializationType::Csv));
        let id = vid("ValidationResultIdentifier.a.b.c.quarantine.prod-100");

        assert!(matches!(
            store.set(&id, &"hi".into()),
            Err(StoreError::InvalidValue { .. })
        ));
        assert!(!store.has_key(&id).unwrap());

        store.set(&id, &Table::new(["x"]).into()).unwrap();
        assert!(store.has_key(&id).unwrap());
        assert!(matches!(
            store.get(&id),
            Err(StoreError::DeserializationUnsupported("csv"))
        ));
    }

    #[test]
    fn json_store_roundtrips_documents() {
        let mut store = in_memory_store(Some(SerializationType::Json));
        let id = vid("ValidationResultIdentifier.a.b.c.warning.run-1");
        let doc = serde_json::json!({"success": false, "statistics": {"evaluated": 3}});

        store.set(&id, &doc.clone().into()).unwrap();
        assert_eq!(store.get(&id).unwrap(), Value::Json(doc));
    }

    #[test]
    fn list_keys_skips_files_that_are_not_identifiers() {
        let dir = TempDir::new().unwrap();
        let config = NamespacedReadWriteStoreConfig {
            resource_identifier_class_name: IdentifierKind::ExpectationSuiteIdentifier,
            serialization_type: Some(SerializationType::Json),
            store_backend: StoreBackendConfig::Filesystem(FilesystemStoreBackendConfig {
                base_directory: "expectations/".to_string(),
                file_extension: Some("json".to_string()),
                filepath_template: "{0}/{1}/{2}/{3}.{file_extension}".to_string(),
                replaced_substring: Some("/".to_string()),
                replacement_string: Some("__".to_string()),
            }),
        };
        let mut store = NamespacedReadWriteStore::new(&config, Some(dir.path())).unwrap();

        let id = vid("ExpectationSuiteIdentifier.a.b.c.warning");
        store.set(&id, &serde_json::json!({}).into()).unwrap();
        std::fs::write(dir.path().join("expectations/a/b/c/warning.bak.json"), "{}").unwrap();

        assert_eq!(store.list_keys().unwrap(), HashSet::from([id]));
    }

    #[test]
    fn config_parses_from_toml() {
        let toml = r#"
resource_identifier_class_name = "ValidationResultIdentifier"
serialization_type = "csv"

[store_backend]
class_name = "InMemoryStoreBackend"
separator = "/"
"#;

        let config: NamespacedReadWriteStoreConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.serialization_type, Some(SerializationType::Csv));
        assert_eq!(
            config.store_backend,
            StoreBackendConfig::InMemory {
                separator: "/".to_string()
            }
        );
    }
}
