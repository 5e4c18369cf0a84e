//! In-memory backend
//!
//! Joins the key tuple with a separator into one flat string key.

use std::collections::HashMap;

use super::backend::StoreBackend;
use super::error::{StoreError, StoreResult};

#[derive(Debug, Default)]
pub struct InMemoryStoreBackend {
    separator: String,
    store: HashMap<String, Vec<u8>>,
}

impl InMemoryStoreBackend {
    pub fn new(separator: &str) -> StoreResult<Self> {
        if separator.is_empty() {
            return Err(StoreError::Config(
                "in-memory backend separator must not be empty".to_string(),
            ));
        }

        Ok(Self {
            separator: separator.to_string(),
            store: HashMap::new(),
        })
    }

    /// The flat keys and values as stored
    pub fn raw_entries(&self) -> &HashMap<String, Vec<u8>> {
        &self.store
    }

    fn flat_key(&self, key: &[String]) -> StoreResult<String> {
        if let Some(part) = key.iter().find(|part| part.contains(self.separator.as_str())) {
            return Err(StoreError::InvalidKey(format!(
                "key part '{}' contains the separator '{}'",
                part, self.separator
            )));
        }

        // Parts can still straddle a multi-character separator, as `a-` + `--` + `b`
        let flat = key.join(&self.separator);
        if !flat.split(self.separator.as_str()).eq(key.iter().map(String::as_str)) {
            return Err(StoreError::InvalidKey(format!(
                "key {:?} does not split back into its parts on '{}'",
                key, self.separator
            )));
        }
        Ok(flat)
    }
}

impl StoreBackend for InMemoryStoreBackend {
    fn get(&self, key: &[String]) -> StoreResult<Vec<u8>> {
        let flat = self.flat_key(key)?;
        self.store
            .get(&flat)
            .cloned()
            .ok_or(StoreError::KeyNotFound(flat))
    }

    fn set(&mut self, key: &[String], value: &[u8]) -> StoreResult<()> {
        let flat = self.flat_key(key)?;
        tracing::debug!(key = %flat, bytes = value.len(), "in-memory set");
        self.store.insert(flat, value.to_vec());
        Ok(())
    }

    fn has_key(&self, key: &[String]) -> StoreResult<bool> {
        Ok(self.store.contains_key(&self.flat_key(key)?))
    }

    fn list_keys(&self) -> StoreResult<Vec<Vec<String>>> {
        Ok(self
            .store
            .keys()
            .map(|flat| flat.split(self.separator.as_str()).map(str::to_string).collect())
            .collect())
    }
}
