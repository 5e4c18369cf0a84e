//! Flat string-to-string store, for places that need no namespacing

use std::collections::HashMap;

use super::error::{StoreError, StoreResult};
use crate::domain::Value;

/// Unnamespaced in-memory store; keys list in insertion order
#[derive(Debug, Default)]
pub struct BasicInMemoryStore {
    values: HashMap<String, String>,
    order: Vec<String>,
}

impl BasicInMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> StoreResult<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| StoreError::KeyNotFound(key.to_string()))
    }

    /// Stores a text value; any other kind of value is a type mismatch
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> StoreResult<()> {
        let text = match value.into() {
            Value::Text(text) => text,
            other => {
                return Err(StoreError::TypeMismatch {
                    expected: "text".to_string(),
                    found: other.type_name().to_string(),
                })
            }
        };

        if self.values.insert(key.to_string(), text).is_none() {
            self.order.push(key.to_string());
        }
        Ok(())
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn list_keys(&self) -> Vec<String> {
        self.order.clone()
    }
}
