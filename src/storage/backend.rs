//! Store backends
//!
//! A backend owns physical layout only. It is keyed by the identifier tuple
//! and stores opaque bytes; it knows nothing about identifier types or value
//! encoding. Configuration selects one of a closed set of backends when the
//! owning store is constructed.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::StoreResult;
use super::filesystem::{FilesystemStoreBackend, FilesystemStoreBackendConfig};
use super::memory::InMemoryStoreBackend;

/// Storage engine contract shared by every backend
pub trait StoreBackend {
    /// Reads the value stored under `key`; a miss is [`StoreError::KeyNotFound`](super::StoreError::KeyNotFound)
    fn get(&self, key: &[String]) -> StoreResult<Vec<u8>>;

    /// Writes `value` under `key`, replacing any previous value
    fn set(&mut self, key: &[String], value: &[u8]) -> StoreResult<()>;

    fn has_key(&self, key: &[String]) -> StoreResult<bool>;

    /// Every key that has been set, in no particular order
    fn list_keys(&self) -> StoreResult<Vec<Vec<String>>>;
}

fn default_separator() -> String {
    ".".to_string()
}

/// Backend section of a store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class_name")]
pub enum StoreBackendConfig {
    #[serde(rename = "InMemoryStoreBackend")]
    InMemory {
        #[serde(default = "default_separator")]
        separator: String,
    },

    #[serde(rename = "FilesystemStoreBackend")]
    Filesystem(FilesystemStoreBackendConfig),
}

impl Default for StoreBackendConfig {
    fn default() -> Self {
        StoreBackendConfig::InMemory {
            separator: default_separator(),
        }
    }
}

/// A backend resolved from configuration
#[derive(Debug)]
pub enum Backend {
    InMemory(InMemoryStoreBackend),
    Filesystem(FilesystemStoreBackend),
}

impl Backend {
    /// Builds the configured backend for keys of `key_length` parts
    pub fn from_config(
        config: &StoreBackendConfig,
        root_directory: Option<&Path>,
        key_length: usize,
    ) -> StoreResult<Self> {
        Ok(match config {
            StoreBackendConfig::InMemory { separator } => {
                Backend::InMemory(InMemoryStoreBackend::new(separator)?)
            }
            StoreBackendConfig::Filesystem(fs_config) => Backend::Filesystem(
                FilesystemStoreBackend::new(fs_config, root_directory, key_length)?,
            ),
        })
    }

    pub fn as_in_memory(&self) -> Option<&InMemoryStoreBackend> {
        match self {
            Backend::InMemory(backend) => Some(backend),
            _ => None,
        }
    }
}

impl StoreBackend for Backend {
    fn get(&self, key: &[String]) -> StoreResult<Vec<u8>> {
        match self {
            Backend::InMemory(backend) => backend.get(key),
            Backend::Filesystem(backend) => backend.get(key),
        }
    }

    fn set(&mut self, key: &[String], value: &[u8]) -> StoreResult<()> {
        match self {
            Backend::InMemory(backend) => backend.set(key, value),
            Backend::Filesystem(backend) => backend.set(key, value),
        }
    }

    fn has_key(&self, key: &[String]) -> StoreResult<bool> {
        match self {
            Backend::InMemory(backend) => backend.has_key(key),
            Backend::Filesystem(backend) => backend.has_key(key),
        }
    }

    fn list_keys(&self) -> StoreResult<Vec<Vec<String>>> {
        match self {
            Backend::InMemory(backend) => backend.list_keys(),
            Backend::Filesystem(backend) => backend.list_keys(),
        }
    }
}
