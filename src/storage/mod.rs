//! # Storage Layer
//!
//! Namespaced, pluggable key-value stores.
//!
//! ## Layers
//!
//! | Layer | Responsibility | Types |
//! |-------|----------------|-------|
//! | Store | Identifier type guard, key and value translation | [`NamespacedReadWriteStore`] |
//! | Serializer | Value ↔ bytes | [`Serializer`] (raw, json, csv) |
//! | Backend | Physical layout of flat keys | [`InMemoryStoreBackend`], [`FilesystemStoreBackend`] |
//!
//! Backend and serializer are chosen independently by configuration and
//! resolved once, when the store is built.
//!
//! ## Simpler Stores
//!
//! - [`BasicInMemoryStore`] - flat string map, no identifiers
//! - [`FileSystemWriteOnlyStore`] / [`DelimitedFileSystemWriteOnlyStore`] -
//!   produce files, never read them back
//!
//! ## Project Structure
//!
//! ```text
//! stratum/
//! ├── config.toml           # Store configuration
//! ├── expectations/         # Expectation suites (JSON)
//! ├── datasources/
//! ├── notebooks/            # Copied notebook templates
//! ├── plugins/
//! ├── fixtures/
//! ├── uncommitted/
//! │   ├── validations/      # Validation results, by run id
//! │   ├── credentials/
//! │   └── samples/          # Quarantined rows (CSV)
//! └── .gitignore            # Ignores uncommitted/
//! ```

mod backend;
mod basic;
mod config;
mod error;
mod filesystem;
mod memory;
mod namespaced;
mod project;
mod serializer;
mod template;
mod write_only;

pub use backend::{Backend, StoreBackend, StoreBackendConfig};
pub use basic::BasicInMemoryStore;
pub use config::{Config, ConfigError, ProjectConfig, CONFIG_FILE, DEFAULT_CONFIG, PROJECT_DIR};
pub use error::{StoreError, StoreResult};
pub use filesystem::{FilesystemStoreBackend, FilesystemStoreBackendConfig};
pub use memory::InMemoryStoreBackend;
pub use namespaced::{NamespacedReadWriteStore, NamespacedReadWriteStoreConfig};
pub use project::{Project, ProjectError};
pub use serializer::{SerializationType, Serializer};
pub use template::{PathTemplate, TemplateError};
pub use write_only::{DelimitedFileSystemWriteOnlyStore, FileSystemWriteOnlyStore, WriteOnlyStoreConfig};
