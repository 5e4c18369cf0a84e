//! Stratum - namespaced, pluggable key-value stores
//!
//! Stores map structured resource identifiers (data assets, expectation
//! suites, validation results) to values. Each store pairs a serializer with
//! a backend chosen by configuration: an in-memory map or a directory tree
//! laid out by a path template.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{IdentifierKind, ResourceIdentifier, Value};
pub use storage::{NamespacedReadWriteStore, StoreError};
