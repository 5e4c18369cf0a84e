//! Errors raised by stores, backends and serializers

use std::path::PathBuf;

use thiserror::Error;

use super::template::TemplateError;
use crate::domain::IdError;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The key or value is not of the type this store accepts
    #[error("Type mismatch: expected {expected}, got {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// The value cannot be handled by the active serializer
    #[error("The {serializer} serializer cannot handle this value: {reason}")]
    InvalidValue {
        serializer: &'static str,
        reason: String,
    },

    #[error("The {0} serializer does not support deserialization")]
    DeserializationUnsupported(&'static str),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Cannot list keys: template '{0}' does not reference every key part")]
    NonInvertibleTemplate(String),

    #[error("Invalid store configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Identifier(#[from] IdError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for a missing key, the one error callers commonly branch on
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::KeyNotFound(_))
    }
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
