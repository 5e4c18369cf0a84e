//! Domain models for stratum
//!
//! Identifiers and values, without any I/O concerns.

mod id;
mod value;

pub use id::{
    DataAssetIdentifier, ExpectationSuiteIdentifier, IdError, IdentifierKind, ResourceIdentifier,
    ValidationResultIdentifier, DELIMITER,
};
pub use value::{Cell, Table, TableError, Value};
