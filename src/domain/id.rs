//! Structured resource identifiers
//!
//! Canonical format: `{TypeName}.{part0}.{part1}...{partN}`
//! - Data assets: `DataAssetIdentifier.{datasource}.{generator}.{generator_asset}`
//! - Expectation suites: `ExpectationSuiteIdentifier.{...data asset...}.{suite}`
//! - Validation results: `ValidationResultIdentifier.{...suite...}.{run_id}`
//!
//! Identifiers nest (a validation result names a suite, a suite names a data
//! asset) and flatten into a plain tuple of strings for backend consumption.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Delimiter between the type tag and the parts in canonical form
pub const DELIMITER: char = '.';

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Expected identifier of type '{1}', got '{0}'")]
    WrongType(String, &'static str),

    #[error("Unknown identifier type in '{0}'")]
    UnknownType(String),

    #[error("{type_name} takes {expected} parts, got {actual}")]
    WrongPartCount {
        type_name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Identifier part '{0}' must not contain '.'")]
    InvalidPart(String),
}

/// Which identifier type a store accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentifierKind {
    DataAssetIdentifier,
    ExpectationSuiteIdentifier,
    ValidationResultIdentifier,
}

impl IdentifierKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            IdentifierKind::DataAssetIdentifier => DataAssetIdentifier::TYPE_NAME,
            IdentifierKind::ExpectationSuiteIdentifier => ExpectationSuiteIdentifier::TYPE_NAME,
            IdentifierKind::ValidationResultIdentifier => ValidationResultIdentifier::TYPE_NAME,
        }
    }

    /// Number of parts in the flattened tuple
    pub fn key_length(&self) -> usize {
        match self {
            IdentifierKind::DataAssetIdentifier => DataAssetIdentifier::KEY_LENGTH,
            IdentifierKind::ExpectationSuiteIdentifier => ExpectationSuiteIdentifier::KEY_LENGTH,
            IdentifierKind::ValidationResultIdentifier => ValidationResultIdentifier::KEY_LENGTH,
        }
    }

    fn from_type_name(name: &str) -> Option<Self> {
        [
            IdentifierKind::DataAssetIdentifier,
            IdentifierKind::ExpectationSuiteIdentifier,
            IdentifierKind::ValidationResultIdentifier,
        ]
        .into_iter()
        .find(|kind| kind.type_name() == name)
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

fn check_part(part: &str) -> Result<String, IdError> {
    if part.contains(DELIMITER) {
        return Err(IdError::InvalidPart(part.to_string()));
    }
    Ok(part.to_string())
}

fn check_length(type_name: &'static str, expected: usize, parts: &[String]) -> Result<(), IdError> {
    if parts.len() != expected {
        return Err(IdError::WrongPartCount {
            type_name,
            expected,
            actual: parts.len(),
        });
    }
    Ok(())
}

/// Splits a canonical string, checking the leading type tag
fn split_canonical(s: &str, type_name: &'static str) -> Result<Vec<String>, IdError> {
    let mut pieces = s.split(DELIMITER);
    match pieces.next() {
        Some(tag) if tag == type_name => Ok(pieces.map(str::to_string).collect()),
        _ => Err(IdError::WrongType(s.to_string(), type_name)),
    }
}

fn write_canonical(f: &mut fmt::Formatter<'_>, type_name: &str, parts: &[String]) -> fmt::Result {
    f.write_str(type_name)?;
    for part in parts {
        write!(f, "{}{}", DELIMITER, part)?;
    }
    Ok(())
}

/// Data asset identifier: `{datasource}.{generator}.{generator_asset}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataAssetIdentifier {
    datasource: String,
    generator: String,
    generator_asset: String,
}

impl DataAssetIdentifier {
    pub const TYPE_NAME: &'static str = "DataAssetIdentifier";
    pub const KEY_LENGTH: usize = 3;

    pub fn new(datasource: &str, generator: &str, generator_asset: &str) -> Result<Self, IdError> {
        Ok(Self {
            datasource: check_part(datasource)?,
            generator: check_part(generator)?,
            generator_asset: check_part(generator_asset)?,
        })
    }

    pub fn datasource(&self) -> &str {
        &self.datasource
    }

    pub fn generator(&self) -> &str {
        &self.generator
    }

    pub fn generator_asset(&self) -> &str {
        &self.generator_asset
    }

    pub fn to_tuple(&self) -> Vec<String> {
        vec![
            self.datasource.clone(),
            self.generator.clone(),
            self.generator_asset.clone(),
        ]
    }

    pub fn from_tuple(parts: &[String]) -> Result<Self, IdError> {
        check_length(Self::TYPE_NAME, Self::KEY_LENGTH, parts)?;
        Self::new(&parts[0], &parts[1], &parts[2])
    }
}

/// Expectation suite identifier: a data asset plus a suite name
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExpectationSuiteIdentifier {
    data_asset_name: DataAssetIdentifier,
    expectation_suite_name: String,
}

impl ExpectationSuiteIdentifier {
    pub const TYPE_NAME: &'static str = "ExpectationSuiteIdentifier";
    pub const KEY_LENGTH: usize = DataAssetIdentifier::KEY_LENGTH + 1;

    pub fn new(
        data_asset_name: DataAssetIdentifier,
        expectation_suite_name: &str,
    ) -> Result<Self, IdError> {
        Ok(Self {
            data_asset_name,
            expectation_suite_name: check_part(expectation_suite_name)?,
        })
    }

    pub fn data_asset_name(&self) -> &DataAssetIdentifier {
        &self.data_asset_name
    }

    pub fn expectation_suite_name(&self) -> &str {
        &self.expectation_suite_name
    }

    pub fn to_tuple(&self) -> Vec<String> {
        let mut parts = self.data_asset_name.to_tuple();
        parts.push(self.expectation_suite_name.clone());
        parts
    }

    pub fn from_tuple(parts: &[String]) -> Result<Self, IdError> {
        check_length(Self::TYPE_NAME, Self::KEY_LENGTH, parts)?;
        let (asset, rest) = parts.split_at(DataAssetIdentifier::KEY_LENGTH);
        Self::new(DataAssetIdentifier::from_tuple(asset)?, &rest[0])
    }
}

/// Validation result identifier: an expectation suite plus a run id
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValidationResultIdentifier {
    expectation_suite_identifier: ExpectationSuiteIdentifier,
    run_id: String,
}

impl ValidationResultIdentifier {
    pub const TYPE_NAME: &'static str = "ValidationResultIdentifier";
    pub const KEY_LENGTH: usize = ExpectationSuiteIdentifier::KEY_LENGTH + 1;

    pub fn new(
        expectation_suite_identifier: ExpectationSuiteIdentifier,
        run_id: &str,
    ) -> Result<Self, IdError> {
        Ok(Self {
            expectation_suite_identifier,
            run_id: check_part(run_id)?,
        })
    }

    pub fn expectation_suite_identifier(&self) -> &ExpectationSuiteIdentifier {
        &self.expectation_suite_identifier
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn to_tuple(&self) -> Vec<String> {
        let mut parts = self.expectation_suite_identifier.to_tuple();
        parts.push(self.run_id.clone());
        parts
    }

    pub fn from_tuple(parts: &[String]) -> Result<Self, IdError> {
        check_length(Self::TYPE_NAME, Self::KEY_LENGTH, parts)?;
        let (suite, rest) = parts.split_at(ExpectationSuiteIdentifier::KEY_LENGTH);
        Self::new(ExpectationSuiteIdentifier::from_tuple(suite)?, &rest[0])
    }
}

impl fmt::Display for DataAssetIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_canonical(f, Self::TYPE_NAME, &self.to_tuple())
    }
}

impl fmt::Display for ExpectationSuiteIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_canonical(f, Self::TYPE_NAME, &self.to_tuple())
    }
}

impl fmt::Display for ValidationResultIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_canonical(f, Self::TYPE_NAME, &self.to_tuple())
    }
}

impl FromStr for DataAssetIdentifier {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tuple(&split_canonical(s, Self::TYPE_NAME)?)
    }
}

impl FromStr for ExpectationSuiteIdentifier {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tuple(&split_canonical(s, Self::TYPE_NAME)?)
    }
}

impl FromStr for ValidationResultIdentifier {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tuple(&split_canonical(s, Self::TYPE_NAME)?)
    }
}

/// Any identifier a store can be configured for
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ResourceIdentifier {
    DataAsset(DataAssetIdentifier),
    ExpectationSuite(ExpectationSuiteIdentifier),
    ValidationResult(ValidationResultIdentifier),
}

impl ResourceIdentifier {
    pub fn kind(&self) -> IdentifierKind {
        match self {
            ResourceIdentifier::DataAsset(_) => IdentifierKind::DataAssetIdentifier,
            ResourceIdentifier::ExpectationSuite(_) => IdentifierKind::ExpectationSuiteIdentifier,
            ResourceIdentifier::ValidationResult(_) => IdentifierKind::ValidationResultIdentifier,
        }
    }

    /// Returns the parts in declared order, without the type tag
    pub fn to_tuple(&self) -> Vec<String> {
        match self {
            ResourceIdentifier::DataAsset(id) => id.to_tuple(),
            ResourceIdentifier::ExpectationSuite(id) => id.to_tuple(),
            ResourceIdentifier::ValidationResult(id) => id.to_tuple(),
        }
    }

    /// Rebuilds an identifier of the given kind from its tuple form
    pub fn from_tuple(kind: IdentifierKind, parts: &[String]) -> Result<Self, IdError> {
        Ok(match kind {
            IdentifierKind::DataAssetIdentifier => {
                DataAssetIdentifier::from_tuple(parts)?.into()
            }
            IdentifierKind::ExpectationSuiteIdentifier => {
                ExpectationSuiteIdentifier::from_tuple(parts)?.into()
            }
            IdentifierKind::ValidationResultIdentifier => {
                ValidationResultIdentifier::from_tuple(parts)?.into()
            }
        })
    }
}

impl From<DataAssetIdentifier> for ResourceIdentifier {
    fn from(id: DataAssetIdentifier) -> Self {
        ResourceIdentifier::DataAsset(id)
    }
}

impl From<ExpectationSuiteIdentifier> for ResourceIdentifier {
    fn from(id: ExpectationSuiteIdentifier) -> Self {
        ResourceIdentifier::ExpectationSuite(id)
    }
}

impl From<ValidationResultIdentifier> for ResourceIdentifier {
    fn from(id: ValidationResultIdentifier) -> Self {
        ResourceIdentifier::ValidationResult(id)
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceIdentifier::DataAsset(id) => fmt::Display::fmt(id, f),
            ResourceIdentifier::ExpectationSuite(id) => fmt::Display::fmt(id, f),
            ResourceIdentifier::ValidationResult(id) => fmt::Display::fmt(id, f),
        }
    }
}

impl FromStr for ResourceIdentifier {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.split(DELIMITER).next().unwrap_or_default();
        let kind =
            IdentifierKind::from_type_name(tag).ok_or_else(|| IdError::UnknownType(s.to_string()))?;
        let parts = split_canonical(s, kind.type_name())?;
        Self::from_tuple(kind, &parts)
    }
}

impl TryFrom<String> for ResourceIdentifier {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResourceIdentifier> for String {
    fn from(id: ResourceIdentifier) -> Self {
        id.to_string()
    }
}
