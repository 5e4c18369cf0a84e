//! Configuration handling for stratum
//!
//! Configuration lives in `stratum/config.toml` at the project root and
//! declares the project's stores:
//!
//! ```toml
//! [stores.validations_store]
//! resource_identifier_class_name = "ValidationResultIdentifier"
//! serialization_type = "json"
//!
//! [stores.validations_store.store_backend]
//! class_name = "FilesystemStoreBackend"
//! base_directory = "uncommitted/validations/"
//! file_extension = "json"
//! filepath_template = "{4}/{0}/{1}/{2}/{3}.{file_extension}"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::namespaced::NamespacedReadWriteStoreConfig;
use super::write_only::WriteOnlyStoreConfig;

/// Name of the project directory under the project root
pub const PROJECT_DIR: &str = "stratum";

/// Name of the configuration file inside the project directory
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("No store named '{0}' is configured")]
    UnknownStore(String),

    #[error("No data_docs section is configured")]
    NoDataDocs,
}

/// Configuration written by `stratum init`
pub const DEFAULT_CONFIG: &str = r#"# stratum project configuration

# Expectation suites, one JSON document per suite
[stores.expectations_store]
resource_identifier_class_name = "ExpectationSuiteIdentifier"
serialization_type = "json"

[stores.expectations_store.store_backend]
class_name = "FilesystemStoreBackend"
base_directory = "expectations/"
file_extension = "json"
filepath_template = "{0}/{1}/{2}/{3}.{file_extension}"
replaced_substring = "/"
replacement_string = "__"

# Validation results, grouped by run id
[stores.validations_store]
resource_identifier_class_name = "ValidationResultIdentifier"
serialization_type = "json"

[stores.validations_store.store_backend]
class_name = "FilesystemStoreBackend"
base_directory = "uncommitted/validations/"
file_extension = "json"
filepath_template = "{4}/{0}/{1}/{2}/{3}.{file_extension}"
replaced_substring = "/"
replacement_string = "__"

# Rows that failed validation, exported as CSV (write-only)
[stores.quarantine_store]
resource_identifier_class_name = "ValidationResultIdentifier"
serialization_type = "csv"

[stores.quarantine_store.store_backend]
class_name = "FilesystemStoreBackend"
base_directory = "uncommitted/samples/"
file_extension = "csv"
filepath_template = "{4}/{0}/{1}/{2}/quarantined-rows-{2}-{3}.{file_extension}"
replaced_substring = "/"
replacement_string = "__"

# Rendered documentation
[data_docs]
base_directory = "uncommitted/documentation/"
"#;

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectConfig {
    /// Named namespaced stores
    pub stores: BTreeMap<String, NamespacedReadWriteStoreConfig>,

    /// Write-only store for rendered documentation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_docs: Option<WriteOnlyStoreConfig>,
}

impl ProjectConfig {
    pub fn store(&self, name: &str) -> Result<&NamespacedReadWriteStoreConfig, ConfigError> {
        self.stores
            .get(name)
            .ok_or_else(|| ConfigError::UnknownStore(name.to_string()))
    }

    pub fn data_docs(&self) -> Result<&WriteOnlyStoreConfig, ConfigError> {
        self.data_docs.as_ref().ok_or(ConfigError::NoDataDocs)
    }
}

/// Loaded configuration plus where it came from
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let project = Self::load_project_config(project_root)?;

        Ok(Self {
            project,
            project_root: Some(project_root.to_path_buf()),
        })
    }

    /// Path of the configuration file for a project root
    pub fn config_path(project_root: &Path) -> PathBuf {
        project_root.join(PROJECT_DIR).join(CONFIG_FILE)
    }

    /// Loads project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = Self::config_path(project_root);

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        Self::parse(&content).context("Failed to parse project config")
    }

    /// Parses configuration text
    pub fn parse(content: &str) -> Result<ProjectConfig, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Finds the project root by looking for a `stratum/` directory upwards
    pub fn find_project_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_project_root_from(&current)
    }

    /// Same as [`Config::find_project_root`], starting from `start`
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(PROJECT_DIR).join(CONFIG_FILE).is_file() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }
}
