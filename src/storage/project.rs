//! Project management
//!
//! Handles project scaffolding and builds the stores a project configures.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::{Config, DEFAULT_CONFIG, PROJECT_DIR};
use super::{FileSystemWriteOnlyStore, NamespacedReadWriteStore};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a stratum project. Run 'stratum init' first.")]
    NotInProject,

    #[error("Failed to create project: {0}")]
    CreateFailed(String),
}

/// Directories created under the project directory
const SKELETON: &[&str] = &[
    "notebooks",
    "expectations",
    "datasources",
    "uncommitted",
    "uncommitted/validations",
    "uncommitted/credentials",
    "uncommitted/samples",
    "plugins",
    "fixtures",
];

/// Notebook templates copied into `notebooks/` on init
const NOTEBOOK_TEMPLATES: &[(&str, &str)] = &[
    (
        "create_expectations.ipynb",
        r##"{
 "cells": [
  {
   "cell_type": "markdown",
   "metadata": {},
   "source": [
    "# Create expectations\n",
    "\n",
    "Load a sample of your data, describe what it should look like, and save the suite to `expectations/`."
   ]
  }
 ],
 "metadata": {},
 "nbformat": 4,
 "nbformat_minor": 2
}
"##,
    ),
    (
        "integrate_validation_into_pipeline.ipynb",
        r##"{
 "cells": [
  {
   "cell_type": "markdown",
   "metadata": {},
   "source": [
    "# Validate in a pipeline\n",
    "\n",
    "Run a saved suite against each new batch and store results under `uncommitted/validations/`."
   ]
  }
 ],
 "metadata": {},
 "nbformat": 4,
 "nbformat_minor": 2
}
"##,
    ),
];

/// A stratum project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let project_dir = root.join(PROJECT_DIR);

        if !project_dir.is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    ///
    /// Safe to run on an existing project: directories are kept, notebook
    /// templates are refreshed, and an existing config is left untouched.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let project_dir = root.join(PROJECT_DIR);

        Self::scaffold(&project_dir)?;

        let config_path = Config::config_path(&root);
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        tracing::debug!(path = %project_dir.display(), "initialized project");
        Self::open(root)
    }

    /// Creates the directory skeleton and copies notebook templates
    fn scaffold(project_dir: &Path) -> Result<()> {
        fs::create_dir_all(project_dir).map_err(|e| {
            ProjectError::CreateFailed(format!("{}: {}", project_dir.display(), e))
        })?;

        for dir in SKELETON {
            let path = project_dir.join(dir);
            fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }

        let gitignore_path = project_dir.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(&gitignore_path, "uncommitted/")
                .with_context(|| format!("Failed to write .gitignore: {}", gitignore_path.display()))?;
        }

        let notebooks_dir = project_dir.join("notebooks");
        for (name, content) in NOTEBOOK_TEMPLATES {
            let path = notebooks_dir.join(name);
            fs::write(&path, content)
                .with_context(|| format!("Failed to copy notebook: {}", path.display()))?;
        }

        Ok(())
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the `stratum/` directory path; store paths are relative to it
    pub fn project_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Names of the configured stores, sorted
    pub fn store_names(&self) -> Vec<&str> {
        self.config.project.stores.keys().map(String::as_str).collect()
    }

    /// Builds the named store
    pub fn store(&self, name: &str) -> Result<NamespacedReadWriteStore> {
        let store_config = self.config.project.store(name)?;
        let project_dir = self.project_dir();
        NamespacedReadWriteStore::new(store_config, Some(project_dir.as_path()))
            .with_context(|| format!("Failed to open store '{}'", name))
    }

    /// Builds the write-only documentation store
    pub fn docs_store(&self) -> Result<FileSystemWriteOnlyStore> {
        let docs_config = self.config.project.data_docs()?;
        let project_dir = self.project_dir();
        FileSystemWriteOnlyStore::new(docs_config, Some(project_dir.as_path()))
            .context("Failed to open data docs store")
    }
}
