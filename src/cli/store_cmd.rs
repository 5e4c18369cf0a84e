//! Store CLI commands

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use super::output::Output;
use crate::domain::{ResourceIdentifier, Value};
use crate::storage::{Project, Serializer, StoreBackendConfig};

/// A value given on the command line or read from a file
pub enum Input {
    Text(String),
    File(Vec<u8>),
}

impl Input {
    pub fn from_args(text: Option<String>, file: Option<PathBuf>) -> Result<Self> {
        match (text, file) {
            (_, Some(path)) => {
                let bytes = fs::read(&path)
                    .with_context(|| format!("Failed to read input file: {}", path.display()))?;
                Ok(Input::File(bytes))
            }
            (Some(text), None) => Ok(Input::Text(text)),
            (None, None) => anyhow::bail!("Provide a value or --file"),
        }
    }

    fn into_bytes(self) -> Vec<u8> {
        match self {
            Input::Text(text) => text.into_bytes(),
            Input::File(bytes) => bytes,
        }
    }

    /// Interprets the input the way the store's serializer expects it
    fn into_value(self, serializer: Serializer) -> Result<Value> {
        match serializer {
            Serializer::Json => {
                let doc: serde_json::Value =
                    serde_json::from_slice(&self.into_bytes()).context("Value is not valid JSON")?;
                Ok(Value::Json(doc))
            }
            Serializer::Raw | Serializer::Csv => Ok(match self {
                Input::Text(text) => Value::Text(text),
                Input::File(bytes) => Value::Bytes(bytes),
            }),
        }
    }
}

fn parse_identifier(identifier: &str) -> Result<ResourceIdentifier> {
    identifier
        .parse()
        .with_context(|| format!("Invalid identifier: {}", identifier))
}

fn backend_class(config: &StoreBackendConfig) -> &'static str {
    match config {
        StoreBackendConfig::InMemory { .. } => "InMemoryStoreBackend",
        StoreBackendConfig::Filesystem(_) => "FilesystemStoreBackend",
    }
}

pub fn list_stores(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let stores = &project.config().project.stores;
    output.verbose_ctx("stores", &format!("Found {} configured stores", stores.len()));

    if output.is_json() {
        let items: Vec<_> = stores
            .iter()
            .map(|(name, config)| {
                serde_json::json!({
                    "name": name,
                    "identifier_type": config.resource_identifier_class_name.type_name(),
                    "serializer": Serializer::from(config.serialization_type).name(),
                    "backend": backend_class(&config.store_backend),
                })
            })
            .collect();
        output.data(&items);
    } else if stores.is_empty() {
        println!("No stores configured");
    } else {
        for (name, config) in stores {
            output.row(&[
                name.as_str(),
                config.resource_identifier_class_name.type_name(),
                Serializer::from(config.serialization_type).name(),
                backend_class(&config.store_backend),
            ]);
        }
    }

    Ok(())
}

pub fn set(output: &Output, store_name: &str, identifier: &str, input: Input) -> Result<()> {
    let project = Project::open_current()?;
    let mut store = project.store(store_name)?;
    let key = parse_identifier(identifier)?;

    let value = input.into_value(store.serializer())?;
    output.verbose_ctx(
        "set",
        &format!("Writing {} value through {} serializer", value.type_name(), store.serializer().name()),
    );

    store
        .set(&key, &value)
        .with_context(|| format!("Failed to write '{}' to store '{}'", key, store_name))?;

    output.success(&format!("Stored {} in {}", key, store_name));
    Ok(())
}

pub fn get(output: &Output, store_name: &str, identifier: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.store(store_name)?;
    let key = parse_identifier(identifier)?;

    let value = store
        .get(&key)
        .with_context(|| format!("Failed to read '{}' from store '{}'", key, store_name))?;

    output.value(&key.to_string(), &value)?;
    Ok(())
}

pub fn keys(output: &Output, store_name: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.store(store_name)?;

    let mut keys: Vec<String> = store
        .list_keys()
        .with_context(|| format!("Failed to list store '{}'", store_name))?
        .iter()
        .map(ToString::to_string)
        .collect();
    keys.sort();
    output.verbose_ctx("keys", &format!("Found {} keys", keys.len()));

    output.list(&keys, &format!("No keys in {}", store_name));

    Ok(())
}

pub fn publish(output: &Output, path: &str, input: Input) -> Result<()> {
    let project = Project::open_current()?;
    let docs = project.docs_store()?;

    let written = docs
        .set(path, input.into_bytes())
        .with_context(|| format!("Failed to publish '{}'", path))?;
    output.verbose_ctx("publish", &format!("Wrote {}", written.display()));

    output.success(&format!("Published {}", path));
    Ok(())
}
