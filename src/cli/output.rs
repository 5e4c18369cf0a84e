//! Output formatting for CLI commands

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::Value;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "message": message
                    })
                );
            }
        }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) {
        let rendered = match self.format {
            OutputFormat::Text => serde_json::to_string_pretty(data),
            OutputFormat::Json => serde_json::to_string(data),
        };
        if let Ok(json) = rendered {
            println!("{}", json);
        }
    }

    /// Prints identifiers one per line, or as a JSON array
    pub fn list(&self, items: &[String], empty_message: &str) {
        match self.format {
            OutputFormat::Json => self.data(&items),
            OutputFormat::Text if items.is_empty() => println!("{}", empty_message),
            OutputFormat::Text => {
                for item in items {
                    println!("{}", item);
                }
            }
        }
    }

    /// Prints a value read from a store
    ///
    /// Text mode writes the value as stored: text and bytes verbatim, JSON
    /// pretty-printed. JSON mode wraps it as `{"identifier", "value"}`.
    pub fn value(&self, identifier: &str, value: &Value) -> Result<()> {
        if self.is_json() {
            let rendered = match value {
                Value::Text(text) => serde_json::Value::String(text.clone()),
                Value::Json(doc) => doc.clone(),
                Value::Bytes(bytes) => serde_json::json!(bytes),
                Value::Table(_) => anyhow::bail!("Tables cannot be read back"),
            };
            self.data(&serde_json::json!({
                "identifier": identifier,
                "value": rendered,
            }));
            return Ok(());
        }

        match value {
            Value::Text(text) if text.ends_with('\n') => print!("{}", text),
            Value::Text(text) => println!("{}", text),
            Value::Json(doc) => println!("{}", serde_json::to_string_pretty(doc)?),
            Value::Bytes(bytes) => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(bytes).context("Failed to write to stdout")?;
                stdout.flush().context("Failed to write to stdout")?;
            }
            Value::Table(_) => anyhow::bail!("Tables cannot be read back"),
        }
        Ok(())
    }

    /// Prints a table row (text only, ignored in JSON mode)
    pub fn row(&self, columns: &[&str]) {
        if self.format == OutputFormat::Text {
            println!("{}", columns.join("\t"));
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Prints a verbose debug message (only when --verbose is set)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// Prints a verbose debug message with context (only when --verbose is set)
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}
