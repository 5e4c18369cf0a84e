//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project management | `init`, `stores` |
//! | Store | Namespaced reads and writes | `set`, `get`, `keys` |
//! | Docs | Write-only documentation output | `publish` |
//!
//! Identifiers are given in canonical form, e.g.
//! `ExpectationSuiteIdentifier.my_db.default.orders.warning`.
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output; it also lowers the log level
//! to `debug` unless `RUST_LOG` says otherwise:
//! ```bash
//! stratum --verbose keys validations_store
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod store_cmd;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
