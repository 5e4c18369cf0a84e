//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::store_cmd;
use crate::storage::Project;

#[derive(Parser)]
#[command(name = "stratum")]
#[command(author, version, about = "Namespaced key-value stores for validation artifacts")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new stratum project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// List the configured stores
    Stores,

    /// Write a value under an identifier
    Set {
        /// Store name from config.toml
        store: String,

        /// Canonical identifier, e.g. ExpectationSuiteIdentifier.db.default.orders.warning
        identifier: String,

        /// Value text (interpreted by the store's serializer)
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        value: Option<String>,

        /// Read the value from a file instead
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Print the value stored under an identifier
    Get {
        /// Store name from config.toml
        store: String,

        /// Canonical identifier
        identifier: String,
    },

    /// List every identifier in a store
    Keys {
        /// Store name from config.toml
        store: String,
    },

    /// Write a file into the data docs directory
    Publish {
        /// Path relative to the data docs directory, e.g. validations/index.html
        path: String,

        /// File content
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        content: Option<String>,

        /// Read the content from a file instead
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

/// Installs the stderr log subscriber; `RUST_LOG` overrides the default level
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let output = Output::new(cli.format, cli.verbose);

    output.verbose("stratum starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!("Created stratum directory at: {}", project.project_dir().display()),
            );
            output.success(&format!("Initialized stratum project at {}", project.root().display()));
        }

        Commands::Stores => store_cmd::list_stores(&output)?,

        Commands::Set { store, identifier, value, file } => {
            let input = store_cmd::Input::from_args(value, file)?;
            store_cmd::set(&output, &store, &identifier, input)?
        }

        Commands::Get { store, identifier } => store_cmd::get(&output, &store, &identifier)?,

        Commands::Keys { store } => store_cmd::keys(&output, &store)?,

        Commands::Publish { path, content, file } => {
            let input = store_cmd::Input::from_args(content, file)?;
            store_cmd::publish(&output, &path, input)?
        }
    }

    output.verbose("Command completed successfully");
    Ok(())
}
