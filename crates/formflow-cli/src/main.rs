//! formflow CLI tool.
//!
//! Usage:
//! ```bash
//! formflow check <FILE>
//! formflow run <FILE> [--set ID=VALUE]... [--validate | --submit]
//! formflow init
//! formflow operators
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Drive data-driven forms with conditional fields from the command line
#[derive(Parser)]
#[command(name = "formflow")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to engine configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a form document loads
    Check {
        /// Form document (JSON)
        file: PathBuf,
    },

    /// Load a form, apply edits and print the resulting state
    Run {
        /// Form document (JSON)
        file: PathBuf,

        /// Set a field value, applied in order (value is JSON, or plain text)
        #[arg(short, long = "set", value_name = "ID=VALUE")]
        set: Vec<String>,

        /// Validate the visible fields after applying edits
        #[arg(long)]
        validate: bool,

        /// Submit the form after applying edits
        #[arg(long, conflicts_with = "validate")]
        submit: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize engine configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// List supported operators and field types
    Operators,
}

/// Output format for form state.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-field compact format.
    Compact,
}

/// What `run` does after applying edits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Finish {
    /// Print the state as edited.
    #[default]
    None,
    /// Validate, then print.
    Validate,
    /// Submit, then print.
    Submit,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check { file } => commands::check::run(&file),
        Commands::Run {
            file,
            set,
            validate,
            submit,
            format,
        } => {
            let source = config_resolver::resolve(Path::new("."), cli.config.as_deref());
            let finish = if submit {
                Finish::Submit
            } else if validate {
                Finish::Validate
            } else {
                Finish::None
            };
            commands::run::run(&file, &set, finish, format, &source)
        }
        Commands::Init { force } => commands::init::run(force),
        Commands::Operators => {
            commands::operators::run();
            Ok(())
        }
    }
}
