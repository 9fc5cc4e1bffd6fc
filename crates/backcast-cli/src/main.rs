//! Command-line front end.

mod manifest;

use crate::manifest::ManifestError;
use backcast::{load_tree, regenerate};
use clap::{Parser, Subcommand};
use std::{fs, path::PathBuf, process::ExitCode};
use thiserror::Error as ThisError;
use tracing::info;
use tracing_subscriber::EnvFilter;

///
/// Cli
///

#[derive(Debug, Parser)]
#[command(name = "backcast", version, about = "regenerate historical versions of model trees")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Regenerate one tree per manifest version, plus union artifacts.
    Regenerate {
        /// Root directory of the current model definitions.
        #[arg(long)]
        root: PathBuf,

        /// Output directory for the generated trees.
        #[arg(long)]
        out: PathBuf,

        /// Path to the JSON version manifest.
        #[arg(long)]
        versions: PathBuf,
    },

    /// Print the extracted registry of a definition tree as JSON.
    DumpSchema {
        /// Root directory of the current model definitions.
        #[arg(long)]
        root: PathBuf,
    },
}

///
/// CliError
///

#[derive(Debug, ThisError)]
#[remain::sorted]
enum CliError {
    #[error(transparent)]
    Backcast(#[from] backcast::Error),

    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot serialize registry: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Regenerate {
            root,
            out,
            versions,
        } => {
            let text = fs::read_to_string(&versions).map_err(|source| CliError::Io {
                path: versions,
                source,
            })?;
            let bundle = manifest::parse_manifest(&text)?;

            info!(versions = bundle.len(), "regenerating");
            regenerate(&root, &out, &bundle)?;
        }
        Command::DumpSchema { root } => {
            let tree = load_tree(&root)?;
            println!("{}", serde_json::to_string_pretty(&tree.registry)?);
        }
    }

    Ok(())
}
