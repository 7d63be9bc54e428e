//! CLI for SRI.

mod commands;
mod host;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sri_core::config;
use sri_core::digest::Algorithm;
use std::path::PathBuf;

use commands::{run_config, run_hash, run_serve};

/// Top-level CLI for SRI.
#[derive(Debug, Parser)]
#[command(name = "sri")]
#[command(about = "SRI: subresource integrity values for source files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Print the integrity value of any file (no .css/.js filter).
    Hash {
        /// Path to the file.
        path: PathBuf,
        /// Digest algorithm; defaults to the configured one.
        #[arg(long, short)]
        algorithm: Option<Algorithm>,
    },

    /// Run the editor host shim: events on stdin, indicator/clipboard updates on stdout.
    Serve {
        /// Hash inside this process instead of spawning sri-gen per request.
        #[arg(long)]
        in_process: bool,
        /// Path to the sri-gen executable (default: next to this binary).
        #[arg(long, value_name = "PATH", conflicts_with = "in_process")]
        sri_gen: Option<PathBuf>,
    },

    /// Show the config file location and effective settings.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Hash { path, algorithm } => {
                run_hash(&path, algorithm.unwrap_or(cfg.algorithm)).await?
            }
            CliCommand::Serve {
                in_process,
                sri_gen,
            } => run_serve(cfg, in_process, sri_gen).await?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
