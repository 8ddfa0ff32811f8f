//! Command-line interface for chunksplit
//!
//! Provides the main CLI structure using clap with subcommands for:
//! - `apply`: Run the split pass over a build graph
//! - `explain`: Show which cache group each module matches
//! - `init`: Write a starter configuration

mod apply;
mod explain;
mod init;

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::debug;

use crate::bundler::{Compilation, GraphSnapshot};
use crate::config::CONFIG_FILE;

pub use apply::ApplyCommand;
pub use explain::ExplainCommand;
pub use init::InitCommand;

/// chunksplit - Move modules between output chunks by cache-group rules
#[derive(Parser, Debug)]
#[command(name = "chunksplit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to chunksplit.toml config file
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split modules of a build graph into their dependents' chunks
    Apply(ApplyCommand),

    /// Show the matched cache group and planned chunks of every module
    Explain(ExplainCommand),

    /// Write a starter chunksplit.toml
    Init(InitCommand),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        print_banner();

        match &self.command {
            Commands::Apply(cmd) => cmd.execute(&self.config).await,
            Commands::Explain(cmd) => cmd.execute(&self.config).await,
            Commands::Init(cmd) => cmd.execute(&self.config).await,
        }
    }
}

/// Read a graph snapshot (JSON) and build the compilation
pub(crate) async fn load_compilation(path: &Path) -> Result<Compilation> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read build graph: {}", path.display()))?;

    let snapshot: GraphSnapshot = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse build graph: {}", path.display()))?;

    debug!(
        "Loaded {} module(s) and {} chunk(s) from {}",
        snapshot.modules.len(),
        snapshot.chunks.len(),
        path.display()
    );

    Compilation::from_snapshot(&snapshot)
        .with_context(|| format!("Invalid build graph: {}", path.display()))
}

/// Print the chunksplit banner
fn print_banner() {
    eprintln!(
        "\n{} {} {}\n",
        "⚡".cyan(),
        "chunksplit".bold().cyan(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
