//! Explain command implementation

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tracing::info;

use crate::config::Config;
use crate::split::SplitModuleChunks;

/// Show the matched cache group and planned chunks of every module
#[derive(Args, Debug)]
pub struct ExplainCommand {
    /// Build graph snapshot (JSON)
    pub graph: PathBuf,

    /// Hide modules that match no cache group
    #[arg(long)]
    pub matched_only: bool,
}

impl ExplainCommand {
    pub async fn execute(&self, config_path: &str) -> Result<()> {
        info!("Loading configuration from {}", config_path);
        let config = Config::load(config_path)?;
        let compilation = super::load_compilation(&self.graph).await?;

        let splitter = SplitModuleChunks::new(config.cache_groups());

        for explanation in splitter.explain(&compilation) {
            let current: Vec<String> = compilation
                .module(explanation.module)
                .map(|m| m.chunks().iter().map(|&c| compilation.chunk_label(c)).collect())
                .unwrap_or_default();

            match &explanation.cache_group {
                None if self.matched_only => {}
                None => eprintln!(
                    "  {} {} [{}] {}",
                    "•".dimmed(),
                    explanation.identifier,
                    current.join(", "),
                    "no cache group".dimmed()
                ),
                Some(group) if explanation.targets.is_empty() => eprintln!(
                    "  {} {} [{}] {} {}",
                    "•".dimmed(),
                    explanation.identifier.cyan(),
                    current.join(", "),
                    group.green(),
                    "stays".dimmed()
                ),
                Some(group) => eprintln!(
                    "  {} {} [{}] {} {} [{}]",
                    "•".dimmed(),
                    explanation.identifier.cyan(),
                    current.join(", "),
                    group.green(),
                    "→".dimmed(),
                    explanation.targets.join(", ")
                ),
            }
        }

        eprintln!();
        Ok(())
    }
}
