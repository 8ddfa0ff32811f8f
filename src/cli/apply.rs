//! Apply command implementation

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::info;

use crate::bundler::Compilation;
use crate::config::Config;
use crate::plugins::PluginManager;
use crate::split::{PlannedMove, SplitModuleChunks};
use crate::utils::format_duration;

/// Split modules of a build graph into their dependents' chunks
#[derive(Args, Debug)]
pub struct ApplyCommand {
    /// Build graph snapshot (JSON)
    pub graph: PathBuf,

    /// Write the rewritten graph here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Only print the planned moves
    #[arg(long)]
    pub dry_run: bool,
}

impl ApplyCommand {
    pub async fn execute(&self, config_path: &str) -> Result<()> {
        let start = Instant::now();

        info!("Loading configuration from {}", config_path);
        let config = Config::load(config_path)?;
        let compilation = super::load_compilation(&self.graph).await?;

        let splitter = SplitModuleChunks::new(config.cache_groups());
        eprintln!(
            "{} Applying {} cache group(s) to {} module(s) in {} chunk(s)...",
            "→".blue(),
            splitter.cache_groups().len(),
            compilation.len(),
            compilation.chunk_count()
        );

        if self.dry_run {
            let plan = splitter.plan(&compilation);
            if compilation.chunk_count() < 2 {
                eprintln!(
                    "  {} fewer than 2 chunks, the pass would not run",
                    "!".yellow()
                );
            }
            print_moves(&compilation, plan.moves());
            eprintln!(
                "\n{} Planned {} move(s), graph left untouched\n",
                "✓".green().bold(),
                plan.len()
            );
            return Ok(());
        }

        let mut plugins = PluginManager::new();
        plugins.register(Arc::new(splitter.clone()));

        let mut session = plugins.compilation(compilation);
        session.unseal();
        session.after_optimize_chunks()?;
        let compilation = session.into_compilation();

        let report = splitter.take_report();
        if report.is_none() {
            eprintln!("  {} fewer than 2 chunks, nothing to split", "•".dimmed());
        }
        let report = report.unwrap_or_default();
        let moves: Vec<PlannedMove> = report.moves;
        let removed: Vec<String> = report
            .removed_chunks
            .iter()
            .map(|&chunk| compilation.chunk_label(chunk))
            .collect();
        print_moves(&compilation, &moves);
        for name in &removed {
            eprintln!("  {} removed empty chunk {}", "✗".red(), name.yellow());
        }

        let output = serde_json::to_string_pretty(&compilation.to_snapshot())?;
        match &self.out {
            Some(path) => {
                tokio::fs::write(path, output)
                    .await
                    .with_context(|| format!("Failed to write build graph: {}", path.display()))?;
                eprintln!("  {} Wrote {}", "•".dimmed(), path.display().to_string().cyan());
            }
            None => println!("{}", output),
        }

        eprintln!(
            "\n{} Moved {} module(s), removed {} chunk(s) in {}\n",
            "✓".green().bold(),
            moves.len(),
            removed.len(),
            format_duration(start.elapsed())
        );

        Ok(())
    }
}

fn print_moves(compilation: &Compilation, moves: &[PlannedMove]) {
    for planned in moves {
        let identifier = compilation
            .module(planned.module)
            .map(|m| m.identifier.clone())
            .unwrap_or_default();
        let targets: Vec<String> = planned
            .targets
            .iter()
            .map(|&chunk| compilation.chunk_label(chunk))
            .collect();

        eprintln!(
            "  {} {} {} [{}] {}",
            "•".dimmed(),
            identifier.cyan(),
            "→".dimmed(),
            targets.join(", "),
            format!("({})", planned.cache_group).dimmed()
        );
    }
}
