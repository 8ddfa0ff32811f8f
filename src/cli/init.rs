//! Configuration scaffolding command

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

/// Write a starter chunksplit.toml
#[derive(Args, Debug)]
pub struct InitCommand {
    /// Project name written into the config
    #[arg(long, default_value = "my-app")]
    pub name: String,

    /// Overwrite an existing config file
    #[arg(short, long)]
    pub force: bool,
}

impl InitCommand {
    pub async fn execute(&self, config_path: &str) -> Result<()> {
        let path = Path::new(config_path);

        if path.exists() && !self.force {
            anyhow::bail!(
                "{} already exists, pass --force to overwrite it",
                path.display()
            );
        }

        tokio::fs::write(path, self.generate_config())
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        eprintln!("  {} Created {}", "✓".green(), path.display().to_string().cyan());
        eprintln!("\n  Next steps:");
        eprintln!("    {} chunksplit explain graph.json", "→".dimmed());
        eprintln!("    {} chunksplit apply graph.json --out split.json", "→".dimmed());
        eprintln!();

        Ok(())
    }

    fn generate_config(&self) -> String {
        format!(
            r#"# chunksplit configuration
#
# Cache groups are tried in the order they are declared; the first one whose
# `test` matches a module decides where it goes.
#
#   test   = true | false                 match everything / nothing
#   test   = "src/shared/"                prefix of the module or chunk name
#   test   = {{ regex = "node_modules" }}   pattern in the module or chunk name
#   chunks = "vendor" | ["a", "b"]        pin matched modules to these chunks;
#                                         without it modules follow their dependents

[project]
name = "{name}"
version = "0.1.0"

[cache_groups.vendor]
test = {{ regex = "node_modules" }}
chunks = "vendor"

[cache_groups.shared]
test = "src/shared/"
"#,
            name = self.name,
        )
    }
}
