//! chunksplit - Move modules between output chunks by cache-group rules
//!
//! Runs once per build after chunk optimization: modules matched by a cache
//! group are pulled into the chunks of the modules depending on them (or into
//! the chunks the group names), and chunks left without modules are removed.

use anyhow::Result;
use chunksplit_lib::Cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging/tracing system
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("chunksplit=debug,chunksplit_lib=debug"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("chunksplit=info,chunksplit_lib=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    cli.execute().await
}
