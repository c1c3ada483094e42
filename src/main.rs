//! blobstage - Azure Blob Storage staging for data-movement benchmarks
//!
//! One subcommand per invocation; each provisions or tears down a
//! benchmark location and writes its manifest.

use blobstage::cli::Cli;
use blobstage::config;
use blobstage::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Error: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = config::load_config().await?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    init_logging(config.debug);
    info!("Starting blobstage");

    cli.execute(config).await
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "blobstage=debug" } else { "blobstage=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
