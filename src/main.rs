use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use esports_collector::collector::{sample_dataset, Collector};
use esports_collector::config::{Command, Config};
use esports_collector::storage::Tier;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let collector =
        Collector::new(config.collector_config()).context("Failed to initialise collector")?;

    match config.command {
        Command::Fetch {
            provider,
            output,
            tier,
            pretty,
            match_ids,
        } => {
            info!("Fetching {} match(es) from {}", match_ids.len(), provider);
            let result = collector.fetch_batch(match_ids, provider).await;
            for id in result.abandoned() {
                info!("Skipped match {}", id);
            }
            collector
                .persist(&result.records, &output, tier, pretty)
                .with_context(|| format!("Failed to save {}", output))?;
        }
        Command::Sample { output, pretty } => {
            let sample = sample_dataset();
            collector
                .persist(&sample, &output, Tier::Raw, pretty)
                .with_context(|| format!("Failed to save {}", output))?;
        }
    }

    Ok(())
}
