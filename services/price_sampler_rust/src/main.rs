use anyhow::Result;
use dotenv::dotenv;
use market_sampler_core::TornClient;
use price_sampler_rust::catalog::load_catalog;
use price_sampler_rust::{PriceSampler, SamplerConfig};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        error!("Price sampling failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    info!("Starting price_sampler...");

    let config = SamplerConfig::from_env()?;
    let catalog = load_catalog(config.catalog_path.as_deref())?;
    let client = TornClient::new(config.client_config())?;

    let sampler = PriceSampler::new(config, catalog, Arc::new(client));
    sampler.run().await?;

    info!("Price sampling complete");
    Ok(())
}
