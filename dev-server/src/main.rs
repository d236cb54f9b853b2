//! Development product source for manual testing of the loader
//!
//! Serves the sample catalog on a fixed local port so `fetch-products` can be
//! pointed at something predictable. Set DEV_SERVER_PORT to change the port
//! (defaults to 8000) and DEV_SERVER_DELAY_MS to slow every response down,
//! which makes the loading state and overlapping refreshes visible.
//!
//! Usage: cargo run -p dev-server

use anyhow::{Context, Result};
use std::time::Duration;
use test_helpers::{MockResponse, mock};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize logging
    let subscriber = loader::telemetry::get_subscriber("info".into());
    loader::telemetry::init_subscriber(subscriber)?;

    let port: u16 = env_number("DEV_SERVER_PORT")?.unwrap_or(8000);
    let delay: u64 = env_number("DEV_SERVER_DELAY_MS")?.unwrap_or(0);

    let source = test_helpers::spawn_source_on_port(port).await;
    source.script.set_default(
        MockResponse::raw(mock::full_catalog_body())
            .delayed(Duration::from_millis(delay)),
    );

    info!("🚀 Mock product source running on {}", source.address());
    info!("   Products: {}", source.client.products_url());
    info!(
        "   Loader:   SOURCE_ADDRESS={} cargo run --bin fetch-products",
        source.address()
    );
    mock::print_summary();
    info!("👋 Press Ctrl+C to shutdown");

    tokio::signal::ctrl_c().await?;
    info!(
        "🛑 Shutting down after {} requests",
        source.script.hits().len()
    );
    Ok(())
}

fn env_number<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{key} must be a number, got {value:?}")),
        Err(_) => Ok(None),
    }
}
