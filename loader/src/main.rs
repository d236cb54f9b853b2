use anyhow::Context;
use loader::{
    Config, LoadState, ResourceLoader, Snapshot,
    telemetry::{get_subscriber, init_subscriber, log_error},
};
use payloads::APIClient;
use tracing::info;

/// Console consumer for the product loader.
///
/// Fetches the product collection once, printing each state the loader
/// publishes, and exits with an error if the fetch fails. With
/// REFRESH_INTERVAL_SECS set it keeps re-fetching until Ctrl+C.
///
/// Environment variables can be set directly or loaded from a .env file in
/// the project root. All are optional:
/// - SOURCE_ADDRESS: base address of the product source (defaults to
///   https://dummyjson.com)
/// - REQUEST_TIMEOUT_MS: give up on a request after this many milliseconds
/// - REFRESH_INTERVAL_SECS: re-fetch on this interval
/// - FALLBACK_FILE: JSON product page shown when the source is unreachable
///
/// Example development command, against `cargo run -p dev-server`:
/// SOURCE_ADDRESS=http://127.0.0.1:8000 cargo run --bin fetch-products
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if available
    let _ = dotenvy::dotenv();

    let subscriber = get_subscriber("info".into());
    init_subscriber(subscriber)?;

    let config = Config::from_env()?;
    let options = config.loader_options()?;
    let client = APIClient::new(&config.source_address);
    info!("Fetching data from {}", client.products_url());

    let loader = ResourceLoader::new(client, options);
    let mut watcher = loader.subscribe();
    loader.trigger();

    let Some(period) = config.refresh_interval else {
        let snapshot = watcher
            .settled()
            .await
            .context("loader stopped before settling")?;
        render(&snapshot)?;
        if let LoadState::Failed(e) = snapshot.state {
            anyhow::bail!(e);
        }
        return Ok(());
    };

    render(&watcher.current())?;
    let refresher = loader.refresh_every(period);
    loop {
        tokio::select! {
            Some(snapshot) = watcher.changed() => render(&snapshot)?,
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    refresher.abort();
    info!("Stopped refreshing");
    Ok(())
}

/// Print the items of a successful fetch to stdout; everything else goes to
/// the log.
fn render(snapshot: &Snapshot) -> anyhow::Result<()> {
    let request = snapshot.request;
    match &snapshot.state {
        LoadState::Idle => info!("Waiting to fetch"),
        LoadState::Loading => info!(%request, "Fetching data..."),
        LoadState::Empty => info!(%request, "No data found"),
        LoadState::Failed(e) => log_error(e.clone()),
        LoadState::Success(loaded) => {
            if let Some(cause) = &loaded.degraded {
                tracing::warn!(
                    %request,
                    "Showing substitute data, source unavailable: {cause}"
                );
            }
            info!(
                %request,
                "Data fetched successfully: {} of {} items",
                loaded.items.len(),
                loaded.total
            );
            println!("{}", serde_json::to_string_pretty(&loaded.items)?);
        }
    }
    Ok(())
}
