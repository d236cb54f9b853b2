use loader::{
    FallbackPolicy, LoadError, LoaderOptions, ResourceLoader, TransportError,
};
use payloads::APIClient;
use std::time::Duration;
use test_helpers::{
    MockResponse, mock, spawn_source, spawn_source_on_port, unused_port,
};

#[tokio::test]
async fn connection_refused_then_retry() -> anyhow::Result<()> {
    let port = unused_port();
    let client = APIClient::new(format!("http://127.0.0.1:{port}"));
    let loader: ResourceLoader<APIClient> =
        ResourceLoader::new(client, LoaderOptions::default());
    let mut watcher = loader.subscribe();

    loader.trigger();
    let snapshot = watcher.settled().await.unwrap();
    let error = snapshot.state.error().unwrap();
    assert!(matches!(
        error,
        LoadError::Transport(TransportError::Network(_))
    ));
    assert!(error.to_string().starts_with("Network error:"));

    // bring the source up and try again
    let _source = spawn_source_on_port(port).await;
    loader.trigger();
    let snapshot = watcher.settled().await.unwrap();
    assert_eq!(snapshot.state.loaded().unwrap().items.len(), 5);

    Ok(())
}

#[tokio::test]
async fn slow_source_times_out() -> anyhow::Result<()> {
    let source = spawn_source().await;
    source.script.set_default(
        MockResponse::raw(mock::full_catalog_body())
            .delayed(Duration::from_secs(2)),
    );
    let loader = source.loader(LoaderOptions {
        timeout: Some(Duration::from_millis(100)),
        ..Default::default()
    });

    loader.trigger();
    let snapshot = loader.subscribe().settled().await.unwrap();
    assert_eq!(
        snapshot.state.error().unwrap().to_string(),
        "Network error: request timed out after 100ms"
    );

    Ok(())
}

#[tokio::test]
async fn unreachable_source_uses_substitute_data() -> anyhow::Result<()> {
    let client = APIClient::new(format!("http://127.0.0.1:{}", unused_port()));
    let options = LoaderOptions {
        timeout: None,
        fallback: FallbackPolicy::Substitute(mock::sample_page()),
    };
    let loader = ResourceLoader::new(client, options);

    loader.trigger();
    let snapshot = loader.subscribe().settled().await.unwrap();
    let loaded = snapshot.state.loaded().unwrap();
    assert_eq!(loaded.items.len(), 5);
    assert!(matches!(loaded.degraded, Some(LoadError::Transport(_))));

    Ok(())
}

#[tokio::test]
async fn substitute_data_does_not_hide_status_errors() -> anyhow::Result<()> {
    let source = spawn_source().await;
    source.script.set_default(MockResponse::status(404, "not found"));
    let loader = source.loader(LoaderOptions {
        timeout: None,
        fallback: FallbackPolicy::Substitute(mock::sample_page()),
    });

    loader.trigger();
    let snapshot = loader.subscribe().settled().await.unwrap();
    assert_eq!(
        snapshot.state.error().unwrap().to_string(),
        "HTTP error! status: 404"
    );

    Ok(())
}
