use loader::{LoadError, LoadState, LoaderOptions, RequestId};
use payloads::ProductPage;
use test_helpers::{MockResponse, mock, spawn_source};

#[tokio::test]
async fn three_items_is_success() -> anyhow::Result<()> {
    let source = spawn_source().await;
    source
        .script
        .set_default(MockResponse::raw(mock::catalog_body(3, 3)));
    let loader = source.loader(LoaderOptions::default());
    let mut watcher = loader.subscribe();

    let request = loader.trigger();
    assert!(loader.current_state().is_loading());

    let snapshot = watcher.settled().await.unwrap();
    assert_eq!(snapshot.request, request);
    let loaded = snapshot.state.loaded().unwrap();
    assert_eq!(loaded.items.len(), 3);
    assert_eq!(loaded.total, 3);
    assert_eq!(loaded.items[0]["title"], "Essence Mascara Lash Princess");

    Ok(())
}

#[tokio::test]
async fn total_can_exceed_items() -> anyhow::Result<()> {
    let source = spawn_source().await;
    source
        .script
        .set_default(MockResponse::raw(mock::catalog_body(2, 194)));
    let loader = source.loader(LoaderOptions::default());

    loader.trigger();
    let snapshot = loader.subscribe().settled().await.unwrap();
    let loaded = snapshot.state.loaded().unwrap();
    assert_eq!(loaded.items.len(), 2);
    assert_eq!(loaded.total, 194);

    Ok(())
}

#[tokio::test]
async fn no_items_is_empty() -> anyhow::Result<()> {
    let source = spawn_source().await;
    source
        .script
        .set_default(MockResponse::page(&ProductPage::new(vec![], 0)));
    let loader = source.loader(LoaderOptions::default());

    loader.trigger();
    let snapshot = loader.subscribe().settled().await.unwrap();
    assert_eq!(snapshot.state, LoadState::Empty);

    Ok(())
}

#[tokio::test]
async fn server_error_fails_with_status() -> anyhow::Result<()> {
    let source = spawn_source().await;
    source
        .script
        .set_default(MockResponse::status(500, "Internal Server Error"));
    let loader = source.loader(LoaderOptions::default());

    loader.trigger();
    let snapshot = loader.subscribe().settled().await.unwrap();
    let error = snapshot.state.error().unwrap();
    assert_eq!(error.to_string(), "HTTP error! status: 500");
    match error {
        LoadError::Status { body, .. } => {
            assert_eq!(body, "Internal Server Error")
        }
        _ => panic!("Expected status error"),
    }

    Ok(())
}

#[tokio::test]
async fn malformed_body_fails_with_parse_error() -> anyhow::Result<()> {
    let source = spawn_source().await;
    source
        .script
        .set_default(MockResponse::raw(r#"{"products": [{"id": 1}"#));
    let loader = source.loader(LoaderOptions::default());

    loader.trigger();
    let snapshot = loader.subscribe().settled().await.unwrap();
    let error = snapshot.state.error().unwrap();
    assert!(matches!(error, LoadError::Parse(_)));
    assert!(error.to_string().starts_with("Failed to parse response"));

    Ok(())
}

#[tokio::test]
async fn retrigger_after_success_reloads() -> anyhow::Result<()> {
    let source = spawn_source().await;
    let loader = source.loader(LoaderOptions::default());
    let mut watcher = loader.subscribe();

    loader.trigger();
    let snapshot = watcher.settled().await.unwrap();
    assert_eq!(snapshot.state.loaded().unwrap().items.len(), 5);

    source
        .script
        .set_default(MockResponse::raw(mock::catalog_body(1, 1)));
    let request = loader.trigger();
    assert_eq!(request, RequestId(2));
    // the previous payload is cleared as soon as the new request starts
    assert_eq!(loader.current_state(), LoadState::Loading);

    let snapshot = watcher.settled().await.unwrap();
    assert_eq!(snapshot.request, RequestId(2));
    assert_eq!(snapshot.state.loaded().unwrap().items.len(), 1);
    assert_eq!(source.script.hits(), vec![Some(1), Some(2)]);

    Ok(())
}
