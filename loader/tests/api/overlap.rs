use loader::{LoaderOptions, RequestId};
use std::time::Duration;
use test_helpers::{MockResponse, mock, spawn_source};

#[tokio::test]
async fn slow_first_request_does_not_clobber_second() -> anyhow::Result<()> {
    let source = spawn_source().await;
    source.script.respond_to(
        1,
        MockResponse::raw(mock::catalog_body(4, 4))
            .delayed(Duration::from_millis(400)),
    );
    source
        .script
        .respond_to(2, MockResponse::raw(mock::catalog_body(1, 1)));
    let loader = source.loader(LoaderOptions::default());
    let mut watcher = loader.subscribe();

    loader.trigger();
    loader.trigger();

    let snapshot = watcher.settled().await.unwrap();
    assert_eq!(snapshot.request, RequestId(2));
    assert_eq!(snapshot.state.loaded().unwrap().items.len(), 1);

    // wait for the slow response to arrive and be discarded
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(source.script.hits().len(), 2);
    let snapshot = watcher.current();
    assert_eq!(snapshot.request, RequestId(2));
    assert_eq!(snapshot.state.loaded().unwrap().items.len(), 1);

    Ok(())
}

#[tokio::test]
async fn slow_first_failure_does_not_clobber_second() -> anyhow::Result<()> {
    let source = spawn_source().await;
    source.script.respond_to(
        1,
        MockResponse::status(500, "").delayed(Duration::from_millis(300)),
    );
    let loader = source.loader(LoaderOptions::default());

    loader.trigger();
    loader.trigger();
    let snapshot = loader.subscribe().settled().await.unwrap();
    assert_eq!(snapshot.request, RequestId(2));

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(loader.current_state().loaded().is_some());

    Ok(())
}
