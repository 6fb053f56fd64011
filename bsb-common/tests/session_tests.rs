//! Network loading and load session lifecycle
//!
//! Tests cover:
//! - Loading the dataset over HTTP
//! - Non-2xx responses failing the whole load
//! - Session states: loading → ready / error
//! - Last-request-wins reloads

mod helpers;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use bsb_common::{DataSource, DatasetSession, LoadState, Loader, Platform, ReloadOutcome, ViewStatus};
use helpers::{scenario_dataset, serve_dir};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;

fn network_loader(base_url: String) -> Loader {
    Loader::with_timeout(DataSource::Network { base_url }, Duration::from_secs(5))
}

#[tokio::test]
async fn test_network_load() {
    let dir = scenario_dataset();
    let base_url = serve_dir(dir.path()).await;

    let raw = network_loader(base_url).load().await.unwrap();
    assert_eq!(raw.browsers.len(), 3);
    assert_eq!(raw.platforms.len(), Platform::ALL.len());
    let platforms: Vec<_> = raw.platforms.iter().map(|(p, _)| *p).collect();
    assert_eq!(platforms, Platform::ALL);
}

#[tokio::test]
async fn test_network_missing_document_fails() {
    let dir = scenario_dataset();
    std::fs::remove_file(dir.path().join("android.json")).unwrap();
    let base_url = serve_dir(dir.path()).await;

    let err = network_loader(base_url).load().await.unwrap_err();
    assert!(err.is_data_unavailable());
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_session_states() {
    let dir = scenario_dataset();
    let session = DatasetSession::new(Loader::new(DataSource::Filesystem {
        dir: dir.path().to_path_buf(),
    }));
    assert_eq!(session.state().await.status(), ViewStatus::Loading);
    assert!(session.dataset().await.is_none());

    match session.reload().await {
        ReloadOutcome::Loaded(dataset) => assert_eq!(dataset.records.len(), 3),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(session.state().await.status(), ViewStatus::Ready);

    // A failed retry replaces the dataset; nothing partial stays visible
    std::fs::remove_file(dir.path().join("windows.json")).unwrap();
    assert!(matches!(session.reload().await, ReloadOutcome::Failed(_)));
    match session.state().await {
        LoadState::Failed(message) => assert!(message.contains("windows.json")),
        other => panic!("unexpected state: {:?}", other),
    }
    assert!(session.dataset().await.is_none());
}

/// Serves a valid dataset, except the first request for `browsers.json`
/// stalls and then returns garbage.
#[derive(Clone)]
struct SlowFirst {
    hits: Arc<AtomicUsize>,
    dir: std::path::PathBuf,
}

async fn slow_canonical(State(state): State<SlowFirst>) -> impl IntoResponse {
    if state.hits.fetch_add(1, Ordering::SeqCst) == 0 {
        tokio::time::sleep(Duration::from_millis(500)).await;
        return (StatusCode::OK, "not json".to_string());
    }
    let body = std::fs::read_to_string(state.dir.join("browsers.json")).unwrap();
    (StatusCode::OK, body)
}

#[tokio::test]
async fn test_reload_last_request_wins() {
    let dir = scenario_dataset();
    let state = SlowFirst {
        hits: Arc::new(AtomicUsize::new(0)),
        dir: dir.path().to_path_buf(),
    };
    let app = Router::new()
        .route("/browsers.json", get(slow_canonical))
        .fallback_service(ServeDir::new(dir.path()))
        .with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let session = DatasetSession::new(network_loader(format!("http://{}", addr)));

    let stale = session.spawn_reload();
    // Let the first load reach the stalled request
    while state.hits.load(Ordering::SeqCst) == 0 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let fresh = session.reload().await;
    assert!(matches!(fresh, ReloadOutcome::Loaded(_)));
    assert!(matches!(stale.await.unwrap(), ReloadOutcome::Superseded));

    // The abandoned load must not overwrite the newer result
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(session.state().await.status(), ViewStatus::Ready);
}
