//! Integration tests for bsb-server API endpoints
//!
//! Tests cover:
//! - Health and build information
//! - Rankings in each load state: loading, error, empty, ready
//! - Query parameter validation
//! - Engine filter options and platform listing
//! - Browser detail and comparison
//! - Reload (retry) and viewer preferences

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use bsb_common::prefs::MemoryPreferenceStore;
use bsb_common::{DataSource, DatasetSession, Loader, Platform, ViewStatus};
use bsb_server::{build_router, AppState};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: Write the scenario dataset to a temporary directory
///
/// A and B are tested on Windows (A on Blink with two versions, B on Gecko);
/// C is listed on Android with an empty history.
fn write_dataset() -> TempDir {
    let dir = TempDir::new().unwrap();
    let canonical = json!([
        {"name": "A", "logo": "/logos/a.png", "website": "https://a.example"},
        {"name": "B", "logo": "/logos/b.png", "website": "https://b.example"},
        {"name": "C", "logo": "/logos/c.png", "website": "https://c.example"}
    ]);
    let windows = json!([
        {"name": "A", "engine": "Blink", "versions": [
            {"version": "2.0", "scores": {"speedometer3": 42, "ram": 900, "adblock": 35}},
            {"version": "1.0", "scores": {"speedometer3": 40}}
        ]},
        {"name": "B", "engine": "Gecko", "versions": [
            {"version": "130", "scores": {"speedometer3": 21.5}}
        ]}
    ]);
    let android = json!([{"name": "C", "engine": "WebKit", "versions": []}]);

    std::fs::write(dir.path().join("browsers.json"), canonical.to_string()).unwrap();
    for platform in Platform::ALL {
        let doc = match platform {
            Platform::Windows => windows.clone(),
            Platform::Android => android.clone(),
            _ => json!([]),
        };
        std::fs::write(dir.path().join(platform.data_file()), doc.to_string()).unwrap();
    }
    dir
}

/// Test helper: Create app over `dir` with in-memory preferences, without loading
fn setup_app(dir: &Path) -> (Router, Arc<DatasetSession>) {
    let session = DatasetSession::new(Loader::new(DataSource::Filesystem {
        dir: dir.to_path_buf(),
    }));
    let state = AppState::new(session.clone(), Box::new(MemoryPreferenceStore::new()));
    (build_router(state), session)
}

/// Test helper: Create app with the dataset already loaded
async fn setup_loaded_app(dir: &Path) -> Router {
    let (app, session) = setup_app(dir);
    session.reload().await;
    app
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app.clone().oneshot(test_request("GET", uri)).await.unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

fn names(browsers: &Value) -> Vec<&str> {
    browsers
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect()
}

// =============================================================================
// Health and Build Info
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let dir = write_dataset();
    let (app, _) = setup_app(dir.path());

    let (status, body) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "bsb-server");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let dir = write_dataset();
    let (app, _) = setup_app(dir.path());

    let (status, body) = get_json(&app, "/api/buildinfo").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["git_hash"].is_string());
    assert!(body["build_timestamp"].is_string());
    assert!(body["build_profile"].is_string());
}

// =============================================================================
// Rankings
// =============================================================================

#[tokio::test]
async fn test_rankings_while_loading() {
    let dir = write_dataset();
    let (app, _) = setup_app(dir.path());

    let (status, body) = get_json(&app, "/api/rankings?platform=windows").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "loading");
    assert_eq!(body["browsers"], json!([]));
    assert!(body.get("message").is_none());
}

#[tokio::test]
async fn test_rankings_after_failed_load() {
    let dir = write_dataset();
    std::fs::remove_file(dir.path().join("windows.json")).unwrap();
    let app = setup_loaded_app(dir.path()).await;

    let (status, body) = get_json(&app, "/api/rankings?platform=windows").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "error");
    assert!(body["message"].as_str().unwrap().contains("windows.json"));
    assert_eq!(body["browsers"], json!([]));
}

#[tokio::test]
async fn test_rankings_ready() {
    let dir = write_dataset();
    let app = setup_loaded_app(dir.path()).await;

    let (status, body) = get_json(&app, "/api/rankings?platform=windows").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "ready");
    assert_eq!(body["platform"], "windows");
    assert_eq!(body["engine"], "All");
    assert_eq!(body["sort"], "desc");
    assert_eq!(body["eligible"], 2);
    assert_eq!(names(&body["browsers"]), ["A", "B"]);
    assert_eq!(body["browsers"][0]["rank"], 1);
    assert_eq!(body["browsers"][0]["delta"], 2.0);
    assert_eq!(body["browsers"][1]["delta"], Value::Null);
    assert_eq!(body["stats"]["count"], 2);
    assert_eq!(body["stats"]["engines"], 2);
    assert_eq!(body["chart"][0]["share_of_max"], 1.0);
}

#[tokio::test]
async fn test_rankings_filters() {
    let dir = write_dataset();
    let app = setup_loaded_app(dir.path()).await;

    let (_, body) = get_json(&app, "/api/rankings?platform=windows&search=gec").await;
    assert_eq!(names(&body["browsers"]), ["B"]);
    assert_eq!(body["eligible"], 2);

    let (_, body) = get_json(&app, "/api/rankings?platform=windows&engine=Blink").await;
    assert_eq!(names(&body["browsers"]), ["A"]);

    let (_, body) = get_json(&app, "/api/rankings?platform=windows&sort=asc").await;
    assert_eq!(names(&body["browsers"]), ["B", "A"]);
    assert_eq!(body["browsers"][0]["rank"], 1);
}

#[tokio::test]
async fn test_rankings_empty_is_not_error() {
    let dir = write_dataset();
    let app = setup_loaded_app(dir.path()).await;

    let (status, body) = get_json(&app, "/api/rankings?platform=android").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "empty");
    assert_eq!(body["eligible"], 0);
    assert_eq!(body["stats"], Value::Null);

    let (_, body) = get_json(&app, "/api/rankings?platform=windows&search=zzz").await;
    assert_eq!(body["state"], "empty");
    assert_eq!(body["eligible"], 2);
}

#[tokio::test]
async fn test_rankings_invalid_parameters() {
    let dir = write_dataset();
    let app = setup_loaded_app(dir.path()).await;

    let (status, body) = get_json(&app, "/api/rankings?platform=beos").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, _) = get_json(&app, "/api/rankings?platform=windows&sort=random").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Engines and Platforms
// =============================================================================

#[tokio::test]
async fn test_engines() {
    let dir = write_dataset();
    let (app, session) = setup_app(dir.path());

    let (_, body) = get_json(&app, "/api/engines?platform=windows").await;
    assert_eq!(body["state"], "loading");
    assert_eq!(body["engines"], json!(["All"]));

    session.reload().await;
    let (_, body) = get_json(&app, "/api/engines?platform=windows").await;
    assert_eq!(body["engines"], json!(["All", "Blink", "Gecko"]));

    let (_, body) = get_json(&app, "/api/engines?platform=android").await;
    assert_eq!(body["engines"], json!(["All"]));
}

#[tokio::test]
async fn test_platforms_in_tab_order() {
    let dir = write_dataset();
    let app = setup_loaded_app(dir.path()).await;

    let (status, body) = get_json(&app, "/api/platforms").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selected"], "macos-arm");

    let platforms = body["platforms"].as_array().unwrap();
    let keys: Vec<_> = platforms.iter().map(|p| p["key"].as_str().unwrap()).collect();
    assert_eq!(keys, ["macos-arm", "android", "ipad", "windows", "macos-intel"]);
    assert_eq!(platforms[0]["freshness"], "fresh");
    assert_eq!(platforms[3]["display_name"], "Windows");
    assert_eq!(platforms[3]["eligible"], 2);
    assert_eq!(platforms[1]["eligible"], 0);
}

// =============================================================================
// Browser Detail and Comparison
// =============================================================================

#[tokio::test]
async fn test_browser_detail() {
    let dir = write_dataset();
    let app = setup_loaded_app(dir.path()).await;

    let (status, body) = get_json(&app, "/api/browsers/B?platform=windows").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "B");
    assert_eq!(body["rank"], 2);
    assert_eq!(body["engine"], "Gecko");
    assert_eq!(body["latest_version"], "130");

    let (_, body) = get_json(&app, "/api/browsers/A?platform=windows").await;
    assert_eq!(body["version_history"][0]["version"], "1.0");
    assert_eq!(body["ram"], 900.0);
}

#[tokio::test]
async fn test_browser_detail_not_found() {
    let dir = write_dataset();
    let app = setup_loaded_app(dir.path()).await;

    let (status, body) = get_json(&app, "/api/browsers/Netscape?platform=windows").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    // Known browser, but no history on the platform
    let (status, _) = get_json(&app, "/api/browsers/C?platform=android").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_compare() {
    let dir = write_dataset();
    let app = setup_loaded_app(dir.path()).await;

    let (status, body) = get_json(&app, "/api/compare?platform=windows&names=B,A,C").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["baseline"], "B");
    assert_eq!(body["entries"][1]["name"], "A");
    assert_eq!(body["entries"][1]["diff_from_baseline"], 20.5);
    assert_eq!(body["missing"], json!(["C"]));

    let (status, _) = get_json(&app, "/api/compare?platform=windows&names=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_compare_before_load_is_unavailable() {
    let dir = write_dataset();
    let (app, _) = setup_app(dir.path());

    let (status, body) = get_json(&app, "/api/compare?platform=windows&names=A").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "DATA_UNAVAILABLE");
}

// =============================================================================
// Reload
// =============================================================================

#[tokio::test]
async fn test_reload_recovers_after_failure() {
    let dir = write_dataset();
    let canonical = std::fs::read_to_string(dir.path().join("browsers.json")).unwrap();
    std::fs::remove_file(dir.path().join("browsers.json")).unwrap();

    let (app, session) = setup_app(dir.path());
    session.reload().await;
    assert_eq!(session.state().await.status(), ViewStatus::Error);

    // Source fixed; retry
    std::fs::write(dir.path().join("browsers.json"), canonical).unwrap();
    let response = app.clone().oneshot(test_request("POST", "/api/reload")).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let mut state = ViewStatus::Loading;
    for _ in 0..100 {
        state = session.state().await.status();
        if state == ViewStatus::Ready {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(state, ViewStatus::Ready);

    let (_, body) = get_json(&app, "/api/rankings?platform=windows").await;
    assert_eq!(body["state"], "ready");
}

// =============================================================================
// Preferences
// =============================================================================

#[tokio::test]
async fn test_preferences_defaults() {
    let dir = write_dataset();
    let (app, _) = setup_app(dir.path());

    let (status, body) = get_json(&app, "/api/preferences").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"platform": "macos-arm", "engine": "All", "view_mode": "grid"}));
}

#[tokio::test]
async fn test_preferences_update_drives_rankings() {
    let dir = write_dataset();
    let app = setup_loaded_app(dir.path()).await;

    let update = json!({"platform": "windows", "engine": "Gecko", "view_mode": "list"});
    let response = app
        .clone()
        .oneshot(json_request("PUT", "/api/preferences", update))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body, json!({"platform": "windows", "engine": "Gecko", "view_mode": "list"}));

    // Remembered selection applies when the request names nothing
    let (_, body) = get_json(&app, "/api/rankings").await;
    assert_eq!(body["platform"], "windows");
    assert_eq!(names(&body["browsers"]), ["B"]);

    // Switching platform resets the remembered engine
    let update = json!({"platform": "android"});
    let response = app
        .clone()
        .oneshot(json_request("PUT", "/api/preferences", update))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["engine"], "All");
    assert_eq!(body["view_mode"], "list");
}

#[tokio::test]
async fn test_preferences_invalid_values_rejected() {
    let dir = write_dataset();
    let (app, _) = setup_app(dir.path());

    let update = json!({"view_mode": "carousel"});
    let response = app
        .clone()
        .oneshot(json_request("PUT", "/api/preferences", update))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (_, body) = get_json(&app, "/api/preferences").await;
    assert_eq!(body["view_mode"], "grid");
}
