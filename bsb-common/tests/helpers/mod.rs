//! Shared fixtures for bsb-common integration tests
//!
//! - Writing dataset documents to a temporary directory
//! - Serving a directory over HTTP for network loader tests

#![allow(dead_code)]

use bsb_common::Platform;
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;
use tower_http::services::ServeDir;

/// Write `browsers.json` plus one document per platform
///
/// Platforms not listed get an empty array.
pub fn write_dataset(dir: &Path, canonical: &Value, platforms: &[(Platform, Value)]) {
    std::fs::write(dir.join("browsers.json"), canonical.to_string()).unwrap();
    for platform in Platform::ALL {
        let doc = platforms
            .iter()
            .find(|(p, _)| *p == platform)
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| json!([]));
        std::fs::write(dir.join(platform.data_file()), doc.to_string()).unwrap();
    }
}

pub fn version(label: &str, speedometer3: f64) -> Value {
    json!({"version": label, "scores": {"speedometer3": speedometer3}})
}

/// Three browsers; only A and B are tested on Windows, and only B uses Gecko
pub fn scenario_dataset() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_dataset(
        dir.path(),
        &json!([
            {"name": "A", "logo": "/logos/a.png", "website": "https://a.example"},
            {"name": "B", "logo": "/logos/b.png", "website": "https://b.example"},
            {"name": "C", "logo": "/logos/c.png", "website": "https://c.example"}
        ]),
        &[
            (
                Platform::Windows,
                json!([
                    {"name": "A", "engine": "Blink", "versions": [
                        {"version": "2.0", "releaseDate": "2024-10-01",
                         "scores": {"speedometer3": 42, "ram": 900, "adblock": 35}},
                        {"version": "1.0", "releaseDate": "2024-08-01",
                         "scores": {"speedometer3": 40}}
                    ]},
                    {"name": "B", "engine": "Gecko", "versions": [
                        {"version": "130", "scores": {"speedometer3": 21.5, "ram": 700}}
                    ]},
                    {"name": "Orphan", "engine": "Blink", "versions": [
                        {"version": "1", "scores": {"speedometer3": 99}}
                    ]}
                ]),
            ),
            (
                Platform::Android,
                json!([
                    {"name": "C", "engine": "WebKit", "versions": []}
                ]),
            ),
        ],
    );
    dir
}

/// Serve `dir` on an ephemeral local port, returning the base URL
pub async fn serve_dir(dir: &Path) -> String {
    let app = axum::Router::new().nest_service("/data", ServeDir::new(dir));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/data", addr)
}
