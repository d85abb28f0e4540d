//! Integration tests for the Observer API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. The engine behind them uses a seeded synthetic
//! source, so no network is touched.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use windspin_core::SpinEngine;
use windspin_core::config::{ObserverConfig, TimingConfig};
use windspin_core::rotation::RotationModel;
use windspin_core::sampler::{SyntheticSource, WindSampler};
use windspin_observer::router::build_router;
use windspin_observer::state::AppState;

fn make_engine() -> Arc<SpinEngine> {
    let timing = TimingConfig {
        sample_interval_ms: 60_000,
        accumulate_interval_ms: 50,
        autostart: false,
    };
    Arc::new(SpinEngine::new(
        WindSampler::Synthetic(SyntheticSource::new(Some(7))),
        RotationModel::default(),
        &timing,
    ))
}

fn make_app(expose_rpm: bool) -> (Router, Arc<SpinEngine>) {
    let engine = make_engine();
    let config = ObserverConfig {
        expose_rpm,
        ..ObserverConfig::default()
    };
    let state = Arc::new(AppState::with_config(Arc::clone(&engine), &config));
    (build_router(state), engine)
}

async fn send(app: &Router, method: &str, path: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_index_returns_html() {
    let (app, _engine) = make_app(true);
    let (status, body) = send(&app, "GET", "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Windspin"));
    assert!(body.contains("IDLE"));
}

#[tokio::test]
async fn test_spins_before_start() {
    let (app, _engine) = make_app(true);
    let (status, body) = send(&app, "GET", "/spins").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Total spins: 0.00");
}

#[tokio::test]
async fn test_rpm_before_start() {
    let (app, _engine) = make_app(true);
    let (status, body) = send(&app, "GET", "/rpm").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "0.00");
}

#[tokio::test]
async fn test_rpm_route_can_be_disabled() {
    let (app, _engine) = make_app(false);
    let (status, _) = send(&app, "GET", "/rpm").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_start_and_stop() {
    let (app, engine) = make_app(true);

    let (status, body) = send(&app, "POST", "/start").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Spinning started");
    assert!(engine.is_spinning().await);

    // Seeded synthetic wind is at least 5 m/s, so RPM is already positive.
    let (_, rpm) = send(&app, "GET", "/rpm").await;
    assert!(rpm.parse::<f64>().unwrap() > 0.0);

    let (status, body) = send(&app, "POST", "/stop").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Spinning stopped");
    assert!(!engine.is_spinning().await);
}

#[tokio::test]
async fn test_start_twice_is_ok() {
    let (app, engine) = make_app(true);

    let (first, _) = send(&app, "POST", "/start").await;
    let (second, body) = send(&app, "POST", "/start").await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(body, "Spinning started");

    engine.shutdown().await;
}

#[tokio::test]
async fn test_stop_while_idle_is_ok() {
    let (app, _engine) = make_app(true);
    let (status, body) = send(&app, "POST", "/stop").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Spinning stopped");
}

#[tokio::test]
async fn test_start_requires_post() {
    let (app, _engine) = make_app(true);
    let (status, _) = send(&app, "GET", "/start").await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_spins_grow_while_spinning() {
    let (app, engine) = make_app(true);
    send(&app, "POST", "/start").await;
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    send(&app, "POST", "/stop").await;

    let (_, body) = send(&app, "GET", "/spins").await;
    let total: f64 = body
        .strip_prefix("Total spins: ")
        .unwrap()
        .parse()
        .unwrap();
    assert!(total > 0.0);

    // Frozen after stop.
    let (_, again) = send(&app, "GET", "/spins").await;
    assert_eq!(body, again);
    assert!(!engine.is_spinning().await);
}

#[tokio::test]
async fn test_status_json() {
    let (app, engine) = make_app(true);
    send(&app, "POST", "/start").await;

    let (status, body) = send(&app, "GET", "/api/status").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["active"], true);
    assert_eq!(json["source"], "synthetic");
    assert_eq!(json["model"], "tip-speed-ratio");
    assert_eq!(json["samples_taken"], 1);
    assert_eq!(json["sample_failures"], 0);
    assert!(json["rpm"].as_f64().unwrap() > 0.0);
    assert!(json["started_at"].is_string());
    assert!(json["stopped_at"].is_null());

    engine.shutdown().await;
}

#[tokio::test]
async fn test_unknown_route() {
    let (app, _engine) = make_app(true);
    let (status, _) = send(&app, "GET", "/nonexistent").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
