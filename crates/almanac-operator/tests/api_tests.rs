//! Integration tests for the operator API endpoints.
//!
//! Tests drive the Axum `Router` directly via `tower::ServiceExt` without
//! starting a TCP server, against an almanac backed by the in-memory store
//! and the recording actuator and announcer.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use almanac_core::config::AlmanacConfig;
use almanac_core::{AdminOps, Almanac, RecordingActuator, RecordingAnnouncer};
use almanac_operator::build_router;
use almanac_store::MemoryStore;
use almanac_types::Season;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;

type TestAlmanac = Almanac<MemoryStore, RecordingActuator, RecordingAnnouncer>;

async fn make_almanac() -> Arc<TestAlmanac> {
    let mut config = AlmanacConfig::default();
    config.weather.seed = Some(11);
    let almanac = Almanac::new(
        &config,
        MemoryStore::new(),
        RecordingActuator::new(),
        RecordingAnnouncer::new(),
    )
    .unwrap();
    almanac.check_and_advance(Utc::now()).await.unwrap();
    Arc::new(almanac)
}

fn post(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =========================================================================
// Status
// =========================================================================

#[tokio::test]
async fn test_status_reports_active_season() {
    let almanac = make_almanac().await;
    let router = build_router(Arc::clone(&almanac));

    let response = router
        .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["season"]["season"], "blooming");
    assert_eq!(json["paused"], false);
    assert!(json["season_ends_at"].is_string());
}

// =========================================================================
// Seasons
// =========================================================================

#[tokio::test]
async fn test_check_season_is_a_no_op_mid_season() {
    let almanac = make_almanac().await;
    let router = build_router(Arc::clone(&almanac));

    let response = router.oneshot(post("/api/season/check")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["changed"], false);
}

#[tokio::test]
async fn test_set_season_accepts_display_name() {
    let almanac = make_almanac().await;
    let router = build_router(Arc::clone(&almanac));

    let response = router
        .oneshot(post_json(
            "/api/season/set",
            &serde_json::json!({ "season": "the drought" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["season"]["season"], "drought");
    assert_eq!(json["previous"], "blooming");

    let persisted = almanac.store().load().await.unwrap();
    assert_eq!(
        persisted.last_season.map(|s| s.season),
        Some(Season::Drought)
    );
}

#[tokio::test]
async fn test_set_unknown_season_is_bad_request() {
    let almanac = make_almanac().await;
    let router = build_router(Arc::clone(&almanac));

    let response = router
        .oneshot(post_json(
            "/api/season/set",
            &serde_json::json!({ "season": "monsoon" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 400);
    assert!(json["error"].as_str().unwrap().contains("monsoon"));
}

#[tokio::test]
async fn test_next_season_rotates_once() {
    let almanac = make_almanac().await;
    let router = build_router(Arc::clone(&almanac));

    let response = router.oneshot(post("/api/season/next")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["changed"], true);
    assert_eq!(json["season"]["season"], "drought");
}

#[tokio::test]
async fn test_reset_returns_to_first_season() {
    let almanac = make_almanac().await;
    almanac.advance_season(Utc::now()).await.unwrap();
    let router = build_router(Arc::clone(&almanac));

    let response = router.oneshot(post("/api/season/reset")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["season"]["season"], "blooming");
}

#[tokio::test]
async fn test_store_outage_is_service_unavailable() {
    let almanac = make_almanac().await;
    almanac.store().backend().set_unavailable(true);
    let router = build_router(Arc::clone(&almanac));

    let response = router.oneshot(post("/api/season/next")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 503);
}

// =========================================================================
// Weather
// =========================================================================

#[tokio::test]
async fn test_pause_without_body_uses_default() {
    let almanac = make_almanac().await;
    let router = build_router(Arc::clone(&almanac));

    let response = router.oneshot(post("/api/weather/pause")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!(json["paused_until"].is_string());
    assert!(almanac.pause().is_paused(Utc::now()).await);
}

#[tokio::test]
async fn test_paused_weather_tick_dispatches_nothing() {
    let almanac = make_almanac().await;
    let router = build_router(Arc::clone(&almanac));

    let response = router
        .clone()
        .oneshot(post_json(
            "/api/weather/pause",
            &serde_json::json!({ "hours": 2 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router.oneshot(post("/api/weather/tick")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!(json["paused_until"].is_string());
    assert!(json["weather"].is_null());
    assert!(almanac.actuator().commands().await.is_empty());
}

#[tokio::test]
async fn test_zero_hour_pause_is_bad_request() {
    let almanac = make_almanac().await;
    let router = build_router(Arc::clone(&almanac));

    let response = router
        .oneshot(post_json(
            "/api/weather/pause",
            &serde_json::json!({ "hours": 0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_resume_reports_cleared_deadline() {
    let almanac = make_almanac().await;
    almanac.pause_weather(None, Utc::now()).await.unwrap();
    let router = build_router(Arc::clone(&almanac));

    let response = router.oneshot(post("/api/weather/resume")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!(json["paused_until"].is_string());
    assert!(!almanac.pause().is_paused(Utc::now()).await);
}

#[tokio::test]
async fn test_weather_tick_applies_a_value() {
    let almanac = make_almanac().await;
    let router = build_router(Arc::clone(&almanac));

    let response = router.oneshot(post("/api/weather/tick")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["dispatched"], true);
    assert!(json["weather"].is_string());
    assert_eq!(almanac.actuator().commands().await.len(), 1);
}

#[tokio::test]
async fn test_weather_tick_reports_actuator_outage() {
    let almanac = make_almanac().await;
    almanac.actuator().set_failing(true);
    let router = build_router(Arc::clone(&almanac));

    let response = router.oneshot(post("/api/weather/tick")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["dispatched"], false);
    assert_eq!(json["announced"], true);
    let errors = json["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].as_str().unwrap().contains("/weather"));
}

// =========================================================================
// Water
// =========================================================================

#[tokio::test]
async fn test_water_tick_in_blooming_sends_nothing() {
    let almanac = make_almanac().await;
    let router = build_router(Arc::clone(&almanac));

    let response = router.oneshot(post("/api/water/tick")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["applied"], 0);
    assert!(almanac.actuator().commands().await.is_empty());
}

#[tokio::test]
async fn test_water_tick_in_freeze_covers_every_location() {
    let almanac = make_almanac().await;
    almanac.manual_set_season("freeze", Utc::now()).await.unwrap();
    let router = build_router(Arc::clone(&almanac));

    let response = router.oneshot(post("/api/water/tick")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["season"], "freeze");
    assert_eq!(json["applied"], almanac.water().table().len());
    assert_eq!(json["failed"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_water_tick_lists_failed_locations() {
    let almanac = make_almanac().await;
    almanac.manual_set_season("drought", Utc::now()).await.unwrap();
    almanac.actuator().set_failing(true);
    let router = build_router(Arc::clone(&almanac));

    let response = router.oneshot(post("/api/water/tick")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["applied"], 0);
    let failed = json["failed"].as_array().unwrap();
    assert_eq!(failed.len(), almanac.water().table().len());
    assert!(failed[0]["error"].as_str().unwrap().contains("actuator unavailable"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let almanac = make_almanac().await;
    let router = build_router(almanac);

    let response = router
        .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
