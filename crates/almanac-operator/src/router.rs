//! Axum router construction for the operator API.

use std::sync::Arc;

use almanac_core::AdminOps;
use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Build the operator router over any [`AdminOps`] implementation.
///
/// CORS allows any origin so a local dashboard can call it. There is no
/// authentication; bind it to a trusted interface.
pub fn build_router<T>(ops: Arc<T>) -> Router
where
    T: AdminOps + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/status", get(handlers::status::<T>))
        // Seasons
        .route("/api/season/check", post(handlers::check_season::<T>))
        .route("/api/season/set", post(handlers::set_season::<T>))
        .route("/api/season/next", post(handlers::next_season::<T>))
        .route("/api/season/reset", post(handlers::reset_seasons::<T>))
        // Weather
        .route("/api/weather/pause", post(handlers::pause_weather::<T>))
        .route("/api/weather/resume", post(handlers::resume_weather::<T>))
        .route("/api/weather/tick", post(handlers::weather_tick::<T>))
        // Water
        .route("/api/water/tick", post(handlers::water_tick::<T>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ops)
}
