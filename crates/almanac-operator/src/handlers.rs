//! Operator REST API handlers.
//!
//! Every handler is a thin adapter over one [`AdminOps`] call, stamped
//! with the current wall-clock instant.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/status` | Season, weather and pause snapshot |
//! | `POST` | `/api/season/check` | Rotate if the season has run its length |
//! | `POST` | `/api/season/set` | Force a named season |
//! | `POST` | `/api/season/next` | Rotate one step now |
//! | `POST` | `/api/season/reset` | Restart the rotation |
//! | `POST` | `/api/weather/pause` | Suspend weather ticks |
//! | `POST` | `/api/weather/resume` | Lift a weather suspension |
//! | `POST` | `/api/weather/tick` | Run a weather tick now |
//! | `POST` | `/api/water/tick` | Run a water tick now |

use std::sync::Arc;

use almanac_core::{AdminOps, SeasonChange, WaterReport, WeatherOutcome};
use almanac_types::{Season, SeasonRecord, StatusReport, Weather};
use axum::Json;
use axum::extract::State;
use chrono::{DateTime, TimeDelta, Utc};

use crate::error::OperatorError;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/season/set`.
#[derive(Debug, serde::Deserialize)]
pub struct SetSeasonRequest {
    /// Season name, e.g. `"the drought"` or `"Drought"`.
    pub season: String,
}

/// Optional request body for `POST /api/weather/pause`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct PauseRequest {
    /// Pause length in hours. The configured default applies when absent.
    pub hours: Option<u32>,
}

/// Response for the season operations.
#[derive(Debug, serde::Serialize)]
pub struct SeasonResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Whether a new season record was written.
    pub changed: bool,
    /// The season before the operation, if known.
    pub previous: Option<Season>,
    /// The active season after the operation.
    pub season: SeasonRecord,
    /// Human-readable message.
    pub message: String,
}

impl SeasonResponse {
    fn from_change(change: &SeasonChange) -> Self {
        let message = if change.changed {
            format!("Season is now {}", change.record.season)
        } else {
            format!("Season unchanged: {}", change.record.season)
        };
        Self {
            ok: true,
            changed: change.changed,
            previous: change.previous,
            season: change.record,
            message,
        }
    }
}

/// Response for the pause operations.
#[derive(Debug, serde::Serialize)]
pub struct PauseResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// The deadline now in force, or the one that was cleared on resume.
    pub paused_until: Option<DateTime<Utc>>,
    /// Human-readable message.
    pub message: String,
}

/// Response for `POST /api/weather/tick`.
#[derive(Debug, serde::Serialize)]
pub struct WeatherTickResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Set when the tick was suppressed by a pause.
    pub paused_until: Option<DateTime<Utc>>,
    /// The value chosen, unless paused.
    pub weather: Option<Weather>,
    /// Whether the game server accepted the command.
    pub dispatched: bool,
    /// Whether the flavor text was posted.
    pub announced: bool,
    /// Collaborator failures the tick recorded.
    pub errors: Vec<String>,
}

/// Response for `POST /api/water/tick`.
#[derive(Debug, serde::Serialize)]
pub struct WaterTickResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Season the tick applied.
    pub season: Season,
    /// Number of locations updated.
    pub applied: usize,
    /// Locations that failed, with the reason.
    pub failed: Vec<FailedLocation>,
}

/// One location a water tick could not update.
#[derive(Debug, serde::Serialize)]
pub struct FailedLocation {
    /// Location name.
    pub location: String,
    /// Why the command was not applied.
    pub error: String,
}

impl From<WaterReport> for WaterTickResponse {
    fn from(report: WaterReport) -> Self {
        Self {
            ok: true,
            season: report.season,
            applied: report.applied.len(),
            failed: report
                .failed
                .into_iter()
                .map(|(location, error)| FailedLocation {
                    location,
                    error: error.to_string(),
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// GET /api/status
// ---------------------------------------------------------------------------

/// Current season, weather and pause state.
pub async fn status<T: AdminOps>(State(ops): State<Arc<T>>) -> Json<StatusReport> {
    Json(ops.current_status(Utc::now()).await)
}

// ---------------------------------------------------------------------------
// Seasons
// ---------------------------------------------------------------------------

/// Rotate the season if its length has elapsed.
pub async fn check_season<T: AdminOps>(
    State(ops): State<Arc<T>>,
) -> Result<Json<SeasonResponse>, OperatorError> {
    let change = ops.check_and_advance(Utc::now()).await?;
    Ok(Json(SeasonResponse::from_change(&change)))
}

/// Force the named season. Unknown names are rejected with 400.
pub async fn set_season<T: AdminOps>(
    State(ops): State<Arc<T>>,
    Json(req): Json<SetSeasonRequest>,
) -> Result<Json<SeasonResponse>, OperatorError> {
    let change = ops.manual_set_season(&req.season, Utc::now()).await?;
    tracing::info!(season = %change.record.season, "Season set by operator");
    Ok(Json(SeasonResponse::from_change(&change)))
}

/// Rotate one step immediately.
pub async fn next_season<T: AdminOps>(
    State(ops): State<Arc<T>>,
) -> Result<Json<SeasonResponse>, OperatorError> {
    let change = ops.advance_season(Utc::now()).await?;
    tracing::info!(season = %change.record.season, "Season advanced by operator");
    Ok(Json(SeasonResponse::from_change(&change)))
}

/// Restart the rotation at its first season.
pub async fn reset_seasons<T: AdminOps>(
    State(ops): State<Arc<T>>,
) -> Result<Json<SeasonResponse>, OperatorError> {
    let change = ops.reset_seasons(Utc::now()).await?;
    tracing::info!(season = %change.record.season, "Season rotation reset by operator");
    Ok(Json(SeasonResponse::from_change(&change)))
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// Suspend weather ticks.
///
/// The body is optional; without it (or without `hours`) the configured
/// default applies.
pub async fn pause_weather<T: AdminOps>(
    State(ops): State<Arc<T>>,
    body: Option<Json<PauseRequest>>,
) -> Result<Json<PauseResponse>, OperatorError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let duration = req
        .hours
        .map(|h| {
            TimeDelta::try_hours(i64::from(h))
                .ok_or_else(|| OperatorError::BadRequest(format!("{h} hours is out of range")))
        })
        .transpose()?;

    let until = ops.pause_weather(duration, Utc::now()).await?;
    tracing::info!(until = %until, "Weather paused by operator");
    Ok(Json(PauseResponse {
        ok: true,
        paused_until: Some(until),
        message: format!("Weather paused until {}", until.format("%Y-%m-%d %H:%M UTC")),
    }))
}

/// Lift any weather suspension.
pub async fn resume_weather<T: AdminOps>(
    State(ops): State<Arc<T>>,
) -> Result<Json<PauseResponse>, OperatorError> {
    let cleared = ops.resume_weather().await?;
    tracing::info!(cleared = ?cleared, "Weather resumed by operator");
    Ok(Json(PauseResponse {
        ok: true,
        paused_until: cleared,
        message: if cleared.is_some() {
            "Weather resumed".to_owned()
        } else {
            "Weather was not paused".to_owned()
        },
    }))
}

/// Run a weather tick now.
pub async fn weather_tick<T: AdminOps>(
    State(ops): State<Arc<T>>,
) -> Result<Json<WeatherTickResponse>, OperatorError> {
    let outcome = ops.run_weather_tick(Utc::now()).await?;
    let errors = outcome.failures().map(ToString::to_string).collect();
    let response = match outcome {
        WeatherOutcome::Paused { until } => WeatherTickResponse {
            ok: true,
            paused_until: Some(until),
            weather: None,
            dispatched: false,
            announced: false,
            errors,
        },
        WeatherOutcome::Applied {
            reading,
            dispatch_error,
            announce_error,
        } => WeatherTickResponse {
            ok: true,
            paused_until: None,
            weather: Some(reading.weather),
            dispatched: dispatch_error.is_none(),
            announced: announce_error.is_none(),
            errors,
        },
    };
    Ok(Json(response))
}

// ---------------------------------------------------------------------------
// Water
// ---------------------------------------------------------------------------

/// Run a water tick now.
pub async fn water_tick<T: AdminOps>(
    State(ops): State<Arc<T>>,
) -> Result<Json<WaterTickResponse>, OperatorError> {
    let report = ops.run_water_tick(Utc::now()).await?;
    Ok(Json(report.into()))
}
