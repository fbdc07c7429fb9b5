//! Scheduler binary for the Almanac.
//!
//! Wires the configured store, actuator and announcer into the core,
//! starts the three timer loops and the operator API, and runs until
//! `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `almanac.yaml` (or `ALMANAC_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Open the state store and build the adapters
//! 4. Load persisted state into every cycle
//! 5. Run one season check and announce the active season
//! 6. Start the timer loops and the operator API
//! 7. Wait for `Ctrl-C`, then stop within the shutdown grace period

mod actuator;
mod announcer;
mod error;
mod store;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use almanac_core::config::{AlmanacConfig, LogFormat, LoggingConfig};
use almanac_core::{AdminOps, Almanac, Scheduler};
use almanac_operator::ServerConfig;
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::actuator::ActuatorBackend;
use crate::announcer::AnnouncerBackend;
use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "almanac.yaml";

/// How long to wait for the operator server after the loops have stopped.
const SERVER_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the store, an adapter, or the
/// initial state load fails. Failures inside running ticks are logged and
/// never end the process.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration before logging so the configured level applies.
    let (config, config_source) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(config = %config_source, "almanac-engine starting");
    info!(
        season_length_days = config.seasons.length_days,
        catch_up = ?config.seasons.catch_up,
        weather_every_min = config.schedule.weather_interval_minutes,
        water_every_min = config.schedule.water_interval_minutes,
        store = ?config.store.backend,
        actuator = ?config.actuator.kind,
        announcer = ?config.announcer.kind,
        "Configuration loaded"
    );

    // 3. Store and adapters.
    let store = store::open(&config.store).await?;
    let actuator = ActuatorBackend::from_config(&config.actuator)?;
    let announcer = AnnouncerBackend::from_config(&config.announcer)?;
    let almanac = Arc::new(Almanac::new(&config, store, actuator, announcer)?);

    // 4. Persisted state.
    almanac.bootstrap().await?;

    // 5. Startup season check and announcement. Failures here are retried
    //    by the season loop, so they do not stop the engine.
    match almanac.check_and_advance(Utc::now()).await {
        Ok(change) => info!(season = %change.record.season, changed = change.changed, "Startup season check"),
        Err(e) => tracing::warn!(error = %e, "Startup season check failed"),
    }
    match almanac.announce_active_season().await {
        Ok(outcome) => info!(?outcome, "Startup season announcement"),
        Err(e) => tracing::warn!(error = %e, "Startup season announcement failed"),
    }

    // 6. Timer loops and operator API.
    let cancel = CancellationToken::new();
    let scheduler = Scheduler::spawn(&almanac, &config.schedule, cancel.clone());

    let server = if config.operator.enabled {
        let server_config = ServerConfig::from(&config.operator);
        let ops = Arc::clone(&almanac);
        let token = cancel.clone();
        Some(tokio::spawn(async move {
            almanac_operator::start_server(&server_config, ops, token).await
        }))
    } else {
        info!("Operator API disabled");
        None
    };

    // 7. Shutdown.
    tokio::signal::ctrl_c().await.map_err(EngineError::Signal)?;
    info!("Shutdown requested, finishing in-flight ticks");

    let stopped = scheduler.shutdown(config.schedule.shutdown_grace()).await;
    if let Some(handle) = server {
        match tokio::time::timeout(SERVER_STOP_TIMEOUT, handle).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => tracing::error!(error = %e, "Operator server failed"),
            Ok(Err(e)) => tracing::error!(error = %e, "Operator server task panicked"),
            Err(_) => tracing::warn!("Operator server did not stop in time"),
        }
    }

    info!(loops_stopped = stopped.len(), "almanac-engine shutdown complete");
    Ok(())
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// Load configuration from `ALMANAC_CONFIG` or `almanac.yaml`.
///
/// A missing file is not an error: defaults apply, plus environment
/// overrides. Returns the configuration and a description of its source.
fn load_config() -> Result<(AlmanacConfig, String), EngineError> {
    let path = std::env::var("ALMANAC_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    if path.exists() {
        let config = AlmanacConfig::from_file(&path)?;
        Ok((config, path.display().to_string()))
    } else {
        let mut config = AlmanacConfig::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok((config, "defaults".to_owned()))
    }
}
