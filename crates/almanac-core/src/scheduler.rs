//! Independent timer loops for the three cycles.
//!
//! Each cycle runs on its own tokio task with its own interval. Ticks that
//! would have fired while a previous tick was still running are skipped,
//! not queued. A failing tick is logged (and optionally reported to the
//! operations channel) and the loop carries on; one cycle's failure never
//! reaches another cycle's task.
//!
//! Cancellation is only observed between ticks. A tick that has started
//! runs to completion unless the shutdown grace period runs out.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use almanac_store::StateStore;
use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::almanac::{AdminOps, Almanac};
use crate::config::ScheduleConfig;
use crate::error::CycleError;
use crate::ports::{Actuator, Announcer};
use crate::weather::WeatherOutcome;

/// Which loop a task runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleKind {
    /// Season boundary check.
    Season,
    /// Weather selection.
    Weather,
    /// Water quality dispatch.
    Water,
}

impl fmt::Display for CycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Season => "season",
            Self::Weather => "weather",
            Self::Water => "water",
        })
    }
}

/// Counters a loop reports when it stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Ticks run.
    pub ticks: u64,
    /// Ticks that returned an error.
    pub failures: u64,
}

/// Handles to the running loops.
pub struct Scheduler {
    cancel: CancellationToken,
    tasks: Vec<(CycleKind, JoinHandle<LoopStats>)>,
}

impl Scheduler {
    /// Start the season, weather and water loops.
    ///
    /// The first tick of every loop fires immediately.
    pub fn spawn<S, A, N>(
        almanac: &Arc<Almanac<S, A, N>>,
        schedule: &ScheduleConfig,
        cancel: CancellationToken,
    ) -> Self
    where
        S: StateStore + 'static,
        A: Actuator + 'static,
        N: Announcer + 'static,
    {
        let tasks = vec![
            (
                CycleKind::Season,
                tokio::spawn(run_loop(
                    Arc::clone(almanac),
                    CycleKind::Season,
                    schedule.season_check_period(),
                    cancel.clone(),
                    season_pass,
                )),
            ),
            (
                CycleKind::Weather,
                tokio::spawn(run_loop(
                    Arc::clone(almanac),
                    CycleKind::Weather,
                    schedule.weather_period(),
                    cancel.clone(),
                    weather_pass,
                )),
            ),
            (
                CycleKind::Water,
                tokio::spawn(run_loop(
                    Arc::clone(almanac),
                    CycleKind::Water,
                    schedule.water_period(),
                    cancel.clone(),
                    water_pass,
                )),
            ),
        ];

        tracing::info!(
            season_every = ?schedule.season_check_period(),
            weather_every = ?schedule.weather_period(),
            water_every = ?schedule.water_period(),
            "Scheduler started"
        );
        Self { cancel, tasks }
    }

    /// Stop every loop and wait up to `grace` for in-flight ticks.
    ///
    /// Loops still running when the grace period ends are aborted and
    /// logged. Returns the stats of the loops that stopped cleanly.
    pub async fn shutdown(self, grace: Duration) -> Vec<(CycleKind, LoopStats)> {
        self.cancel.cancel();
        let deadline = Instant::now()
            .checked_add(grace)
            .unwrap_or_else(Instant::now);

        let mut stopped = Vec::with_capacity(self.tasks.len());
        for (kind, mut handle) in self.tasks {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(stats)) => {
                    tracing::info!(cycle = %kind, ticks = stats.ticks, failures = stats.failures, "Loop stopped");
                    stopped.push((kind, stats));
                }
                Ok(Err(e)) => {
                    tracing::error!(cycle = %kind, error = %e, "Loop task panicked");
                }
                Err(_) => {
                    tracing::warn!(cycle = %kind, "Tick still in flight after grace period, aborting");
                    handle.abort();
                }
            }
        }
        stopped
    }
}

async fn run_loop<S, A, N, F, Fut>(
    almanac: Arc<Almanac<S, A, N>>,
    kind: CycleKind,
    period: Duration,
    cancel: CancellationToken,
    mut pass: F,
) -> LoopStats
where
    S: StateStore,
    A: Actuator,
    N: Announcer,
    F: FnMut(Arc<Almanac<S, A, N>>) -> Fut,
    Fut: Future<Output = Result<(), CycleError>>,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut stats = LoopStats::default();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        stats.ticks = stats.ticks.saturating_add(1);
        if let Err(e) = pass(Arc::clone(&almanac)).await {
            stats.failures = stats.failures.saturating_add(1);
            tracing::error!(cycle = %kind, error = %e, "Tick failed");
            almanac.report_failure(&kind.to_string(), &e).await;
        }
    }

    stats
}

async fn season_pass<S, A, N>(almanac: Arc<Almanac<S, A, N>>) -> Result<(), CycleError>
where
    S: StateStore,
    A: Actuator,
    N: Announcer,
{
    let change = almanac.check_and_advance(Utc::now()).await?;
    tracing::debug!(season = %change.record.season, changed = change.changed, "Season checked");
    Ok(())
}

async fn weather_pass<S, A, N>(almanac: Arc<Almanac<S, A, N>>) -> Result<(), CycleError>
where
    S: StateStore,
    A: Actuator,
    N: Announcer,
{
    let outcome = almanac.run_weather_tick(Utc::now()).await?;
    if let WeatherOutcome::Paused { until } = outcome {
        tracing::info!(until = %until, "Weather tick skipped while paused");
    }
    for error in outcome.failures() {
        almanac.report_failure(&CycleKind::Weather.to_string(), error).await;
    }
    Ok(())
}

async fn water_pass<S, A, N>(almanac: Arc<Almanac<S, A, N>>) -> Result<(), CycleError>
where
    S: StateStore,
    A: Actuator,
    N: Announcer,
{
    almanac.run_water_tick(Utc::now()).await?;
    Ok(())
}
