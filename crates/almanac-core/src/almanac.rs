//! The scheduler facade and its administrative operations.
//!
//! [`Almanac`] wires the four cycles to one state document, one actuator
//! and one announcer. Scheduled loops and the operator API both go through
//! it; nothing else touches the cycles directly.
//!
//! [`AdminOps`] is the surface an external command layer may call.
//! Administrative operations return failures to the caller; the same
//! operations run by the scheduler only log them.

use std::future::Future;

use almanac_store::{RecordStore, StateStore};
use almanac_types::{PersistedRecord, StatusReport};
use chrono::{DateTime, TimeDelta, Utc};

use crate::clock::{Announcement, SeasonChange, SeasonClock, SeasonCycle};
use crate::config::{AlmanacConfig, ChannelConfig};
use crate::error::CycleError;
use crate::narrator::Narrator;
use crate::pause::PauseController;
use crate::ports::{Actuator, Announcer};
use crate::water::{WaterCycle, WaterReport};
use crate::weather::{WeatherCycle, WeatherOutcome, WeatherTick};

/// Operations exposed to the external command layer.
pub trait AdminOps: Send + Sync {
    /// Rotate the season if its length has elapsed, announcing a change.
    fn check_and_advance(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<SeasonChange, CycleError>> + Send;

    /// Force the named season, starting at `now`.
    fn manual_set_season(
        &self,
        name: &str,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<SeasonChange, CycleError>> + Send;

    /// Rotate one step immediately.
    fn advance_season(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<SeasonChange, CycleError>> + Send;

    /// Restart the rotation at its first season.
    fn reset_seasons(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<SeasonChange, CycleError>> + Send;

    /// Suspend weather ticks for `duration`, or the configured default.
    fn pause_weather(
        &self,
        duration: Option<TimeDelta>,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<DateTime<Utc>, CycleError>> + Send;

    /// Clear any weather suspension. Returns the deadline that was cleared.
    fn resume_weather(
        &self,
    ) -> impl Future<Output = Result<Option<DateTime<Utc>>, CycleError>> + Send;

    /// Run a weather tick now.
    fn run_weather_tick(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<WeatherOutcome, CycleError>> + Send;

    /// Run a water quality tick now.
    fn run_water_tick(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<WaterReport, CycleError>> + Send;

    /// Season, weather and pause state as of `now`.
    fn current_status(&self, now: DateTime<Utc>) -> impl Future<Output = StatusReport> + Send;
}

/// The environmental state scheduler.
pub struct Almanac<S, A, N> {
    store: RecordStore<S>,
    actuator: A,
    announcer: N,
    seasons: SeasonCycle,
    weather: WeatherCycle,
    water: WaterCycle,
    pause: PauseController,
    narrator: Narrator,
    channels: ChannelConfig,
}

impl<S, A, N> Almanac<S, A, N>
where
    S: StateStore,
    A: Actuator,
    N: Announcer,
{
    /// Build every cycle from configuration.
    ///
    /// Nothing is loaded yet; call [`Almanac::bootstrap`] before the first
    /// tick.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::Clock`], [`CycleError::Config`] or
    /// [`CycleError::Template`] if the configuration cannot be used.
    pub fn new(config: &AlmanacConfig, store: S, actuator: A, announcer: N) -> Result<Self, CycleError> {
        Ok(Self {
            store: RecordStore::new(store),
            actuator,
            announcer,
            seasons: SeasonCycle::new(SeasonClock::new(&config.seasons)?),
            weather: WeatherCycle::new(&config.weather)?,
            water: WaterCycle::new(&config.water),
            pause: PauseController::new(config.pause.default_duration()?),
            narrator: Narrator::new(&config.weather)?,
            channels: config.channels.clone(),
        })
    }

    /// The state document writer.
    pub const fn store(&self) -> &RecordStore<S> {
        &self.store
    }

    /// The actuator adapter.
    pub const fn actuator(&self) -> &A {
        &self.actuator
    }

    /// The announcer adapter.
    pub const fn announcer(&self) -> &N {
        &self.announcer
    }

    /// The season cycle.
    pub const fn seasons(&self) -> &SeasonCycle {
        &self.seasons
    }

    /// The weather cycle.
    pub const fn weather(&self) -> &WeatherCycle {
        &self.weather
    }

    /// The water quality cycle.
    pub const fn water(&self) -> &WaterCycle {
        &self.water
    }

    /// The pause controller.
    pub const fn pause(&self) -> &PauseController {
        &self.pause
    }

    /// Channel routing.
    pub const fn channels(&self) -> &ChannelConfig {
        &self.channels
    }

    /// Load the state document into every cycle.
    ///
    /// # Errors
    ///
    /// [`CycleError::StoreUnavailable`] if the document cannot be read.
    pub async fn bootstrap(&self) -> Result<PersistedRecord, CycleError> {
        let record = self.store.load().await?;
        self.seasons.hydrate(record.last_season).await;
        self.weather
            .hydrate(record.weather_history.clone(), record.last_weather)
            .await;
        self.pause.hydrate(record.pause()).await;

        tracing::info!(
            store = self.store.backend().name(),
            season = ?record.last_season.map(|s| s.season),
            weather = ?record.last_weather.map(|w| w.weather),
            paused_until = ?record.paused_until,
            "State loaded"
        );
        Ok(record)
    }

    /// Announce the active season unless the channel already shows it.
    ///
    /// # Errors
    ///
    /// [`CycleError::Template`] if rendering fails.
    pub async fn announce_active_season(&self) -> Result<Announcement, CycleError> {
        let record = self.seasons.current().await;
        self.seasons
            .announce(&record, &self.narrator, &self.announcer, &self.channels, false)
            .await
    }

    /// Post a scheduled-tick failure to the operations channel, if enabled.
    pub async fn report_failure(&self, task: &str, error: &CycleError) {
        if self.channels.report_tick_failures {
            self.post_ops(&Narrator::ops_tick_failed(task, error)).await;
        }
    }

    async fn post_ops(&self, text: &str) {
        if let Err(e) = self.announcer.send(self.channels.operations, text).await {
            tracing::warn!(error = %e, channel = %self.channels.operations, "Operations log not posted");
        }
    }

    async fn announce_change(&self, change: &SeasonChange, force: bool) {
        match self
            .seasons
            .announce(&change.record, &self.narrator, &self.announcer, &self.channels, force)
            .await
        {
            Ok(outcome) => {
                tracing::debug!(season = %change.record.season, ?outcome, "Season announcement");
            }
            Err(e) => {
                tracing::warn!(season = %change.record.season, error = %e, "Season announcement failed");
            }
        }
    }

    fn weather_tick(&self) -> WeatherTick<'_, S, A, N> {
        WeatherTick {
            store: &self.store,
            pause: &self.pause,
            actuator: &self.actuator,
            announcer: &self.announcer,
            narrator: &self.narrator,
            channels: &self.channels,
        }
    }
}

impl<S, A, N> AdminOps for Almanac<S, A, N>
where
    S: StateStore,
    A: Actuator,
    N: Announcer,
{
    async fn check_and_advance(&self, now: DateTime<Utc>) -> Result<SeasonChange, CycleError> {
        let change = self.seasons.check_and_advance(&self.store, now).await?;
        if change.changed {
            self.announce_change(&change, false).await;
        }
        Ok(change)
    }

    async fn manual_set_season(
        &self,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<SeasonChange, CycleError> {
        let change = self.seasons.manual_set(&self.store, name, now).await?;
        self.announce_change(&change, true).await;
        self.post_ops(&Narrator::ops_season_set(&change.record)).await;
        Ok(change)
    }

    async fn advance_season(&self, now: DateTime<Utc>) -> Result<SeasonChange, CycleError> {
        let change = self.seasons.advance(&self.store, now).await?;
        self.announce_change(&change, true).await;
        self.post_ops(&Narrator::ops_season_advanced(&change.record)).await;
        Ok(change)
    }

    async fn reset_seasons(&self, now: DateTime<Utc>) -> Result<SeasonChange, CycleError> {
        let change = self.seasons.reset(&self.store, now).await?;
        self.announce_change(&change, true).await;
        self.post_ops(&Narrator::ops_season_reset(&change.record)).await;
        Ok(change)
    }

    async fn pause_weather(
        &self,
        duration: Option<TimeDelta>,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, CycleError> {
        let duration = duration.unwrap_or_else(|| self.pause.default_duration());
        let until = self.pause.pause_for(&self.store, duration, now).await?;
        self.post_ops(&Narrator::ops_paused(until)).await;
        Ok(until)
    }

    async fn resume_weather(&self) -> Result<Option<DateTime<Utc>>, CycleError> {
        let previous = self.pause.resume(&self.store).await?;
        self.post_ops(&Narrator::ops_resumed()).await;
        Ok(previous)
    }

    async fn run_weather_tick(&self, now: DateTime<Utc>) -> Result<WeatherOutcome, CycleError> {
        let season = self.seasons.current().await.season;
        self.weather.tick(&self.weather_tick(), season, now).await
    }

    async fn run_water_tick(&self, _now: DateTime<Utc>) -> Result<WaterReport, CycleError> {
        let season = self.seasons.current().await.season;
        let report = self.water.tick(season, &self.actuator).await;
        if !report.is_noop() {
            self.post_ops(&Narrator::ops_water(
                season,
                report.applied.len(),
                report.failed.len(),
            ))
            .await;
        }
        Ok(report)
    }

    async fn current_status(&self, now: DateTime<Utc>) -> StatusReport {
        let season = self.seasons.current().await;
        let pause = self.pause.state().await;
        StatusReport {
            season,
            season_ends_at: self.seasons.clock().season_end(&season),
            weather: self.weather.current().await,
            pause,
            paused: pause.is_paused(now),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use almanac_store::MemoryStore;
    use almanac_types::{Season, SeasonRecord};
    use chrono::TimeZone;

    use super::*;
    use crate::ports::{RecordingActuator, RecordingAnnouncer};

    type TestAlmanac = Almanac<MemoryStore, RecordingActuator, RecordingAnnouncer>;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 9, 12, 0, 0).unwrap()
    }

    fn almanac() -> TestAlmanac {
        Almanac::new(
            &AlmanacConfig::default(),
            MemoryStore::new(),
            RecordingActuator::new(),
            RecordingAnnouncer::new(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn status_before_bootstrap_uses_epoch() {
        let almanac = almanac();
        let status = almanac.current_status(t0()).await;
        assert_eq!(status.season, SeasonRecord::new(Season::Blooming, t0()));
        assert_eq!(status.season_ends_at, Some(t0() + TimeDelta::days(14)));
        assert!(!status.paused);
        assert_eq!(status.weather, None);
    }

    #[tokio::test]
    async fn manual_set_announces_and_logs() {
        let almanac = almanac();
        almanac.manual_set_season("drought", t0()).await.unwrap();

        let channels = almanac.channels().clone();
        let season_posts = almanac.announcer().messages_in(channels.season).await;
        assert_eq!(season_posts.len(), 1);
        assert!(season_posts.first().unwrap().contains("The Drought has arrived"));
        let ops = almanac.announcer().messages_in(channels.operations).await;
        assert!(ops.first().unwrap().contains("Season set to The Drought"));
    }

    #[tokio::test]
    async fn pause_defaults_to_four_hours() {
        let almanac = almanac();
        let until = almanac.pause_weather(None, t0()).await.unwrap();
        assert_eq!(until, t0() + TimeDelta::hours(4));
        assert!(almanac.current_status(t0() + TimeDelta::hours(1)).await.paused);

        almanac.resume_weather().await.unwrap();
        assert!(!almanac.current_status(t0() + TimeDelta::hours(1)).await.paused);
    }

    #[tokio::test]
    async fn water_tick_posts_summary() {
        let almanac = almanac();
        almanac.manual_set_season("the drought", t0()).await.unwrap();

        let report = almanac.run_water_tick(t0()).await.unwrap();
        assert_eq!(report.applied.len(), 54);
        let ops = almanac
            .announcer()
            .messages_in(almanac.channels().operations)
            .await;
        assert!(ops.iter().any(|m| m.contains("Applied 54 water quality updates")));
    }

    #[tokio::test]
    async fn bootstrap_restores_persisted_state() {
        let record = PersistedRecord {
            last_season: Some(SeasonRecord::new(Season::Freeze, t0())),
            paused_until: Some(t0() + TimeDelta::hours(2)),
            ..PersistedRecord::default()
        };
        let almanac = Almanac::new(
            &AlmanacConfig::default(),
            MemoryStore::with_record(record),
            RecordingActuator::new(),
            RecordingAnnouncer::new(),
        )
        .unwrap();
        almanac.bootstrap().await.unwrap();

        let status = almanac.current_status(t0()).await;
        assert_eq!(status.season.season, Season::Freeze);
        assert!(status.paused);
    }
}
