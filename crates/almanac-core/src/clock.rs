//! Season clock and the season cycle.
//!
//! [`SeasonClock`] is pure: given a persisted record (or none) and `now`,
//! it says which season is active and whether a boundary has passed.
//! [`SeasonCycle`] owns the in-memory copy of the active season and is the
//! only writer of `last_season` in the state document.
//!
//! # Design Principles
//!
//! - Elapsed time is counted in whole days since the season's start.
//! - A rotation is persisted before it is reported or announced, so a
//!   failed write leaves the old season in place and the next check
//!   retries. A season never advances twice for one boundary.
//! - Every mutation (scheduled or manual) holds the cycle lock for the whole
//!   read-decide-persist sequence.

use almanac_store::{RecordStore, StateStore};
use almanac_types::{Season, SeasonRecord};
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use tokio::sync::Mutex;

use crate::config::{CatchUpPolicy, ChannelConfig, SeasonConfig};
use crate::error::CycleError;
use crate::narrator::{Narrator, announced_season};
use crate::ports::Announcer;

/// Errors that can occur while building the season clock.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Invalid season configuration (e.g. zero-day seasons).
    #[error("invalid season configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// The season that should be active for a given record and instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// The season and its start.
    pub record: SeasonRecord,
    /// Rotation steps taken from the input record (0 when still current).
    pub steps: u64,
}

/// Pure season arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonClock {
    length: TimeDelta,
    rotation_start: DateTime<Utc>,
    catch_up: CatchUpPolicy,
}

impl SeasonClock {
    /// Build a clock from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if the season length is zero or
    /// out of range.
    pub fn new(config: &SeasonConfig) -> Result<Self, ClockError> {
        let length = config.length().map_err(|e| ClockError::InvalidConfig {
            reason: e.to_string(),
        })?;
        Ok(Self {
            length,
            rotation_start: config.rotation_start,
            catch_up: config.catch_up,
        })
    }

    /// Length of one season.
    pub const fn length(&self) -> TimeDelta {
        self.length
    }

    /// Catch-up policy after long outages.
    pub const fn catch_up(&self) -> CatchUpPolicy {
        self.catch_up
    }

    /// The record assumed when nothing is persisted: the first season of
    /// the rotation, starting at the configured anchor.
    pub const fn epoch(&self) -> SeasonRecord {
        SeasonRecord::new(Season::from_index(0), self.rotation_start)
    }

    /// Number of whole season lengths elapsed since `record` started.
    ///
    /// Zero if `now` lies before the start.
    pub fn elapsed_seasons(&self, record: &SeasonRecord, now: DateTime<Utc>) -> u64 {
        let elapsed_days = now.signed_duration_since(record.start).num_days();
        elapsed_days
            .checked_div(self.length.num_days())
            .and_then(|n| u64::try_from(n).ok())
            .unwrap_or(0)
    }

    /// Resolve which season is active at `now`.
    ///
    /// A boundary restarts the season clock at `now` rather than at the
    /// nominal boundary instant. With [`CatchUpPolicy::OneStep`] exactly one
    /// step is taken however long ago the boundary was; with
    /// [`CatchUpPolicy::Jump`] every elapsed length counts.
    pub fn resolve(&self, persisted: Option<&SeasonRecord>, now: DateTime<Utc>) -> Resolution {
        let base = persisted.copied().unwrap_or_else(|| self.epoch());
        let due = self.elapsed_seasons(&base, now);
        if due == 0 {
            return Resolution {
                record: base,
                steps: 0,
            };
        }

        let steps = match self.catch_up {
            CatchUpPolicy::OneStep => 1,
            CatchUpPolicy::Jump => due,
        };
        Resolution {
            record: SeasonRecord::new(base.season.advance_by(steps), now),
            steps,
        }
    }

    /// The active season at `now`. Pure; persists nothing.
    pub fn current_season(&self, persisted: Option<&SeasonRecord>, now: DateTime<Utc>) -> SeasonRecord {
        self.resolve(persisted, now).record
    }

    /// When `record`'s season is scheduled to end.
    pub fn season_end(&self, record: &SeasonRecord) -> Option<DateTime<Utc>> {
        record.end(self.length)
    }
}

/// Result of a season check or a manual season change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonChange {
    /// Whether a new record was persisted.
    pub changed: bool,
    /// The season before the change, if one was known.
    pub previous: Option<Season>,
    /// The active season after the operation.
    pub record: SeasonRecord,
}

/// What happened to a season announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Announcement {
    /// Narrative and bulletin were posted.
    Posted,
    /// The channel already shows this season; nothing was posted.
    Duplicate,
    /// Posting failed. The season change itself stands.
    Failed,
}

/// Owner of the active season.
pub struct SeasonCycle {
    clock: SeasonClock,
    active: Mutex<Option<SeasonRecord>>,
}

impl SeasonCycle {
    /// A cycle with nothing loaded yet.
    pub fn new(clock: SeasonClock) -> Self {
        Self {
            clock,
            active: Mutex::new(None),
        }
    }

    /// The underlying clock.
    pub const fn clock(&self) -> &SeasonClock {
        &self.clock
    }

    /// Restore the record loaded at startup.
    pub async fn hydrate(&self, record: Option<SeasonRecord>) {
        *self.active.lock().await = record;
    }

    /// The last persisted season, or the epoch default before anything
    /// was persisted. Never rotates on its own; only
    /// [`SeasonCycle::check_and_advance`] does.
    pub async fn current(&self) -> SeasonRecord {
        self.active.lock().await.unwrap_or_else(|| self.clock.epoch())
    }

    /// Rotate if the active season has run its length.
    ///
    /// Reads the persisted record. If none exists, the first season of the
    /// rotation starts at `now`. The new record is persisted before the
    /// in-memory copy changes.
    ///
    /// # Errors
    ///
    /// [`CycleError::StoreUnavailable`] if the record cannot be read or
    /// written. Nothing changes in that case.
    pub async fn check_and_advance<S: StateStore>(
        &self,
        store: &RecordStore<S>,
        now: DateTime<Utc>,
    ) -> Result<SeasonChange, CycleError> {
        let mut active = self.active.lock().await;
        let persisted = store.load().await?.last_season;

        let Some(current) = persisted else {
            let record = SeasonRecord::new(Season::from_index(0), now);
            store.update(|r| r.last_season = Some(record)).await?;
            *active = Some(record);
            tracing::info!(season = %record.season, "Season rotation initialized");
            return Ok(SeasonChange {
                changed: true,
                previous: None,
                record,
            });
        };

        let resolution = self.clock.resolve(Some(&current), now);
        if resolution.steps == 0 {
            *active = Some(current);
            return Ok(SeasonChange {
                changed: false,
                previous: Some(current.season),
                record: current,
            });
        }

        let record = resolution.record;
        store.update(|r| r.last_season = Some(record)).await?;
        *active = Some(record);
        tracing::info!(
            from = %current.season,
            to = %record.season,
            steps = resolution.steps,
            "Season advanced"
        );
        Ok(SeasonChange {
            changed: true,
            previous: Some(current.season),
            record,
        })
    }

    /// Force the named season, starting at `now`.
    ///
    /// # Errors
    ///
    /// [`CycleError::InvalidSeason`] if `name` is not in the rotation,
    /// [`CycleError::StoreUnavailable`] if the change cannot be persisted.
    pub async fn manual_set<S: StateStore>(
        &self,
        store: &RecordStore<S>,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<SeasonChange, CycleError> {
        let season: Season = name.parse()?;
        self.replace(store, SeasonRecord::new(season, now)).await
    }

    /// Rotate one step immediately, starting the next season at `now`.
    ///
    /// # Errors
    ///
    /// [`CycleError::StoreUnavailable`] if the change cannot be persisted.
    pub async fn advance<S: StateStore>(
        &self,
        store: &RecordStore<S>,
        now: DateTime<Utc>,
    ) -> Result<SeasonChange, CycleError> {
        let mut active = self.active.lock().await;
        let current = match *active {
            Some(record) => record,
            None => store
                .load()
                .await?
                .last_season
                .unwrap_or_else(|| self.clock.epoch()),
        };
        let record = SeasonRecord::new(current.season.next(), now);
        store.update(|r| r.last_season = Some(record)).await?;
        *active = Some(record);
        tracing::info!(from = %current.season, to = %record.season, "Season advanced manually");
        Ok(SeasonChange {
            changed: true,
            previous: Some(current.season),
            record,
        })
    }

    /// Restart the rotation at its first season, starting at `now`
    /// truncated to the hour.
    ///
    /// # Errors
    ///
    /// [`CycleError::StoreUnavailable`] if the change cannot be persisted.
    pub async fn reset<S: StateStore>(
        &self,
        store: &RecordStore<S>,
        now: DateTime<Utc>,
    ) -> Result<SeasonChange, CycleError> {
        let start = now.duration_trunc(TimeDelta::hours(1)).unwrap_or(now);
        self.replace(store, SeasonRecord::new(Season::from_index(0), start))
            .await
    }

    async fn replace<S: StateStore>(
        &self,
        store: &RecordStore<S>,
        record: SeasonRecord,
    ) -> Result<SeasonChange, CycleError> {
        let mut active = self.active.lock().await;
        let previous = active.map(|r| r.season);
        store.update(|r| r.last_season = Some(record)).await?;
        *active = Some(record);
        tracing::info!(season = %record.season, start = %record.start, "Season set");
        Ok(SeasonChange {
            changed: true,
            previous,
            record,
        })
    }

    /// Post the narrative and bulletin for `record`.
    ///
    /// Unless `force` is set, the season channel's recent messages are
    /// inspected first and nothing is posted if the newest season
    /// announcement already names this season. This is best-effort: if the
    /// history cannot be read the announcement goes out anyway.
    ///
    /// # Errors
    ///
    /// [`CycleError::Template`] if rendering fails. Announcer failures are
    /// logged and reported as [`Announcement::Failed`].
    pub async fn announce<N: Announcer>(
        &self,
        record: &SeasonRecord,
        narrator: &Narrator,
        announcer: &N,
        channels: &ChannelConfig,
        force: bool,
    ) -> Result<Announcement, CycleError> {
        if !force {
            match announcer
                .recent_messages(channels.season, channels.dedupe_lookback)
                .await
            {
                Ok(recent) => {
                    let latest = recent.iter().find_map(|m| announced_season(m));
                    if latest == Some(record.season) {
                        tracing::info!(season = %record.season, "Season already announced, skipping");
                        return Ok(Announcement::Duplicate);
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        channel = %channels.season,
                        "Could not read recent season messages, announcing anyway"
                    );
                }
            }
        }

        let narrative = narrator.season_narrative(record, self.clock.season_end(record))?;
        let bulletin = narrator.season_bulletin(record.season)?;

        if let Err(e) = announcer.send(channels.season, &narrative).await {
            tracing::warn!(error = %e, channel = %channels.season, "Season narrative not posted");
            return Ok(Announcement::Failed);
        }
        if let Err(e) = announcer.send(channels.announcements, &bulletin).await {
            tracing::warn!(error = %e, channel = %channels.announcements, "Season bulletin not posted");
            return Ok(Announcement::Failed);
        }

        tracing::info!(season = %record.season, "Season announced");
        Ok(Announcement::Posted)
    }
}
