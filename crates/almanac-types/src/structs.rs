//! Records shared between the scheduler, the store and the operator API.
//!
//! [`PersistedRecord`] is the single durable document. Everything else is a
//! projection of one of its logical fields.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Season, Weather};

// ---------------------------------------------------------------------------
// Season record
// ---------------------------------------------------------------------------

/// The active season and the instant it began.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SeasonRecord {
    /// The active season.
    pub season: Season,
    /// When the season started (UTC).
    pub start: DateTime<Utc>,
}

impl SeasonRecord {
    /// Create a record for `season` starting at `start`.
    pub const fn new(season: Season, start: DateTime<Utc>) -> Self {
        Self { season, start }
    }

    /// The instant this season is scheduled to end, given the season length.
    ///
    /// Returns `None` only if the addition leaves chrono's representable range.
    pub fn end(&self, length: TimeDelta) -> Option<DateTime<Utc>> {
        self.start.checked_add_signed(length)
    }
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// The currently applied weather value and when it was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WeatherReading {
    /// The chosen weather.
    pub weather: Weather,
    /// When it was chosen.
    pub set_at: DateTime<Utc>,
}

/// Short-term weather memory used for anti-repeat constraints.
///
/// Holds the most recent selections (oldest first), the number of
/// consecutive heavy selections, and the last time rain was chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WeatherHistory {
    /// Most recent selections, oldest first.
    #[serde(default)]
    pub recent: Vec<Weather>,
    /// Consecutive heavy selections ending at the latest one.
    #[serde(default)]
    pub heavy_streak: u32,
    /// Last time [`Weather::Rain`] was selected.
    #[serde(default)]
    pub last_rain_at: Option<DateTime<Utc>>,
}

impl WeatherHistory {
    /// Record a new selection, keeping at most `capacity` entries.
    pub fn record(&mut self, weather: Weather, at: DateTime<Utc>, capacity: usize) {
        self.recent.push(weather);
        let excess = self.recent.len().saturating_sub(capacity.max(1));
        if excess > 0 {
            self.recent.drain(..excess);
        }

        self.heavy_streak = if weather.is_heavy() {
            self.heavy_streak.saturating_add(1)
        } else {
            0
        };

        if weather == Weather::Rain {
            self.last_rain_at = Some(at);
        }
    }
}

// ---------------------------------------------------------------------------
// Pause
// ---------------------------------------------------------------------------

/// Weather suspension deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PauseState {
    /// Weather ticks are skipped while this instant lies in the future.
    pub paused_until: Option<DateTime<Utc>>,
}

impl PauseState {
    /// True iff a deadline is set and lies strictly after `now`.
    pub fn is_paused(&self, now: DateTime<Utc>) -> bool {
        self.paused_until.is_some_and(|until| until > now)
    }

    /// True iff a deadline is set but has already passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.paused_until.is_some_and(|until| until <= now)
    }
}

// ---------------------------------------------------------------------------
// Persisted document
// ---------------------------------------------------------------------------

/// The single durable document owned by the state store.
///
/// Every mutation is a read-modify-write of the whole record. Missing fields
/// deserialize to their empty state so older documents keep loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRecord {
    /// Last known season and its start.
    #[serde(default)]
    pub last_season: Option<SeasonRecord>,
    /// Last weather the scheduler intended to apply.
    #[serde(default)]
    pub last_weather: Option<WeatherReading>,
    /// Weather pause deadline.
    #[serde(default)]
    pub paused_until: Option<DateTime<Utc>>,
    /// Anti-repeat history, persisted for fidelity across restarts.
    #[serde(default)]
    pub weather_history: WeatherHistory,
}

impl PersistedRecord {
    /// The pause deadline as a [`PauseState`].
    pub const fn pause(&self) -> PauseState {
        PauseState {
            paused_until: self.paused_until,
        }
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Snapshot returned by the `current_status` admin operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StatusReport {
    /// The active season and when it started.
    pub season: SeasonRecord,
    /// When the active season is scheduled to end.
    pub season_ends_at: Option<DateTime<Utc>>,
    /// The last weather the scheduler chose, if any.
    pub weather: Option<WeatherReading>,
    /// The pause deadline.
    pub pause: PauseState,
    /// Whether weather ticks are currently suppressed.
    pub paused: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 9, hour, 0, 0).unwrap()
    }

    #[test]
    fn history_tracks_heavy_streak() {
        let mut history = WeatherHistory::default();
        history.record(Weather::Rain, at(1), 8);
        assert_eq!(history.heavy_streak, 1);
        history.record(Weather::Storm, at(2), 8);
        assert_eq!(history.heavy_streak, 2);
        history.record(Weather::Fog, at(3), 8);
        assert_eq!(history.heavy_streak, 0);
        assert_eq!(history.recent.last(), Some(&Weather::Fog));
    }

    #[test]
    fn history_is_bounded() {
        let mut history = WeatherHistory::default();
        for hour in 0..10 {
            history.record(Weather::Cloudy, at(hour), 3);
        }
        history.record(Weather::Snow, at(11), 3);
        assert_eq!(
            history.recent,
            vec![Weather::Cloudy, Weather::Cloudy, Weather::Snow]
        );
    }

    #[test]
    fn history_remembers_last_rain() {
        let mut history = WeatherHistory::default();
        history.record(Weather::Rain, at(4), 8);
        history.record(Weather::Cloudy, at(5), 8);
        assert_eq!(history.last_rain_at, Some(at(4)));
    }

    #[test]
    fn pause_is_strictly_before_deadline() {
        let pause = PauseState {
            paused_until: Some(at(10)),
        };
        assert!(pause.is_paused(at(9)));
        assert!(!pause.is_paused(at(10)));
        assert!(pause.is_expired(at(10)));
        assert!(!PauseState::default().is_paused(at(9)));
    }

    #[test]
    fn empty_document_deserializes() {
        let record: PersistedRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record, PersistedRecord::default());
    }

    #[test]
    fn document_layout_uses_logical_field_names() {
        let record = PersistedRecord {
            last_season: Some(SeasonRecord::new(Season::Drought, at(12))),
            last_weather: Some(WeatherReading {
                weather: Weather::ClearSky,
                set_at: at(13),
            }),
            paused_until: None,
            weather_history: WeatherHistory::default(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["last_season"]["season"], "drought");
        assert_eq!(json["last_weather"]["weather"], "clearsky");
        assert!(json["paused_until"].is_null());
    }

    #[test]
    fn season_end_adds_length() {
        let record = SeasonRecord::new(Season::Blooming, at(0));
        let end = record.end(TimeDelta::days(14)).unwrap();
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 4, 23, 0, 0, 0).unwrap());
    }
}
