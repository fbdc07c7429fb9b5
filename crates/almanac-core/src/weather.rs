//! Weather cycle.
//!
//! [`WeatherRules`] is the pure selection function: season options, the
//! growth-season heavy streak filter, and the recovery-season rain
//! cooldown with its two-stage draw. [`WeatherCycle`] owns the history and
//! the RNG and runs one tick at a time.
//!
//! # Tick order
//!
//! 1. Clear an expired pause, then skip the tick if still paused.
//! 2. Draw a value for the active season.
//! 3. Persist reading and history. A store failure aborts here and nothing
//!    is dispatched or announced.
//! 4. Send the actuator command. Failure is logged; the reading stands.
//! 5. Announce the flavor text. Failure is logged.

use std::collections::BTreeMap;

use almanac_store::{RecordStore, StateStore};
use almanac_types::{Season, Weather, WeatherHistory, WeatherReading};
use chrono::{DateTime, TimeDelta, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;

use crate::config::{ChannelConfig, ConfigError, WeatherConfig};
use crate::error::CycleError;
use crate::narrator::Narrator;
use crate::pause::PauseController;
use crate::ports::{Actuator, Announcer};

/// Season phase whose rain streak is capped.
const GROWTH_SEASON: Season = Season::from_index(0);

/// Season phase whose rain is rate-limited.
const RECOVERY_SEASON: Season = Season::from_index(2);

/// Options for a season missing from the table.
const FALLBACK_OPTIONS: &[Weather] = &[Weather::ClearSky];

/// Selection constraints.
#[derive(Debug, Clone)]
pub struct WeatherRules {
    options: BTreeMap<Season, Vec<Weather>>,
    heavy_streak_limit: u32,
    rain_cooldown: TimeDelta,
    rain_probability: f64,
    history_len: usize,
}

impl WeatherRules {
    /// Build from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the rain cooldown is out of range.
    pub fn from_config(config: &WeatherConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            options: config.options.clone(),
            heavy_streak_limit: config.heavy_streak_limit,
            rain_cooldown: config.rain_cooldown()?,
            rain_probability: config.rain_probability,
            history_len: config.history_len,
        })
    }

    /// Every value `season` may ever produce.
    pub fn options_for(&self, season: Season) -> &[Weather] {
        self.options
            .get(&season)
            .map_or(FALLBACK_OPTIONS, Vec::as_slice)
    }

    /// Number of past selections kept.
    pub const fn history_len(&self) -> usize {
        self.history_len
    }

    /// Candidates for a uniform draw, after history filters.
    ///
    /// For the recovery season this is the set drawn from once the rain
    /// trial has failed, so it never contains rain.
    pub fn candidates(&self, season: Season, history: &WeatherHistory) -> Vec<Weather> {
        let options = self.options_for(season);
        if season == GROWTH_SEASON && history.heavy_streak >= self.heavy_streak_limit {
            return options.iter().copied().filter(|w| !w.is_heavy()).collect();
        }
        if season == RECOVERY_SEASON {
            return options.iter().copied().filter(|w| *w != Weather::Rain).collect();
        }
        options.to_vec()
    }

    /// Whether rain may be forced in the recovery season at `now`.
    pub fn rain_eligible(&self, season: Season, history: &WeatherHistory, now: DateTime<Utc>) -> bool {
        if season != RECOVERY_SEASON || !self.options_for(season).contains(&Weather::Rain) {
            return false;
        }
        history.last_rain_at.is_none_or(|last| {
            now.signed_duration_since(last) >= self.rain_cooldown
        })
    }

    /// Choose the next weather value.
    ///
    /// An empty candidate set falls back to the season's full option list.
    pub fn choose<R: Rng + ?Sized>(
        &self,
        season: Season,
        history: &WeatherHistory,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Weather {
        if self.rain_eligible(season, history, now) && rng.random_bool(self.rain_probability) {
            return Weather::Rain;
        }

        let candidates = self.candidates(season, history);
        if let Some(choice) = candidates.choose(rng) {
            return *choice;
        }
        self.options_for(season)
            .choose(rng)
            .copied()
            .unwrap_or(Weather::ClearSky)
    }
}

/// What a weather tick did.
#[derive(Debug)]
pub enum WeatherOutcome {
    /// Suppressed by an active pause.
    Paused {
        /// When the pause ends.
        until: DateTime<Utc>,
    },
    /// A value was chosen and persisted.
    Applied {
        /// The new reading.
        reading: WeatherReading,
        /// Why the actuator did not apply the command, if it did not.
        dispatch_error: Option<CycleError>,
        /// Why the flavor text was not posted, if it was not.
        announce_error: Option<CycleError>,
    },
}

impl WeatherOutcome {
    /// Collaborator failures recorded by an applied tick.
    pub fn failures(&self) -> impl Iterator<Item = &CycleError> {
        match self {
            Self::Paused { .. } => [None, None],
            Self::Applied {
                dispatch_error,
                announce_error,
                ..
            } => [dispatch_error.as_ref(), announce_error.as_ref()],
        }
        .into_iter()
        .flatten()
    }
}

/// Collaborators a weather tick reaches.
pub struct WeatherTick<'a, S, A, N> {
    /// Durable state.
    pub store: &'a RecordStore<S>,
    /// Pause deadline owner.
    pub pause: &'a PauseController,
    /// Game server.
    pub actuator: &'a A,
    /// Chat platform.
    pub announcer: &'a N,
    /// Message renderer.
    pub narrator: &'a Narrator,
    /// Channel routing.
    pub channels: &'a ChannelConfig,
}

struct WeatherState {
    history: WeatherHistory,
    current: Option<WeatherReading>,
}

/// Owner of the weather history.
pub struct WeatherCycle {
    rules: WeatherRules,
    command_template: String,
    state: Mutex<WeatherState>,
    rng: Mutex<StdRng>,
}

impl WeatherCycle {
    /// Build from configuration. A configured seed makes draws repeatable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the rules are out of range.
    pub fn new(config: &WeatherConfig) -> Result<Self, ConfigError> {
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Ok(Self {
            rules: WeatherRules::from_config(config)?,
            command_template: config.command.clone(),
            state: Mutex::new(WeatherState {
                history: WeatherHistory::default(),
                current: None,
            }),
            rng: Mutex::new(rng),
        })
    }

    /// The selection rules.
    pub const fn rules(&self) -> &WeatherRules {
        &self.rules
    }

    /// Restore history and last reading loaded at startup.
    pub async fn hydrate(&self, history: WeatherHistory, current: Option<WeatherReading>) {
        let mut state = self.state.lock().await;
        state.history = history;
        state.current = current;
    }

    /// The last chosen reading.
    pub async fn current(&self) -> Option<WeatherReading> {
        self.state.lock().await.current
    }

    /// Recent selections and streak counters.
    pub async fn history(&self) -> WeatherHistory {
        self.state.lock().await.history.clone()
    }

    /// Render the actuator command for `weather`.
    pub fn command_for(&self, weather: Weather) -> String {
        self.command_template.replace("{weather}", weather.token())
    }

    /// Run one tick for `season` at `now`.
    ///
    /// Overlapping calls run one after the other.
    ///
    /// # Errors
    ///
    /// [`CycleError::StoreUnavailable`] if the pause expiry or the new
    /// reading cannot be persisted; nothing is dispatched in that case.
    /// [`CycleError::Template`] if the flavor text fails to render, after
    /// the reading was persisted and dispatched.
    pub async fn tick<S, A, N>(
        &self,
        ctx: &WeatherTick<'_, S, A, N>,
        season: Season,
        now: DateTime<Utc>,
    ) -> Result<WeatherOutcome, CycleError>
    where
        S: StateStore,
        A: Actuator,
        N: Announcer,
    {
        let mut state = self.state.lock().await;

        ctx.pause.observe_expiry(ctx.store, now).await?;
        if let Some(until) = ctx.pause.state().await.paused_until.filter(|u| *u > now) {
            tracing::debug!(until = %until, "Weather paused, skipping tick");
            return Ok(WeatherOutcome::Paused { until });
        }

        let weather = {
            let mut rng = self.rng.lock().await;
            self.rules.choose(season, &state.history, now, &mut *rng)
        };
        let reading = WeatherReading {
            weather,
            set_at: now,
        };
        let mut history = state.history.clone();
        history.record(weather, now, self.rules.history_len());

        let persisted_history = history.clone();
        ctx.store
            .update(move |r| {
                r.last_weather = Some(reading);
                r.weather_history = persisted_history;
            })
            .await?;
        state.history = history;
        state.current = Some(reading);

        let command = self.command_for(weather);
        let dispatch_error = match ctx.actuator.send_command(&command).await {
            Ok(reply) if reply.success => None,
            Ok(reply) => {
                let error = CycleError::rejected(&command, reply.response.as_deref());
                tracing::warn!(error = %error, "Weather command rejected");
                Some(error)
            }
            Err(e) => {
                let error = CycleError::actuator(&command, &e);
                tracing::warn!(error = %error, "Weather command failed");
                Some(error)
            }
        };

        let text = ctx.narrator.weather(&reading, season)?;
        let channel = ctx.channels.weather_updates;
        let announce_error = match ctx.announcer.send(channel, &text).await {
            Ok(()) => None,
            Err(e) => {
                let error = CycleError::announcer(channel, e);
                tracing::warn!(error = %error, "Weather update not posted");
                Some(error)
            }
        };

        tracing::info!(
            season = %season,
            weather = %weather,
            dispatched = dispatch_error.is_none(),
            announced = announce_error.is_none(),
            "Weather updated"
        );
        Ok(WeatherOutcome::Applied {
            reading,
            dispatch_error,
            announce_error,
        })
    }
}
