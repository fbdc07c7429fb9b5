//! Configuration loading and typed config structures for the Almanac scheduler.
//!
//! The canonical configuration lives in `almanac.yaml` next to the binary.
//! Every field has a default, so an empty file (or no file at all) yields a
//! working dry-run setup: file store, log actuator, log announcer.
//!
//! Connection secrets and deployment-specific addresses can be overridden
//! from the environment, see [`AlmanacConfig::apply_env_overrides`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Duration;

use almanac_types::{Season, Weather};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde::Deserialize;

use crate::ports::ChannelId;
use crate::water::WaterRule;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The file parsed but a value is out of range.
    #[error("invalid config: {reason}")]
    Invalid {
        /// What is wrong and where.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

impl ConfigError {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

/// Top-level scheduler configuration.
///
/// Mirrors the structure of `almanac.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AlmanacConfig {
    /// Timer cadences.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Season length and rotation anchor.
    #[serde(default)]
    pub seasons: SeasonConfig,

    /// Weather options and selection constraints.
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Water quality rule table and location buckets.
    #[serde(default)]
    pub water: WaterConfig,

    /// Weather pause defaults.
    #[serde(default)]
    pub pause: PauseConfig,

    /// Announcement channels.
    #[serde(default)]
    pub channels: ChannelConfig,

    /// Durable state backend.
    #[serde(default)]
    pub store: StoreConfig,

    /// Game server command bridge.
    #[serde(default)]
    pub actuator: ActuatorConfig,

    /// Chat platform adapter.
    #[serde(default)]
    pub announcer: AnnouncerConfig,

    /// Operator HTTP API.
    #[serde(default)]
    pub operator: OperatorConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AlmanacConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables are applied after parsing and the result is
    /// validated before it is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override deployment values from environment variables.
    ///
    /// - `DRAGONFLY_URL` overrides `store.dragonfly_url`
    /// - `ALMANAC_STORE_PATH` overrides `store.path`
    /// - `ALMANAC_ACTUATOR_URL` overrides `actuator.url`
    /// - `DISCORD_BOT_TOKEN` overrides `announcer.bot_token`
    /// - `ALMANAC_OPERATOR_PORT` overrides `operator.port` (ignored if not a port number)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DRAGONFLY_URL") {
            self.store.dragonfly_url = url;
        }
        if let Ok(path) = std::env::var("ALMANAC_STORE_PATH") {
            self.store.path = path;
        }
        if let Ok(url) = std::env::var("ALMANAC_ACTUATOR_URL") {
            self.actuator.url = url;
        }
        if let Ok(token) = std::env::var("DISCORD_BOT_TOKEN") {
            self.announcer.bot_token = token;
        }
        if let Some(port) = std::env::var("ALMANAC_OPERATOR_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
        {
            self.operator.port = port;
        }
    }

    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.schedule.validate()?;
        self.seasons.length()?;
        self.weather.validate()?;
        self.water.validate()?;
        self.pause.default_duration()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// Timer cadences for the three cycles.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleConfig {
    /// Minutes between weather ticks.
    #[serde(default = "default_weather_interval_minutes")]
    pub weather_interval_minutes: u64,

    /// Minutes between water quality ticks.
    #[serde(default = "default_water_interval_minutes")]
    pub water_interval_minutes: u64,

    /// Minutes between season boundary checks.
    #[serde(default = "default_season_check_minutes")]
    pub season_check_minutes: u64,

    /// Seconds to wait for in-flight ticks on shutdown.
    #[serde(default = "default_shutdown_grace_seconds")]
    pub shutdown_grace_seconds: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            weather_interval_minutes: default_weather_interval_minutes(),
            water_interval_minutes: default_water_interval_minutes(),
            season_check_minutes: default_season_check_minutes(),
            shutdown_grace_seconds: default_shutdown_grace_seconds(),
        }
    }
}

impl ScheduleConfig {
    /// Weather tick period.
    pub const fn weather_period(&self) -> Duration {
        Duration::from_secs(self.weather_interval_minutes.saturating_mul(60))
    }

    /// Water tick period.
    pub const fn water_period(&self) -> Duration {
        Duration::from_secs(self.water_interval_minutes.saturating_mul(60))
    }

    /// Season check period.
    pub const fn season_check_period(&self) -> Duration {
        Duration::from_secs(self.season_check_minutes.saturating_mul(60))
    }

    /// Shutdown grace period.
    pub const fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_seconds)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, minutes) in [
            ("schedule.weather_interval_minutes", self.weather_interval_minutes),
            ("schedule.water_interval_minutes", self.water_interval_minutes),
            ("schedule.season_check_minutes", self.season_check_minutes),
        ] {
            if minutes == 0 {
                return Err(ConfigError::invalid(format!("{name} must be non-zero")));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Seasons
// ---------------------------------------------------------------------------

/// What a season check does after a long outage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatchUpPolicy {
    /// Advance exactly one season per check, restarting the clock at `now`.
    #[default]
    OneStep,
    /// Advance by every elapsed season length at once, restarting at `now`.
    Jump,
}

/// Season length and rotation anchor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeasonConfig {
    /// Whole days each season lasts.
    #[serde(default = "default_season_length_days")]
    pub length_days: u32,

    /// Start of the first season when nothing is persisted yet.
    #[serde(default = "default_rotation_start")]
    pub rotation_start: DateTime<Utc>,

    /// Behavior after an outage longer than one season.
    #[serde(default)]
    pub catch_up: CatchUpPolicy,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            length_days: default_season_length_days(),
            rotation_start: default_rotation_start(),
            catch_up: CatchUpPolicy::default(),
        }
    }
}

impl SeasonConfig {
    /// Season length as a duration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero length.
    pub fn length(&self) -> Result<TimeDelta, ConfigError> {
        if self.length_days == 0 {
            return Err(ConfigError::invalid("seasons.length_days must be non-zero"));
        }
        TimeDelta::try_days(i64::from(self.length_days))
            .ok_or_else(|| ConfigError::invalid("seasons.length_days is out of range"))
    }
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// Weather options and selection constraints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeatherConfig {
    /// Eligible weather values per season.
    #[serde(default = "default_weather_options")]
    pub options: BTreeMap<Season, Vec<Weather>>,

    /// Consecutive heavy selections after which the growth season
    /// suppresses heavy weather.
    #[serde(default = "default_heavy_streak_limit")]
    pub heavy_streak_limit: u32,

    /// Minimum hours between two rain selections in the recovery season.
    #[serde(default = "default_rain_cooldown_hours")]
    pub rain_cooldown_hours: u32,

    /// Probability that eligible rain is forced in the recovery season.
    #[serde(default = "default_rain_probability")]
    pub rain_probability: f64,

    /// Number of past selections kept in the weather history.
    #[serde(default = "default_history_len")]
    pub history_len: usize,

    /// Seed for the selection RNG. Unset means seeded from the OS.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Actuator command template. `{weather}` is replaced by the token.
    #[serde(default = "default_weather_command")]
    pub command: String,

    /// Flavor text per weather value, rendered as a template.
    #[serde(default = "default_weather_flavor")]
    pub flavor: BTreeMap<Weather, String>,

    /// Template used when no flavor text is registered for a value.
    #[serde(default = "default_weather_fallback")]
    pub fallback_message: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            options: default_weather_options(),
            heavy_streak_limit: default_heavy_streak_limit(),
            rain_cooldown_hours: default_rain_cooldown_hours(),
            rain_probability: default_rain_probability(),
            history_len: default_history_len(),
            seed: None,
            command: default_weather_command(),
            flavor: default_weather_flavor(),
            fallback_message: default_weather_fallback(),
        }
    }
}

impl WeatherConfig {
    /// Rain cooldown as a duration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the value does not fit a duration.
    pub fn rain_cooldown(&self) -> Result<TimeDelta, ConfigError> {
        TimeDelta::try_hours(i64::from(self.rain_cooldown_hours))
            .ok_or_else(|| ConfigError::invalid("weather.rain_cooldown_hours is out of range"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for season in Season::ROTATION {
            if self.options.get(&season).is_none_or(Vec::is_empty) {
                return Err(ConfigError::invalid(format!(
                    "weather.options has no values for {}",
                    season.key()
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.rain_probability) {
            return Err(ConfigError::invalid(
                "weather.rain_probability must be within [0, 1]",
            ));
        }
        if self.history_len == 0 {
            return Err(ConfigError::invalid("weather.history_len must be non-zero"));
        }
        if !self.command.contains("{weather}") {
            return Err(ConfigError::invalid(
                "weather.command must contain {weather}",
            ));
        }
        self.rain_cooldown()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Water
// ---------------------------------------------------------------------------

/// Water quality rule table and location buckets.
///
/// A season absent from `rules` makes no water changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WaterConfig {
    /// Per-season bucket values.
    #[serde(default = "default_water_rules")]
    pub rules: BTreeMap<Season, WaterRule>,

    /// Large water sources that keep a partial value in harsh seasons.
    #[serde(default = "default_major_locations")]
    pub major: Vec<String>,

    /// Hot springs, treated like major sources.
    #[serde(default = "default_hotspring_locations")]
    pub hotsprings: Vec<String>,

    /// Every other location.
    #[serde(default = "default_other_locations")]
    pub other: Vec<String>,

    /// Actuator command template with `{location}` and `{value}`.
    #[serde(default = "default_water_command")]
    pub command: String,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            rules: default_water_rules(),
            major: default_major_locations(),
            hotsprings: default_hotspring_locations(),
            other: default_other_locations(),
            command: default_water_command(),
        }
    }
}

impl WaterConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (season, rule) in &self.rules {
            if !rule.is_valid() {
                return Err(ConfigError::invalid(format!(
                    "water.rules for {} has a value above 100",
                    season.key()
                )));
            }
        }

        let mut seen = BTreeSet::new();
        for name in self.major.iter().chain(&self.hotsprings).chain(&self.other) {
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::invalid(format!(
                    "water location {name} is listed in more than one bucket"
                )));
            }
        }

        if !self.command.contains("{location}") || !self.command.contains("{value}") {
            return Err(ConfigError::invalid(
                "water.command must contain {location} and {value}",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pause
// ---------------------------------------------------------------------------

/// Weather pause defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PauseConfig {
    /// Hours a pause lasts when the caller gives no duration.
    #[serde(default = "default_pause_hours")]
    pub default_hours: u32,
}

impl Default for PauseConfig {
    fn default() -> Self {
        Self {
            default_hours: default_pause_hours(),
        }
    }
}

impl PauseConfig {
    /// Default pause as a duration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for zero or out-of-range hours.
    pub fn default_duration(&self) -> Result<TimeDelta, ConfigError> {
        if self.default_hours == 0 {
            return Err(ConfigError::invalid("pause.default_hours must be non-zero"));
        }
        TimeDelta::try_hours(i64::from(self.default_hours))
            .ok_or_else(|| ConfigError::invalid("pause.default_hours is out of range"))
    }
}

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

/// Announcement channels.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelConfig {
    /// Long season narrative.
    #[serde(default = "default_season_channel")]
    pub season: ChannelId,

    /// Short season bulletin.
    #[serde(default = "default_announcements_channel")]
    pub announcements: ChannelId,

    /// Weather flavor text.
    #[serde(default = "default_weather_channel")]
    pub weather_updates: ChannelId,

    /// Operations log.
    #[serde(default = "default_operations_channel")]
    pub operations: ChannelId,

    /// Recent messages inspected before re-announcing a season.
    #[serde(default = "default_dedupe_lookback")]
    pub dedupe_lookback: u8,

    /// Post scheduled-tick failures to the operations channel.
    #[serde(default = "default_true")]
    pub report_tick_failures: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            season: default_season_channel(),
            announcements: default_announcements_channel(),
            weather_updates: default_weather_channel(),
            operations: default_operations_channel(),
            dedupe_lookback: default_dedupe_lookback(),
            report_tick_failures: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Infrastructure
// ---------------------------------------------------------------------------

/// Which [`StateStore`](almanac_store::StateStore) backend to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// JSON document on local disk.
    #[default]
    File,
    /// Single key in `Dragonfly`.
    Dragonfly,
    /// Process memory only. Nothing survives a restart.
    Memory,
}

/// Durable state backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Backend selection.
    #[serde(default)]
    pub backend: StoreKind,

    /// Document path for the file backend.
    #[serde(default = "default_store_path")]
    pub path: String,

    /// `Dragonfly` connection URL.
    #[serde(default = "default_dragonfly_url")]
    pub dragonfly_url: String,

    /// `Dragonfly` key holding the document.
    #[serde(default = "default_store_key")]
    pub key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreKind::default(),
            path: default_store_path(),
            dragonfly_url: default_dragonfly_url(),
            key: default_store_key(),
        }
    }
}

/// Which actuator adapter to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorKind {
    /// Log commands without sending them.
    #[default]
    Log,
    /// POST commands to an HTTP command bridge.
    Http,
}

/// Game server command bridge.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActuatorConfig {
    /// Adapter selection.
    #[serde(default)]
    pub kind: ActuatorKind,

    /// Bridge endpoint for the HTTP adapter.
    #[serde(default = "default_actuator_url")]
    pub url: String,

    /// Per-command timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            kind: ActuatorKind::default(),
            url: default_actuator_url(),
            timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Which announcer adapter to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncerKind {
    /// Log messages without posting them.
    #[default]
    Log,
    /// Post through the Discord REST API.
    Discord,
}

/// Chat platform adapter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnnouncerConfig {
    /// Adapter selection.
    #[serde(default)]
    pub kind: AnnouncerKind,

    /// Bot token for the Discord adapter.
    #[serde(default)]
    pub bot_token: String,

    /// REST API base URL.
    #[serde(default = "default_discord_api_base")]
    pub api_base: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for AnnouncerConfig {
    fn default() -> Self {
        Self {
            kind: AnnouncerKind::default(),
            bot_token: String::new(),
            api_base: default_discord_api_base(),
            timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Operator HTTP API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OperatorConfig {
    /// Whether to serve the API at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Bind address.
    #[serde(default = "default_operator_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_operator_port")]
    pub port: u16,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_operator_host(),
            port: default_operator_port(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_weather_interval_minutes() -> u64 {
    20
}

const fn default_water_interval_minutes() -> u64 {
    180
}

const fn default_season_check_minutes() -> u64 {
    60
}

const fn default_shutdown_grace_seconds() -> u64 {
    30
}

const fn default_season_length_days() -> u32 {
    14
}

fn default_rotation_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 9, 12, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

fn default_weather_options() -> BTreeMap<Season, Vec<Weather>> {
    BTreeMap::from([
        (
            Season::Blooming,
            vec![
                Weather::Rain,
                Weather::Cloudy,
                Weather::Storm,
                Weather::Fog,
                Weather::Overcast,
            ],
        ),
        (Season::Drought, vec![Weather::ClearSky, Weather::Cloudy]),
        (
            Season::Brightening,
            vec![
                Weather::ClearSky,
                Weather::Cloudy,
                Weather::Overcast,
                Weather::Rain,
            ],
        ),
        (
            Season::Freeze,
            vec![Weather::Snow, Weather::Fog, Weather::Overcast],
        ),
    ])
}

const fn default_heavy_streak_limit() -> u32 {
    2
}

const fn default_rain_cooldown_hours() -> u32 {
    6
}

const fn default_rain_probability() -> f64 {
    0.25
}

const fn default_history_len() -> usize {
    8
}

fn default_weather_command() -> String {
    "/weather {weather}".to_owned()
}

fn default_weather_flavor() -> BTreeMap<Weather, String> {
    BTreeMap::from([
        (
            Weather::ClearSky,
            "☀️ The sky clears over the island. Not a cloud in sight.".to_owned(),
        ),
        (
            Weather::Cloudy,
            "☁️ Clouds drift in and soften the light.".to_owned(),
        ),
        (
            Weather::Overcast,
            "🌥️ A flat grey lid settles over {{ season }}.".to_owned(),
        ),
        (
            Weather::Fog,
            "🌫️ Thick fog rolls down from the hills. Keep your herd close.".to_owned(),
        ),
        (
            Weather::Rain,
            "🌧️ Rain sweeps across the valleys and the water runs fresh.".to_owned(),
        ),
        (
            Weather::Storm,
            "⛈️ A storm breaks overhead. Find shelter.".to_owned(),
        ),
        (
            Weather::Snow,
            "🌨️ Snow begins to fall. The cold bites deeper.".to_owned(),
        ),
    ])
}

fn default_weather_fallback() -> String {
    "🌦️ The weather is now **{{ weather }}**.".to_owned()
}

fn default_water_rules() -> BTreeMap<Season, WaterRule> {
    BTreeMap::from([
        (Season::Drought, WaterRule::partial(40, 0)),
        (Season::Brightening, WaterRule::uniform(100)),
        (Season::Freeze, WaterRule::partial(100, 0)),
    ])
}

fn default_major_locations() -> Vec<String> {
    [
        "TriadFalls",
        "TitansPassLake",
        "BigQuillLake",
        "HuntersThicket",
        "GreenValley",
        "WhiteCliffsLake",
        "RockfallHill",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

fn default_hotspring_locations() -> Vec<String> {
    (1..=24).map(|n| format!("Hotspring{n}")).collect()
}

fn default_other_locations() -> Vec<String> {
    [
        "YoungGroveLake",
        "PutridLake",
        "WhistlingColumns",
        "BrokenToothPond",
        "FrogPond",
        "HoodooPond",
        "LowerStegoPond",
        "DarkwoodsPond",
        "UpperStegoPond",
        "ImpactCrater",
        "RedIsland",
        "ReedPond2",
        "MountainScubPond",
        "SharptoothPond",
        "AcridLake",
        "ReedPondSouth",
        "BirchwoodsPond",
        "BurnedForestPond",
        "TriadPond",
        "BaldMountainPond",
        "RainbowPond",
        "WildernessPeakPond",
        "YoungGrovePond",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

fn default_water_command() -> String {
    "/waterquality {location} {value}".to_owned()
}

const fn default_pause_hours() -> u32 {
    4
}

const fn default_season_channel() -> ChannelId {
    ChannelId(1_303_375_972_258_812_036)
}

const fn default_announcements_channel() -> ChannelId {
    ChannelId(1_303_378_387_947_229_225)
}

const fn default_weather_channel() -> ChannelId {
    ChannelId(1_359_519_868_168_437_790)
}

const fn default_operations_channel() -> ChannelId {
    ChannelId(1_359_506_060_414_812_284)
}

const fn default_dedupe_lookback() -> u8 {
    5
}

fn default_store_path() -> String {
    "data.json".to_owned()
}

fn default_dragonfly_url() -> String {
    "redis://localhost:6379".to_owned()
}

fn default_store_key() -> String {
    "almanac:state".to_owned()
}

fn default_actuator_url() -> String {
    "http://localhost:8081/command".to_owned()
}

const fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_discord_api_base() -> String {
    "https://discord.com/api/v10".to_owned()
}

fn default_operator_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_operator_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}
