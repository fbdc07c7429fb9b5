//! Environmental state scheduler for a persistent game world.
//!
//! Three independent timers drive the world's environment:
//!
//! - **Season** -- a fixed four-season rotation, each season a configured
//!   number of whole days, persisted before it is announced.
//! - **Weather** -- a season-constrained draw with anti-repeat rules,
//!   suppressed while an operator pause is active.
//! - **Water** -- per-season water quality targets pushed to every
//!   location.
//!
//! The world itself is reached through two capabilities: an [`Actuator`]
//! that applies commands and an [`Announcer`] that posts messages. State
//! lives in one document behind [`almanac_store::RecordStore`].
//!
//! # Modules
//!
//! - [`almanac`] -- The [`Almanac`] facade and the [`AdminOps`] surface
//! - [`clock`] -- Season arithmetic and the season cycle
//! - [`weather`] -- Weather rules and the weather cycle
//! - [`water`] -- Water rule table and the water cycle
//! - [`pause`] -- Weather pause deadline
//! - [`narrator`] -- Announcement templates
//! - [`scheduler`] -- The timer loops
//! - [`ports`] -- Actuator and announcer capabilities, plus recording doubles
//! - [`config`] -- YAML configuration
//! - [`error`] -- Error types

pub mod almanac;
pub mod clock;
pub mod config;
pub mod error;
pub mod narrator;
pub mod pause;
pub mod ports;
pub mod scheduler;
pub mod water;
pub mod weather;

pub use almanac::{AdminOps, Almanac};
pub use clock::{Announcement, ClockError, SeasonChange, SeasonClock, SeasonCycle};
pub use config::{AlmanacConfig, ConfigError};
pub use error::CycleError;
pub use pause::PauseController;
pub use ports::{
    Actuator, ActuatorError, ActuatorReply, Announcer, AnnouncerError, ChannelId,
    RecordingActuator, RecordingAnnouncer,
};
pub use scheduler::{CycleKind, LoopStats, Scheduler};
pub use water::{WaterCycle, WaterReport, WaterRule, WaterTable};
pub use weather::{WeatherCycle, WeatherOutcome, WeatherRules};
