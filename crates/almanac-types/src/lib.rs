//! Shared type definitions for the Almanac environmental scheduler.
//!
//! This crate is the single source of truth for the domain vocabulary used
//! across the workspace: seasons, weather, water buckets, and the persisted
//! state document. Status types flow to `TypeScript` via `ts-rs` for
//! dashboards that consume the operator API.
//!
//! # Modules
//!
//! - [`enums`] -- Season rotation, weather tokens, water buckets
//! - [`structs`] -- Season/weather/pause records and the persisted document

pub mod enums;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{SEASON_COUNT, Season, UnknownSeason, UnknownWeather, WaterBucket, Weather};
pub use structs::{
    PauseState, PersistedRecord, SeasonRecord, StatusReport, WeatherHistory, WeatherReading,
};
