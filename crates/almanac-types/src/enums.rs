//! Enumeration types for the Almanac scheduler.
//!
//! Seasons form a fixed four-step rotation. Weather values are the tokens the
//! game server understands. Water buckets group locations for the water
//! quality rule table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Number of seasons in one full rotation.
pub const SEASON_COUNT: usize = 4;

// ---------------------------------------------------------------------------
// Seasons
// ---------------------------------------------------------------------------

/// One of the four cyclically ordered seasons.
///
/// The declaration order is the rotation order: Blooming (index 0) is the
/// growth season, Brightening (index 2) is the recovery season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Season {
    /// Warm and wet. Water and food are abundant.
    Blooming,
    /// Rains disappear and water sources dry up.
    Drought,
    /// Comfortably warm, periodic rains refill water sources.
    Brightening,
    /// Bitter cold, small water sources freeze over.
    Freeze,
}

impl Season {
    /// The rotation, in order.
    pub const ROTATION: [Self; SEASON_COUNT] =
        [Self::Blooming, Self::Drought, Self::Brightening, Self::Freeze];

    /// Position of this season within [`Season::ROTATION`].
    pub const fn index(self) -> usize {
        match self {
            Self::Blooming => 0,
            Self::Drought => 1,
            Self::Brightening => 2,
            Self::Freeze => 3,
        }
    }

    /// The season at `index` modulo the rotation length.
    pub const fn from_index(index: usize) -> Self {
        match index % SEASON_COUNT {
            0 => Self::Blooming,
            1 => Self::Drought,
            2 => Self::Brightening,
            _ => Self::Freeze,
        }
    }

    /// The season that follows this one.
    pub const fn next(self) -> Self {
        self.advance_by(1)
    }

    /// The season `steps` positions after this one, wrapping around.
    pub const fn advance_by(self, steps: u64) -> Self {
        // SEASON_COUNT fits in u64 and the remainder fits back in usize.
        let offset = (steps % SEASON_COUNT as u64) as usize;
        Self::from_index(self.index().wrapping_add(offset))
    }

    /// Lowercase key used in configuration files and commands.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Blooming => "the blooming",
            Self::Drought => "the drought",
            Self::Brightening => "the brightening",
            Self::Freeze => "the freeze",
        }
    }

    /// Human-readable name used in announcements.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Blooming => "The Blooming",
            Self::Drought => "The Drought",
            Self::Brightening => "The Brightening",
            Self::Freeze => "The Freeze",
        }
    }

    /// Emoji that decorates announcements for this season.
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Blooming => "🌸",
            Self::Drought => "🔥",
            Self::Brightening => "🌞",
            Self::Freeze => "❄️",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A season name that is not part of the rotation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown season: {0}")]
pub struct UnknownSeason(pub String);

impl FromStr for Season {
    type Err = UnknownSeason;

    /// Accepts `"the blooming"`, `"The Blooming"`, `"blooming"` and
    /// `"the_blooming"` style spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        let bare = normalized.strip_prefix("the ").unwrap_or(&normalized).trim();
        match bare {
            "blooming" => Ok(Self::Blooming),
            "drought" => Ok(Self::Drought),
            "brightening" => Ok(Self::Brightening),
            "freeze" => Ok(Self::Freeze),
            _ => Err(UnknownSeason(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// A weather value the game server can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Weather {
    /// Clear skies.
    ClearSky,
    /// Broken cloud cover.
    Cloudy,
    /// Full grey cover.
    Overcast,
    /// Thick ground fog.
    Fog,
    /// Rain showers.
    Rain,
    /// Thunderstorm.
    Storm,
    /// Snowfall.
    Snow,
}

impl Weather {
    /// Every weather value.
    pub const ALL: [Self; 7] = [
        Self::ClearSky,
        Self::Cloudy,
        Self::Overcast,
        Self::Fog,
        Self::Rain,
        Self::Storm,
        Self::Snow,
    ];

    /// The token sent to the game server.
    pub const fn token(self) -> &'static str {
        match self {
            Self::ClearSky => "clearsky",
            Self::Cloudy => "cloudy",
            Self::Overcast => "overcast",
            Self::Fog => "fog",
            Self::Rain => "rain",
            Self::Storm => "storm",
            Self::Snow => "snow",
        }
    }

    /// Whether this value belongs to the heavy subset `{rain, storm}`.
    pub const fn is_heavy(self) -> bool {
        matches!(self, Self::Rain | Self::Storm)
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A weather token the game server does not know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown weather: {0}")]
pub struct UnknownWeather(pub String);

impl FromStr for Weather {
    type Err = UnknownWeather;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|w| w.token() == token || (token == "clear" && *w == Self::ClearSky))
            .ok_or_else(|| UnknownWeather(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Water buckets
// ---------------------------------------------------------------------------

/// Location grouping used by the water quality rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum WaterBucket {
    /// Large lakes and rivers that large species keep flowing.
    Major,
    /// Geothermal springs.
    Hotspring,
    /// Every other pond and pool.
    Other,
}
