//! Announcement text via `minijinja`.
//!
//! Season narratives, season bulletins and weather flavor lines are
//! templates registered once at startup, so a broken override fails the
//! boot instead of a tick. Operations-channel lines are plain strings.

use almanac_types::{Season, SeasonRecord, Weather, WeatherReading};
use chrono::{DateTime, Utc};
use minijinja::{Environment, context};

use crate::config::WeatherConfig;
use crate::error::CycleError;

const SEASON_NARRATIVE: &str = "\
{{ emoji }} **{{ name }} has arrived** {{ emoji }}

{{ description }}

This season started: {{ start }}
This season will end: {{ end }}";

const SEASON_BULLETIN: &str = "\
{{ emoji }} **{{ name }} has arrived** {{ emoji }}
{% for line in bullets %}
- {{ line }}{% endfor %}";

const WEATHER_FALLBACK: &str = "weather/fallback";

/// Long description and short bulletin lines for one season.
struct SeasonLore {
    description: &'static str,
    bullets: &'static [&'static str],
}

const fn lore(season: Season) -> SeasonLore {
    match season {
        Season::Blooming => SeasonLore {
            description: "The last of the snow has finally thawed. Warm rain sweeps in and keeps \
                water sources full to bursting and food plentiful. Chilly mornings and evenings \
                bring thick fog, and the weather swings from lengthy storms to brief showers. \
                Most species begin their first wave of nesting, hoping to raise their hatchlings \
                before the drought.",
            bullets: &[
                "The weather is warm, rainy, stormy, overcast and cloudy",
                "Water and food are abundant",
            ],
        },
        Season::Drought => SeasonLore {
            description: "The rains disappear and the water sources dry up. Most species will have \
                to move often and venture outside their territories to find enough water. \
                Hatchlings born in this season rarely make it to The Brightening.",
            bullets: &[
                "Water is scarce and does not regenerate on its own",
                "Large water sources and the hot springs hold a low level of quality",
                "Wildfires may occur",
            ],
        },
        Season::Brightening => SeasonLore {
            description: "The comfortably warm season after the drought. Skies are clear and \
                bright, with periodic rains keeping water flowing and food plentiful. Many \
                species nest a second time before settling into territories for The Freeze.",
            bullets: &[
                "The heat of the drought has eased but the weather remains clear",
                "Periodic rains replenish every water source",
                "The next wave of nesting has arrived for many species",
            ],
        },
        Season::Freeze => SeasonLore {
            description: "Frosts are soon followed by thick snowfall. The temperature turns \
                bitterly cold, plants go dormant and water sources freeze over. Large species \
                can still break the ice, and carnivores leave their dens only when driven by \
                hunger.",
            bullets: &[
                "The weather is cold, snowy and foggy",
                "Small water sources have frozen over completely",
                "Large water sources and the hot springs keep flowing",
            ],
        },
    }
}

/// Marker every announcement for `season` carries. Used to spot repeats.
pub fn season_headline(season: Season) -> String {
    format!("**{} has arrived**", season.display_name())
}

/// The season a posted message announces, if it is a season announcement.
pub fn announced_season(text: &str) -> Option<Season> {
    Season::ROTATION
        .into_iter()
        .find(|season| text.contains(&season_headline(*season)))
}

fn format_instant(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Renders every message the scheduler posts.
pub struct Narrator {
    env: Environment<'static>,
}

impl Narrator {
    /// Register the built-in templates plus the configured weather flavor
    /// text.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::Template`] if a flavor override does not parse.
    pub fn new(weather: &WeatherConfig) -> Result<Self, CycleError> {
        let mut env = Environment::new();

        env.add_template("season/narrative", SEASON_NARRATIVE)
            .map_err(|e| CycleError::Template(format!("failed to add narrative template: {e}")))?;
        env.add_template("season/bulletin", SEASON_BULLETIN)
            .map_err(|e| CycleError::Template(format!("failed to add bulletin template: {e}")))?;
        env.add_template_owned(WEATHER_FALLBACK, weather.fallback_message.clone())
            .map_err(|e| CycleError::Template(format!("failed to add weather fallback: {e}")))?;

        for (value, text) in &weather.flavor {
            env.add_template_owned(format!("weather/{}", value.token()), text.clone())
                .map_err(|e| {
                    CycleError::Template(format!("failed to add flavor for {value}: {e}"))
                })?;
        }

        Ok(Self { env })
    }

    fn render(&self, name: &str, ctx: &minijinja::Value) -> Result<String, CycleError> {
        self.env
            .get_template(name)
            .map_err(|e| CycleError::Template(format!("missing {name} template: {e}")))?
            .render(ctx)
            .map_err(|e| CycleError::Template(format!("{name} render failed: {e}")))
    }

    /// The long narrative for the season channel, with start and end.
    pub fn season_narrative(
        &self,
        record: &SeasonRecord,
        end: Option<DateTime<Utc>>,
    ) -> Result<String, CycleError> {
        let season = record.season;
        let ctx = context! {
            emoji => season.emoji(),
            name => season.display_name(),
            description => lore(season).description,
            start => format_instant(record.start),
            end => end.map_or_else(|| "unknown".to_owned(), format_instant),
        };
        self.render("season/narrative", &ctx)
    }

    /// The short bulletin for the announcements channel.
    pub fn season_bulletin(&self, season: Season) -> Result<String, CycleError> {
        let ctx = context! {
            emoji => season.emoji(),
            name => season.display_name(),
            bullets => lore(season).bullets,
        };
        self.render("season/bulletin", &ctx)
    }

    /// Flavor text for a new weather reading, or the generic message when
    /// none is registered for that value.
    pub fn weather(&self, reading: &WeatherReading, season: Season) -> Result<String, CycleError> {
        let ctx = context! {
            weather => reading.weather.token(),
            season => season.display_name(),
        };
        if self.has_flavor(reading.weather) {
            self.render(&format!("weather/{}", reading.weather.token()), &ctx)
        } else {
            self.render(WEATHER_FALLBACK, &ctx)
        }
    }

    /// Whether flavor text is registered for `weather`.
    pub fn has_flavor(&self, weather: Weather) -> bool {
        self.env
            .get_template(&format!("weather/{}", weather.token()))
            .is_ok()
    }

    // -----------------------------------------------------------------------
    // Operations channel
    // -----------------------------------------------------------------------

    /// Season changed by an operator.
    pub fn ops_season_set(record: &SeasonRecord) -> String {
        format!(
            "🛠️ Season set to {} (started {}).",
            record.season.display_name(),
            format_instant(record.start)
        )
    }

    /// Season advanced one step by an operator.
    pub fn ops_season_advanced(record: &SeasonRecord) -> String {
        format!(
            "⏭️ Season manually advanced to {}.",
            record.season.display_name()
        )
    }

    /// Rotation restarted by an operator.
    pub fn ops_season_reset(record: &SeasonRecord) -> String {
        format!(
            "🔁 Season cycle reset to {}, started {}.",
            record.season.display_name(),
            format_instant(record.start)
        )
    }

    /// Weather suspended.
    pub fn ops_paused(until: DateTime<Utc>) -> String {
        format!("🛑 Weather paused until {}.", format_instant(until))
    }

    /// Weather resumed.
    pub fn ops_resumed() -> String {
        "▶️ Weather updates resumed.".to_owned()
    }

    /// Summary of one water tick.
    pub fn ops_water(season: Season, applied: usize, failed: usize) -> String {
        if failed == 0 {
            format!(
                "💧 Applied {applied} water quality updates for {}.",
                season.display_name()
            )
        } else {
            format!(
                "💧 Applied {applied} water quality updates for {} ({failed} failed).",
                season.display_name()
            )
        }
    }

    /// A scheduled tick failed.
    pub fn ops_tick_failed(task: &str, error: &CycleError) -> String {
        format!("⚠️ {task} tick failed: {error}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{TimeDelta, TimeZone};

    use super::*;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 9, 12, 0, 0).unwrap()
    }

    #[test]
    fn narrative_names_season_and_window() {
        let narrator = Narrator::new(&WeatherConfig::default()).unwrap();
        let record = SeasonRecord::new(Season::Drought, start());
        let text = narrator
            .season_narrative(&record, record.end(TimeDelta::days(14)))
            .unwrap();

        assert!(text.contains(&season_headline(Season::Drought)));
        assert!(text.contains("2025-04-09 12:00 UTC"));
        assert!(text.contains("2025-04-23 12:00 UTC"));
    }

    #[test]
    fn bulletin_lists_every_line() {
        let narrator = Narrator::new(&WeatherConfig::default()).unwrap();
        let text = narrator.season_bulletin(Season::Freeze).unwrap();
        assert!(text.starts_with("❄️ **The Freeze has arrived**"));
        assert_eq!(text.matches("\n- ").count(), 3);
    }

    #[test]
    fn weather_uses_flavor_then_fallback() {
        let config = WeatherConfig {
            flavor: BTreeMap::from([(Weather::Rain, "Rain over {{ season }}".to_owned())]),
            ..WeatherConfig::default()
        };
        let narrator = Narrator::new(&config).unwrap();
        let rain = WeatherReading {
            weather: Weather::Rain,
            set_at: start(),
        };
        let fog = WeatherReading {
            weather: Weather::Fog,
            set_at: start(),
        };

        assert_eq!(
            narrator.weather(&rain, Season::Blooming).unwrap(),
            "Rain over The Blooming"
        );
        assert!(!narrator.has_flavor(Weather::Fog));
        assert_eq!(
            narrator.weather(&fog, Season::Blooming).unwrap(),
            "🌦️ The weather is now **fog**."
        );
    }

    #[test]
    fn broken_flavor_fails_construction() {
        let config = WeatherConfig {
            flavor: BTreeMap::from([(Weather::Snow, "{{ unclosed".to_owned())]),
            ..WeatherConfig::default()
        };
        assert!(matches!(
            Narrator::new(&config),
            Err(CycleError::Template(_))
        ));
    }

    #[test]
    fn announced_season_reads_the_headline() {
        let narrator = Narrator::new(&WeatherConfig::default()).unwrap();
        let text = narrator.season_bulletin(Season::Brightening).unwrap();
        assert_eq!(announced_season(&text), Some(Season::Brightening));
        assert_eq!(announced_season("🌧️ Rain sweeps across the valleys"), None);
    }

    #[test]
    fn water_summary_mentions_failures_only_when_present() {
        assert_eq!(
            Narrator::ops_water(Season::Drought, 54, 0),
            "💧 Applied 54 water quality updates for The Drought."
        );
        assert!(Narrator::ops_water(Season::Drought, 50, 4).contains("(4 failed)"));
    }
}
