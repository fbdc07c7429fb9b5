//! Water quality cycle.
//!
//! Each tick looks up the active season's [`WaterRule`], resolves every
//! configured location to its [`WaterBucket`], and sends one command per
//! location. Seasons without a rule send nothing.
//!
//! Dispatch is sequential and not atomic. A mid-batch actuator failure is
//! logged and the batch continues; a partially applied batch is reported,
//! never rolled back.

use std::collections::BTreeMap;

use almanac_types::{Season, WaterBucket};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::WaterConfig;
use crate::error::CycleError;
use crate::ports::Actuator;

/// Target water quality per bucket for one season (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterRule {
    /// Value for major water sources.
    pub major: u8,
    /// Value for hot springs.
    pub hotspring: u8,
    /// Value for every other location.
    pub other: u8,
}

impl WaterRule {
    /// The same value everywhere.
    pub const fn uniform(value: u8) -> Self {
        Self {
            major: value,
            hotspring: value,
            other: value,
        }
    }

    /// `partial` for major sources and hot springs, `rest` elsewhere.
    pub const fn partial(partial: u8, rest: u8) -> Self {
        Self {
            major: partial,
            hotspring: partial,
            other: rest,
        }
    }

    /// The value this rule assigns to `bucket`.
    pub const fn value_for(self, bucket: WaterBucket) -> u8 {
        match bucket {
            WaterBucket::Major => self.major,
            WaterBucket::Hotspring => self.hotspring,
            WaterBucket::Other => self.other,
        }
    }

    /// Every value lies within 0-100.
    pub const fn is_valid(self) -> bool {
        self.major <= 100 && self.hotspring <= 100 && self.other <= 100
    }
}

/// One command the water tick intends to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaterCommand {
    /// Location name as the game server knows it.
    pub location: String,
    /// Bucket the location belongs to.
    pub bucket: WaterBucket,
    /// Target quality.
    pub value: u8,
}

/// Season rules plus static bucket membership.
#[derive(Debug, Clone)]
pub struct WaterTable {
    rules: BTreeMap<Season, WaterRule>,
    locations: Vec<(String, WaterBucket)>,
}

impl WaterTable {
    /// Build from configuration. Locations keep their configured order,
    /// major sources first.
    pub fn from_config(config: &WaterConfig) -> Self {
        let tagged = |names: &[String], bucket: WaterBucket| {
            names
                .iter()
                .map(move |n| (n.clone(), bucket))
                .collect::<Vec<_>>()
        };
        let mut locations = tagged(&config.major, WaterBucket::Major);
        locations.extend(tagged(&config.hotsprings, WaterBucket::Hotspring));
        locations.extend(tagged(&config.other, WaterBucket::Other));

        Self {
            rules: config.rules.clone(),
            locations,
        }
    }

    /// The rule for `season`, if that season changes water at all.
    pub fn rule_for(&self, season: Season) -> Option<&WaterRule> {
        self.rules.get(&season)
    }

    /// Number of known locations.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Whether no locations are configured.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Every command a tick in `season` sends. Empty for seasons without a
    /// rule.
    pub fn plan(&self, season: Season) -> Vec<WaterCommand> {
        let Some(rule) = self.rule_for(season) else {
            return Vec::new();
        };
        self.locations
            .iter()
            .map(|(location, bucket)| WaterCommand {
                location: location.clone(),
                bucket: *bucket,
                value: rule.value_for(*bucket),
            })
            .collect()
    }
}

/// Outcome of one water tick.
#[derive(Debug)]
pub struct WaterReport {
    /// Season the tick applied.
    pub season: Season,
    /// Locations the actuator accepted.
    pub applied: Vec<String>,
    /// Locations that failed, with the error for each command.
    pub failed: Vec<(String, CycleError)>,
}

impl WaterReport {
    /// True when the season has no rule and nothing was sent.
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty() && self.failed.is_empty()
    }
}

/// Periodic water quality dispatcher.
pub struct WaterCycle {
    table: WaterTable,
    command_template: String,
    running: Mutex<()>,
}

impl WaterCycle {
    /// Build from configuration.
    pub fn new(config: &WaterConfig) -> Self {
        Self {
            table: WaterTable::from_config(config),
            command_template: config.command.clone(),
            running: Mutex::new(()),
        }
    }

    /// The rule table.
    pub const fn table(&self) -> &WaterTable {
        &self.table
    }

    /// Render the actuator command for one location.
    pub fn command_for(&self, command: &WaterCommand) -> String {
        self.command_template
            .replace("{location}", &command.location)
            .replace("{value}", &command.value.to_string())
    }

    /// Apply `season`'s rule to every location.
    ///
    /// Never fails as a whole. Individual command failures are logged and
    /// listed in the report. Overlapping calls run one after the other.
    pub async fn tick<A: Actuator>(&self, season: Season, actuator: &A) -> WaterReport {
        let _running = self.running.lock().await;
        let mut report = WaterReport {
            season,
            applied: Vec::new(),
            failed: Vec::new(),
        };

        let plan = self.table.plan(season);
        if plan.is_empty() {
            tracing::info!(season = %season, "No water quality changes for this season");
            return report;
        }

        for entry in plan {
            let command = self.command_for(&entry);
            match actuator.send_command(&command).await {
                Ok(reply) if reply.success => {
                    tracing::info!(
                        command = %command,
                        sent = report.applied.len().saturating_add(1),
                        "Water quality command applied"
                    );
                    report.applied.push(entry.location);
                }
                Ok(reply) => {
                    let error = CycleError::rejected(&command, reply.response.as_deref());
                    tracing::warn!(error = %error, "Water quality command rejected");
                    report.failed.push((entry.location, error));
                }
                Err(e) => {
                    let error = CycleError::actuator(&command, &e);
                    tracing::warn!(error = %error, "Water quality command failed");
                    report.failed.push((entry.location, error));
                }
            }
        }

        tracing::info!(
            season = %season,
            applied = report.applied.len(),
            failed = report.failed.len(),
            "Applied water quality updates"
        );
        report
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ports::RecordingActuator;

    fn small_config() -> WaterConfig {
        WaterConfig {
            major: vec!["TriadFalls".to_owned()],
            hotsprings: vec!["Hotspring1".to_owned()],
            other: vec!["FrogPond".to_owned()],
            ..WaterConfig::default()
        }
    }

    #[test]
    fn drought_keeps_major_and_hotsprings_partial() {
        let table = WaterTable::from_config(&small_config());
        let plan = table.plan(Season::Drought);
        let values: Vec<(&str, u8)> = plan
            .iter()
            .map(|c| (c.location.as_str(), c.value))
            .collect();
        assert_eq!(
            values,
            vec![("TriadFalls", 40), ("Hotspring1", 40), ("FrogPond", 0)]
        );
    }

    #[test]
    fn freeze_and_brightening_values() {
        let table = WaterTable::from_config(&small_config());
        let freeze: Vec<u8> = table.plan(Season::Freeze).iter().map(|c| c.value).collect();
        assert_eq!(freeze, vec![100, 100, 0]);
        let recovery: Vec<u8> = table
            .plan(Season::Brightening)
            .iter()
            .map(|c| c.value)
            .collect();
        assert_eq!(recovery, vec![100, 100, 100]);
    }

    #[test]
    fn growth_season_plans_nothing() {
        let table = WaterTable::from_config(&WaterConfig::default());
        assert!(table.rule_for(Season::Blooming).is_none());
        assert!(table.plan(Season::Blooming).is_empty());
    }

    #[test]
    fn default_table_resolves_buckets() {
        let table = WaterTable::from_config(&WaterConfig::default());
        assert_eq!(table.len(), 54);
        let plan = table.plan(Season::Freeze);
        let bucket_of = |location: &str| {
            plan.iter()
                .find(|c| c.location == location)
                .map(|c| c.bucket)
        };
        assert_eq!(bucket_of("GreenValley"), Some(WaterBucket::Major));
        assert_eq!(bucket_of("Hotspring24"), Some(WaterBucket::Hotspring));
        assert_eq!(bucket_of("FrogPond"), Some(WaterBucket::Other));
        assert_eq!(bucket_of("Atlantis"), None);
    }

    #[tokio::test]
    async fn tick_sends_one_command_per_location() {
        let cycle = WaterCycle::new(&small_config());
        let actuator = RecordingActuator::new();
        let report = cycle.tick(Season::Drought, &actuator).await;

        assert_eq!(report.applied.len(), 3);
        assert!(report.failed.is_empty());
        assert_eq!(
            actuator.commands().await,
            vec![
                "/waterquality TriadFalls 40".to_owned(),
                "/waterquality Hotspring1 40".to_owned(),
                "/waterquality FrogPond 0".to_owned(),
            ]
        );
    }

    #[tokio::test]
    async fn partial_failure_continues_the_batch() {
        let cycle = WaterCycle::new(&small_config());
        let actuator = RecordingActuator::new();
        actuator.reject_containing(Some("Hotspring1")).await;

        let report = cycle.tick(Season::Freeze, &actuator).await;
        assert_eq!(report.applied, vec!["TriadFalls".to_owned(), "FrogPond".to_owned()]);
        assert_eq!(report.failed.len(), 1);
        let (location, error) = &report.failed[0];
        assert_eq!(location, "Hotspring1");
        assert!(matches!(
            error,
            CycleError::ActuatorUnavailable { command, .. } if command == "/waterquality Hotspring1 100"
        ));
        assert_eq!(actuator.commands().await.len(), 3);
    }

    #[tokio::test]
    async fn transport_failure_is_an_actuator_error() {
        let cycle = WaterCycle::new(&small_config());
        let actuator = RecordingActuator::new();
        actuator.set_failing(true);

        let report = cycle.tick(Season::Brightening, &actuator).await;
        assert!(report.applied.is_empty());
        assert_eq!(report.failed.len(), 3);
        assert!(
            report
                .failed
                .iter()
                .all(|(_, e)| matches!(e, CycleError::ActuatorUnavailable { .. }))
        );
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn applied_commands_are_logged_at_info() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let cycle = WaterCycle::new(&small_config());
        let actuator = RecordingActuator::new();
        cycle.tick(Season::Drought, &actuator).await;

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        for command in [
            "/waterquality TriadFalls 40",
            "/waterquality Hotspring1 40",
            "/waterquality FrogPond 0",
        ] {
            assert!(output.contains(command), "missing `{command}` in info logs");
        }
    }

    #[tokio::test]
    async fn growth_tick_is_noop() {
        let cycle = WaterCycle::new(&small_config());
        let actuator = RecordingActuator::new();
        let report = cycle.tick(Season::Blooming, &actuator).await;
        assert!(report.is_noop());
        assert!(actuator.commands().await.is_empty());
    }
}
