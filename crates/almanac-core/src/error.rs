//! Error types for the scheduler cycles.
//!
//! Scheduled ticks only log these; administrative operations return them to
//! the caller so the command layer can show a reason.

use almanac_store::StoreError;
use almanac_types::UnknownSeason;

use crate::clock::ClockError;
use crate::config::ConfigError;
use crate::ports::{ActuatorError, AnnouncerError, ChannelId};

/// Errors from a season, weather, water or pause operation.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    /// The requested season is not part of the rotation.
    #[error("invalid season: {0}")]
    InvalidSeason(#[from] UnknownSeason),

    /// A request parameter is out of range.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The actuator could not apply a command.
    #[error("actuator unavailable for `{command}`: {reason}")]
    ActuatorUnavailable {
        /// The command that was not applied.
        command: String,
        /// Transport error or the actuator's own reply.
        reason: String,
    },

    /// A message could not be posted.
    #[error("announcer unavailable for channel {channel}: {source}")]
    AnnouncerUnavailable {
        /// Target channel.
        channel: ChannelId,
        /// The underlying announcer error.
        source: AnnouncerError,
    },

    /// The state document could not be read or written.
    #[error("state store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// An announcement template failed to render.
    #[error("template error: {0}")]
    Template(String),

    /// The season clock could not be built.
    #[error(transparent)]
    Clock(#[from] ClockError),

    /// Configuration rejected while building a component.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CycleError {
    /// Build an [`CycleError::ActuatorUnavailable`] from a transport error.
    pub fn actuator(command: &str, source: &ActuatorError) -> Self {
        Self::ActuatorUnavailable {
            command: command.to_owned(),
            reason: source.to_string(),
        }
    }

    /// Build an [`CycleError::ActuatorUnavailable`] for a command the
    /// actuator answered but refused.
    pub fn rejected(command: &str, response: Option<&str>) -> Self {
        Self::ActuatorUnavailable {
            command: command.to_owned(),
            reason: response.unwrap_or("actuator reported failure").to_owned(),
        }
    }

    /// Build an [`CycleError::AnnouncerUnavailable`] for `channel`.
    pub const fn announcer(channel: ChannelId, source: AnnouncerError) -> Self {
        Self::AnnouncerUnavailable { channel, source }
    }

    /// Whether the failure came from the caller's input rather than a
    /// collaborator.
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidSeason(_) | Self::InvalidRequest(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actuator_failures_name_the_command() {
        let err = CycleError::actuator(
            "/weather rain",
            &ActuatorError::Timeout { after_ms: 5000 },
        );
        assert!(err.to_string().contains("/weather rain"));
        assert!(err.to_string().contains("5000ms"));
        assert!(!err.is_client_error());

        let refused = CycleError::rejected("/waterquality FrogPond 0", None);
        assert!(refused.to_string().contains("actuator reported failure"));
    }

    #[test]
    fn announcer_failures_name_the_channel() {
        let err = CycleError::announcer(ChannelId(42), AnnouncerError::Rejected { status: 403 });
        assert!(err.to_string().contains("channel 42"));
        assert!(!err.is_client_error());
    }
}
