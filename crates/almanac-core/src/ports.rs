//! External capabilities the cycles drive.
//!
//! The core never talks to the game server or the chat platform directly.
//! It sends commands through an [`Actuator`] and posts text through an
//! [`Announcer`]; the engine binary supplies the concrete adapters.
//!
//! [`RecordingActuator`] and [`RecordingAnnouncer`] are in-process doubles
//! that record every call and can be switched into failure modes. They back
//! the dry-run tests across the workspace.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// A chat channel identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Actuator
// ---------------------------------------------------------------------------

/// What the game server said about a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActuatorReply {
    /// Whether the command was applied.
    pub success: bool,
    /// Free-form reply text, if any.
    pub response: Option<String>,
}

impl ActuatorReply {
    /// A successful reply with no text.
    pub const fn ok() -> Self {
        Self {
            success: true,
            response: None,
        }
    }
}

/// Errors reaching the actuator at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActuatorError {
    /// The connection or request failed.
    #[error("actuator transport failed: {0}")]
    Transport(String),

    /// No reply within the configured timeout.
    #[error("actuator timed out after {after_ms}ms")]
    Timeout {
        /// Timeout that elapsed.
        after_ms: u64,
    },

    /// The actuator answered with something unparseable.
    #[error("actuator reply malformed: {0}")]
    Malformed(String),
}

/// Applies commands to the live world.
pub trait Actuator: Send + Sync {
    /// Send one command and wait for its reply.
    fn send_command(
        &self,
        command: &str,
    ) -> impl Future<Output = Result<ActuatorReply, ActuatorError>> + Send;

    /// Short adapter name for logs.
    fn name(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// Announcer
// ---------------------------------------------------------------------------

/// Errors posting to or reading from the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnnouncerError {
    /// The channel does not exist or is not visible.
    #[error("channel {0} not found")]
    ChannelMissing(ChannelId),

    /// The request failed.
    #[error("announcer transport failed: {0}")]
    Transport(String),

    /// The platform rejected the request.
    #[error("announcer rejected request with status {status}")]
    Rejected {
        /// HTTP-style status code.
        status: u16,
    },
}

/// Posts human-readable notifications.
pub trait Announcer: Send + Sync {
    /// Post `text` to `channel`.
    fn send(
        &self,
        channel: ChannelId,
        text: &str,
    ) -> impl Future<Output = Result<(), AnnouncerError>> + Send;

    /// Up to `limit` most recent messages in `channel`, newest first.
    fn recent_messages(
        &self,
        channel: ChannelId,
        limit: u8,
    ) -> impl Future<Output = Result<Vec<String>, AnnouncerError>> + Send;

    /// Short adapter name for logs.
    fn name(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// Recording doubles
// ---------------------------------------------------------------------------

/// An [`Actuator`] that records commands instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingActuator {
    commands: Mutex<Vec<String>>,
    fail_all: AtomicBool,
    reject_containing: Mutex<Option<String>>,
}

impl RecordingActuator {
    /// A double that accepts every command.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every subsequent command at the transport level.
    pub fn set_failing(&self, failing: bool) {
        self.fail_all.store(failing, Ordering::Release);
    }

    /// Answer `success: false` for commands containing `needle`.
    pub async fn reject_containing(&self, needle: Option<&str>) {
        *self.reject_containing.lock().await = needle.map(str::to_owned);
    }

    /// Every command received so far, including failed ones.
    pub async fn commands(&self) -> Vec<String> {
        self.commands.lock().await.clone()
    }

    /// Forget recorded commands.
    pub async fn clear(&self) {
        self.commands.lock().await.clear();
    }
}

impl Actuator for RecordingActuator {
    async fn send_command(&self, command: &str) -> Result<ActuatorReply, ActuatorError> {
        self.commands.lock().await.push(command.to_owned());
        if self.fail_all.load(Ordering::Acquire) {
            return Err(ActuatorError::Transport("recording actuator offline".to_owned()));
        }
        let rejected = self
            .reject_containing
            .lock()
            .await
            .as_deref()
            .is_some_and(|needle| command.contains(needle));
        if rejected {
            return Ok(ActuatorReply {
                success: false,
                response: Some("rejected".to_owned()),
            });
        }
        Ok(ActuatorReply::ok())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// An [`Announcer`] that keeps posted messages in memory.
///
/// `recent_messages` answers from what was posted, so de-duplication works
/// against it the same way it does against a real channel.
#[derive(Debug, Default)]
pub struct RecordingAnnouncer {
    posted: Mutex<Vec<(ChannelId, String)>>,
    fail_all: AtomicBool,
}

impl RecordingAnnouncer {
    /// A double that accepts every message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every subsequent post and history read.
    pub fn set_failing(&self, failing: bool) {
        self.fail_all.store(failing, Ordering::Release);
    }

    /// Every successfully posted message, oldest first.
    pub async fn messages(&self) -> Vec<(ChannelId, String)> {
        self.posted.lock().await.clone()
    }

    /// Messages posted to `channel`, oldest first.
    pub async fn messages_in(&self, channel: ChannelId) -> Vec<String> {
        self.posted
            .lock()
            .await
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, text)| text.clone())
            .collect()
    }

    fn check_available(&self) -> Result<(), AnnouncerError> {
        if self.fail_all.load(Ordering::Acquire) {
            return Err(AnnouncerError::Transport("recording announcer offline".to_owned()));
        }
        Ok(())
    }
}

impl Announcer for RecordingAnnouncer {
    async fn send(&self, channel: ChannelId, text: &str) -> Result<(), AnnouncerError> {
        self.check_available()?;
        self.posted.lock().await.push((channel, text.to_owned()));
        Ok(())
    }

    async fn recent_messages(
        &self,
        channel: ChannelId,
        limit: u8,
    ) -> Result<Vec<String>, AnnouncerError> {
        self.check_available()?;
        Ok(self
            .posted
            .lock()
            .await
            .iter()
            .rev()
            .filter(|(c, _)| *c == channel)
            .take(usize::from(limit))
            .map(|(_, text)| text.clone())
            .collect())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
