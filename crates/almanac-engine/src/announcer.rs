//! Announcer adapters.
//!
//! Same enum dispatch as the actuator. The Discord adapter uses the plain
//! REST API with a bot token: it posts messages and reads recent channel
//! history for announcement de-duplication. No gateway connection is held.

use std::time::Duration;

use almanac_core::config::{AnnouncerConfig, AnnouncerKind};
use almanac_core::{Announcer, AnnouncerError, ChannelId};

use crate::error::EngineError;

/// Discord rejects message content longer than this many characters.
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

// ---------------------------------------------------------------------------
// Unified backend enum
// ---------------------------------------------------------------------------

/// An announcer chosen at runtime from configuration.
pub enum AnnouncerBackend {
    /// Write announcements to the log only.
    Log(LogAnnouncer),
    /// Post to Discord channels.
    Discord(DiscordAnnouncer),
}

impl AnnouncerBackend {
    /// Build the configured announcer.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Adapter`] if the Discord adapter is selected
    /// without a bot token, or the HTTP client cannot be built.
    pub fn from_config(config: &AnnouncerConfig) -> Result<Self, EngineError> {
        match config.kind {
            AnnouncerKind::Log => Ok(Self::Log(LogAnnouncer)),
            AnnouncerKind::Discord => Ok(Self::Discord(DiscordAnnouncer::new(config)?)),
        }
    }
}

impl Announcer for AnnouncerBackend {
    async fn send(&self, channel: ChannelId, text: &str) -> Result<(), AnnouncerError> {
        match self {
            Self::Log(announcer) => announcer.send(channel, text).await,
            Self::Discord(announcer) => announcer.send(channel, text).await,
        }
    }

    async fn recent_messages(
        &self,
        channel: ChannelId,
        limit: u8,
    ) -> Result<Vec<String>, AnnouncerError> {
        match self {
            Self::Log(announcer) => announcer.recent_messages(channel, limit).await,
            Self::Discord(announcer) => announcer.recent_messages(channel, limit).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Log(announcer) => announcer.name(),
            Self::Discord(announcer) => announcer.name(),
        }
    }
}

// ---------------------------------------------------------------------------
// Log
// ---------------------------------------------------------------------------

/// Logs announcements. Has no history, so nothing is ever de-duplicated.
pub struct LogAnnouncer;

impl Announcer for LogAnnouncer {
    async fn send(&self, channel: ChannelId, text: &str) -> Result<(), AnnouncerError> {
        tracing::info!(channel = %channel, text, "Announcement");
        Ok(())
    }

    async fn recent_messages(
        &self,
        _channel: ChannelId,
        _limit: u8,
    ) -> Result<Vec<String>, AnnouncerError> {
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

// ---------------------------------------------------------------------------
// Discord
// ---------------------------------------------------------------------------

/// Posts to Discord through the REST API.
pub struct DiscordAnnouncer {
    client: reqwest::Client,
    api_base: String,
    token: String,
}

#[derive(Debug, serde::Deserialize)]
struct DiscordMessage {
    #[serde(default)]
    content: String,
}

impl DiscordAnnouncer {
    /// Create a Discord announcer.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Adapter`] if no bot token is configured or the
    /// HTTP client cannot be built.
    pub fn new(config: &AnnouncerConfig) -> Result<Self, EngineError> {
        if config.bot_token.trim().is_empty() {
            return Err(EngineError::Adapter {
                message: "discord announcer needs a bot token (DISCORD_BOT_TOKEN)".to_owned(),
            });
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| EngineError::Adapter {
                message: format!("discord HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            token: config.bot_token.clone(),
        })
    }

    fn messages_url(&self, channel: ChannelId) -> String {
        format!("{}/channels/{channel}/messages", self.api_base)
    }
}

/// Map a non-success Discord status to an [`AnnouncerError`].
fn rejection(channel: ChannelId, status: reqwest::StatusCode) -> AnnouncerError {
    if status == reqwest::StatusCode::NOT_FOUND {
        AnnouncerError::ChannelMissing(channel)
    } else {
        AnnouncerError::Rejected {
            status: status.as_u16(),
        }
    }
}

/// Split `text` into pieces Discord will accept, preferring line breaks.
///
/// Lines longer than the limit are cut at character boundaries.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.split_inclusive('\n') {
        if current.chars().count().saturating_add(line.chars().count()) > limit
            && !current.is_empty()
        {
            chunks.push(std::mem::take(&mut current));
        }
        if line.chars().count() <= limit {
            current.push_str(line);
            continue;
        }
        let chars: Vec<char> = line.chars().collect();
        for piece in chars.chunks(limit) {
            chunks.push(piece.iter().collect());
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

impl Announcer for DiscordAnnouncer {
    async fn send(&self, channel: ChannelId, text: &str) -> Result<(), AnnouncerError> {
        let url = self.messages_url(channel);

        for chunk in split_message(text, DISCORD_MESSAGE_LIMIT) {
            let body = serde_json::json!({ "content": chunk });
            let response = self
                .client
                .post(&url)
                .header("Authorization", format!("Bot {}", self.token))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await
                .map_err(|e| AnnouncerError::Transport(format!("discord request failed: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                tracing::warn!(channel = %channel, status = status.as_u16(), "Discord rejected message");
                return Err(rejection(channel, status));
            }
        }
        Ok(())
    }

    async fn recent_messages(
        &self,
        channel: ChannelId,
        limit: u8,
    ) -> Result<Vec<String>, AnnouncerError> {
        let response = self
            .client
            .get(self.messages_url(channel))
            .header("Authorization", format!("Bot {}", self.token))
            .query(&[("limit", limit.clamp(1, 100))])
            .send()
            .await
            .map_err(|e| AnnouncerError::Transport(format!("discord request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejection(channel, status));
        }

        let messages: Vec<DiscordMessage> = response
            .json()
            .await
            .map_err(|e| AnnouncerError::Transport(format!("discord response parse failed: {e}")))?;

        // Discord returns newest first already.
        Ok(messages.into_iter().map(|m| m.content).collect())
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::Json;
    use axum::Router;
    use axum::extract::{Path, Query, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct FakeDiscord {
        posted: Mutex<Vec<(u64, String)>>,
    }

    #[derive(serde::Deserialize)]
    struct LimitQuery {
        limit: usize,
    }

    async fn create_message(
        State(fake): State<Arc<FakeDiscord>>,
        Path(channel): Path<u64>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> StatusCode {
        if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bot secret") {
            return StatusCode::UNAUTHORIZED;
        }
        if channel == 404 {
            return StatusCode::NOT_FOUND;
        }
        let content = body["content"].as_str().unwrap_or_default().to_owned();
        fake.posted.lock().await.push((channel, content));
        StatusCode::OK
    }

    async fn list_messages(
        State(fake): State<Arc<FakeDiscord>>,
        Path(channel): Path<u64>,
        Query(query): Query<LimitQuery>,
    ) -> Json<serde_json::Value> {
        let posted = fake.posted.lock().await;
        let newest_first: Vec<serde_json::Value> = posted
            .iter()
            .rev()
            .filter(|(c, _)| *c == channel)
            .take(query.limit)
            .map(|(_, content)| serde_json::json!({ "id": "1", "content": content }))
            .collect();
        Json(serde_json::Value::Array(newest_first))
    }

    async fn spawn_fake() -> (String, Arc<FakeDiscord>) {
        let fake = Arc::new(FakeDiscord::default());
        let app = Router::new()
            .route(
                "/channels/{id}/messages",
                get(list_messages).post(create_message),
            )
            .with_state(Arc::clone(&fake));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/"), fake)
    }

    fn discord_config(api_base: String, token: &str) -> AnnouncerConfig {
        AnnouncerConfig {
            kind: AnnouncerKind::Discord,
            bot_token: token.to_owned(),
            api_base,
            timeout_ms: 2000,
        }
    }

    #[test]
    fn discord_needs_a_token() {
        let config = discord_config("http://localhost".to_owned(), " ");
        assert!(AnnouncerBackend::from_config(&config).is_err());
    }

    #[test]
    fn short_text_is_one_message() {
        assert_eq!(split_message("hello\nworld", 2000), vec!["hello\nworld"]);
    }

    #[test]
    fn long_text_splits_on_lines() {
        let text = "aaaa\nbbbb\ncccc";
        assert_eq!(split_message(text, 10), vec!["aaaa\nbbbb\n", "cccc"]);
    }

    #[test]
    fn overlong_line_is_cut() {
        let chunks = split_message(&"x".repeat(25), 10);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
    }

    #[tokio::test]
    async fn log_announcer_has_no_history() {
        let backend = AnnouncerBackend::from_config(&AnnouncerConfig::default()).unwrap();
        backend.send(ChannelId(1), "hello").await.unwrap();
        assert!(backend.recent_messages(ChannelId(1), 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn discord_posts_and_reads_back_newest_first() {
        let (base, fake) = spawn_fake().await;
        let backend = AnnouncerBackend::from_config(&discord_config(base, "secret")).unwrap();

        backend.send(ChannelId(7), "first").await.unwrap();
        backend.send(ChannelId(7), "second").await.unwrap();
        backend.send(ChannelId(8), "elsewhere").await.unwrap();

        let recent = backend.recent_messages(ChannelId(7), 5).await.unwrap();
        assert_eq!(recent, vec!["second", "first"]);
        assert_eq!(fake.posted.lock().await.len(), 3);
    }

    #[tokio::test]
    async fn discord_unknown_channel_is_missing() {
        let (base, _) = spawn_fake().await;
        let backend = DiscordAnnouncer::new(&discord_config(base, "secret")).unwrap();

        let err = backend.send(ChannelId(404), "hello").await.unwrap_err();
        assert_eq!(err, AnnouncerError::ChannelMissing(ChannelId(404)));
    }

    #[tokio::test]
    async fn discord_bad_token_is_rejected() {
        let (base, _) = spawn_fake().await;
        let backend = DiscordAnnouncer::new(&discord_config(base, "wrong")).unwrap();

        let err = backend.send(ChannelId(7), "hello").await.unwrap_err();
        assert_eq!(err, AnnouncerError::Rejected { status: 401 });
    }
}
