//! Actuator adapters.
//!
//! Uses enum dispatch instead of trait objects because the core's
//! [`Actuator`] trait has async methods, which are not dyn-compatible.
//!
//! The HTTP adapter talks to a small command bridge sitting next to the
//! game server: it POSTs `{"command": "..."}` and expects
//! `{"ok": bool, "response": string?}` back. How the bridge reaches the
//! game server is its own business.

use std::time::Duration;

use almanac_core::config::{ActuatorConfig, ActuatorKind};
use almanac_core::{Actuator, ActuatorError, ActuatorReply};

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Unified backend enum
// ---------------------------------------------------------------------------

/// An actuator chosen at runtime from configuration.
pub enum ActuatorBackend {
    /// Dry run: log every command and report success.
    Log(LogActuator),
    /// Forward commands to an HTTP bridge.
    Http(HttpActuator),
}

impl ActuatorBackend {
    /// Build the configured actuator.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Adapter`] if the HTTP client cannot be built.
    pub fn from_config(config: &ActuatorConfig) -> Result<Self, EngineError> {
        match config.kind {
            ActuatorKind::Log => Ok(Self::Log(LogActuator)),
            ActuatorKind::Http => Ok(Self::Http(HttpActuator::new(config)?)),
        }
    }
}

impl Actuator for ActuatorBackend {
    async fn send_command(&self, command: &str) -> Result<ActuatorReply, ActuatorError> {
        match self {
            Self::Log(actuator) => actuator.send_command(command).await,
            Self::Http(actuator) => actuator.send_command(command).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Log(actuator) => actuator.name(),
            Self::Http(actuator) => actuator.name(),
        }
    }
}

// ---------------------------------------------------------------------------
// Log
// ---------------------------------------------------------------------------

/// Logs commands without sending them anywhere.
pub struct LogActuator;

impl Actuator for LogActuator {
    async fn send_command(&self, command: &str) -> Result<ActuatorReply, ActuatorError> {
        tracing::info!(command, "Dry run, command not sent");
        Ok(ActuatorReply::ok())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

// ---------------------------------------------------------------------------
// HTTP bridge
// ---------------------------------------------------------------------------

/// Sends commands to an HTTP command bridge.
pub struct HttpActuator {
    client: reqwest::Client,
    url: String,
    timeout_ms: u64,
}

#[derive(Debug, serde::Deserialize)]
struct BridgeReply {
    ok: bool,
    #[serde(default)]
    response: Option<String>,
}

impl HttpActuator {
    /// Create an HTTP actuator with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Adapter`] if the HTTP client cannot be built.
    pub fn new(config: &ActuatorConfig) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| EngineError::Adapter {
                message: format!("actuator HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            url: config.url.clone(),
            timeout_ms: config.timeout_ms,
        })
    }
}

impl Actuator for HttpActuator {
    async fn send_command(&self, command: &str) -> Result<ActuatorReply, ActuatorError> {
        let body = serde_json::json!({ "command": command });

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ActuatorError::Timeout {
                        after_ms: self.timeout_ms,
                    }
                } else {
                    ActuatorError::Transport(format!("bridge request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(ActuatorError::Transport(format!(
                "bridge returned {status}: {error_body}"
            )));
        }

        let reply: BridgeReply = response
            .json()
            .await
            .map_err(|e| ActuatorError::Malformed(format!("bridge reply: {e}")))?;

        Ok(ActuatorReply {
            success: reply.ok,
            response: reply.response,
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::Json;
    use axum::Router;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;

    use super::*;

    type Seen = Arc<Mutex<Vec<String>>>;

    async fn bridge(
        State(seen): State<Seen>,
        Json(body): Json<serde_json::Value>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        let command = body["command"].as_str().unwrap_or_default().to_owned();
        seen.lock().await.push(command.clone());
        if command.contains("broken") {
            return (StatusCode::BAD_GATEWAY, Json(serde_json::json!({})));
        }
        let ok = !command.contains("nope");
        (
            StatusCode::OK,
            Json(serde_json::json!({ "ok": ok, "response": "done" })),
        )
    }

    async fn spawn_bridge() -> (String, Seen) {
        let seen: Seen = Arc::default();
        let app = Router::new()
            .route("/command", post(bridge))
            .with_state(Arc::clone(&seen));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/command"), seen)
    }

    fn http_config(url: String) -> ActuatorConfig {
        ActuatorConfig {
            kind: ActuatorKind::Http,
            url,
            timeout_ms: 2000,
        }
    }

    #[tokio::test]
    async fn log_actuator_always_succeeds() {
        let backend = ActuatorBackend::from_config(&ActuatorConfig::default()).unwrap();
        assert_eq!(backend.name(), "log");
        let reply = backend.send_command("/weather rain").await.unwrap();
        assert!(reply.success);
    }

    #[tokio::test]
    async fn http_actuator_posts_command() {
        let (url, seen) = spawn_bridge().await;
        let backend = ActuatorBackend::from_config(&http_config(url)).unwrap();

        let reply = backend.send_command("/weather fog").await.unwrap();

        assert!(reply.success);
        assert_eq!(reply.response.as_deref(), Some("done"));
        assert_eq!(seen.lock().await.as_slice(), ["/weather fog".to_owned()]);
    }

    #[tokio::test]
    async fn http_actuator_reports_rejection() {
        let (url, _) = spawn_bridge().await;
        let backend = HttpActuator::new(&http_config(url)).unwrap();

        let reply = backend.send_command("/nope").await.unwrap();
        assert!(!reply.success);
    }

    #[tokio::test]
    async fn http_actuator_maps_bad_status_to_transport() {
        let (url, _) = spawn_bridge().await;
        let backend = HttpActuator::new(&http_config(url)).unwrap();

        let err = backend.send_command("/broken").await.unwrap_err();
        assert!(matches!(err, ActuatorError::Transport(_)));
    }

    #[tokio::test]
    async fn http_actuator_without_bridge_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let backend = HttpActuator::new(&http_config(format!("http://{addr}/command"))).unwrap();

        let err = backend.send_command("/weather rain").await.unwrap_err();
        assert!(matches!(err, ActuatorError::Transport(_)));
    }
}
