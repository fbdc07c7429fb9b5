//! Error types for the operator API.
//!
//! [`OperatorError`] wraps the core's [`CycleError`] and request parsing
//! failures, and converts into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use almanac_core::CycleError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the operator API layer.
#[derive(Debug, thiserror::Error)]
pub enum OperatorError {
    /// The administrative operation failed.
    #[error(transparent)]
    Cycle(#[from] CycleError),

    /// The request body was well-formed JSON but out of range.
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl OperatorError {
    /// HTTP status for this error.
    ///
    /// A store outage is reported as 503 so callers can retry; rejected
    /// input is 400; anything else is 500.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Cycle(CycleError::StoreUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Cycle(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Cycle(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for OperatorError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, status = status.as_u16(), "Operator request failed");
        }

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn unknown_season_is_bad_request() {
        let err = OperatorError::from(CycleError::InvalidSeason(almanac_types::UnknownSeason(
            "monsoon".to_owned(),
        )));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn template_failure_is_internal() {
        let err = OperatorError::from(CycleError::Template("boom".to_owned()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn out_of_range_body_is_bad_request() {
        let err = OperatorError::BadRequest("hours must be positive".to_owned());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
