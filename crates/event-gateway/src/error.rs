//! Gateway error classification.

use reqwest::StatusCode;
use thiserror::Error;

/// Classified outcome of a failed remote call.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The remote store no longer accepts the credential (HTTP 401).
    ///
    /// The only failure that cascades: the caller must invalidate the
    /// session and discard cached events.
    #[error("Credential rejected by the remote store")]
    Unauthenticated,

    /// The server rejected the payload (other 4xx).
    #[error("Request rejected: {0}")]
    ValidationRejected(String),

    /// The addressed resource does not exist (HTTP 404).
    #[error("Not found")]
    NotFound,

    /// Network failure, timeout, or 5xx. Safe to retry; never mutates
    /// client state.
    #[error("Transient failure: {0}")]
    Transient(String),
}

impl GatewayError {
    /// Returns true if the operation can be retried without side effects.
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Transient(_))
    }

    /// Classify a non-success HTTP status with its response body.
    pub(crate) fn from_status(status: StatusCode, body: &str) -> GatewayError {
        match status {
            StatusCode::UNAUTHORIZED => GatewayError::Unauthenticated,
            StatusCode::NOT_FOUND => GatewayError::NotFound,
            s if s.is_server_error() => {
                GatewayError::Transient(format!("HTTP {}: {}", status, truncate(body)))
            }
            _ => GatewayError::ValidationRejected(server_message(body).unwrap_or_else(|| {
                format!("HTTP {}: {}", status, truncate(body))
            })),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        // Connection failures, timeouts, and undecodable response bodies all
        // land here; none of them carry a classified server verdict.
        GatewayError::Transient(e.to_string())
    }
}

/// Result type alias using GatewayError.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Pull the `message` field out of a JSON error body, if present.
pub(crate) fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(String::from)
}

fn truncate(body: &str) -> &str {
    let end = body
        .char_indices()
        .nth(200)
        .map(|(i, _)| i)
        .unwrap_or(body.len());
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_401_is_unauthenticated() {
        let err = GatewayError::from_status(StatusCode::UNAUTHORIZED, "");
        assert!(matches!(err, GatewayError::Unauthenticated));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_404_is_not_found() {
        let err = GatewayError::from_status(StatusCode::NOT_FOUND, "");
        assert!(matches!(err, GatewayError::NotFound));
    }

    #[test]
    fn test_5xx_is_transient() {
        let err = GatewayError::from_status(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(err.is_transient());
    }

    #[test]
    fn test_other_4xx_is_validation_rejected_with_server_message() {
        let err = GatewayError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"message":"end_time must be after start_time"}"#,
        );
        match err {
            GatewayError::ValidationRejected(msg) => {
                assert_eq!(msg, "end_time must be after start_time");
            }
            other => panic!("Expected ValidationRejected, got {:?}", other),
        }
    }

    #[test]
    fn test_4xx_without_message_field_keeps_status() {
        let err = GatewayError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "not json");
        match err {
            GatewayError::ValidationRejected(msg) => assert!(msg.contains("422")),
            other => panic!("Expected ValidationRejected, got {:?}", other),
        }
    }

    #[test]
    fn test_server_message_extraction() {
        assert_eq!(
            server_message(r#"{"message":"nope"}"#).as_deref(),
            Some("nope")
        );
        assert!(server_message(r#"{"detail":"nope"}"#).is_none());
        assert!(server_message("plain text").is_none());
    }
}
