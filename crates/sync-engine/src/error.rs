//! Sync error types.

use event_gateway::GatewayError;
use thiserror::Error;

/// Error type for sync operations.
///
/// Local precondition failures (`InvalidRange`, `Unauthenticated` with no
/// session) are detected before any network call and never consume a
/// request.
#[derive(Error, Debug)]
pub enum SyncError {
    /// No live session, or the remote store rejected the credential.
    #[error("Not authenticated")]
    Unauthenticated,

    /// Draft has `end <= start`; rejected locally without a round-trip.
    #[error("Event end must be after its start")]
    InvalidRange,

    /// The server rejected the payload.
    #[error("Request rejected: {0}")]
    ValidationRejected(String),

    /// The addressed event does not exist.
    #[error("Event not found")]
    NotFound,

    /// Network failure, timeout, or 5xx. Cache and session are untouched.
    #[error("Transient failure: {0}")]
    Transient(String),
}

impl SyncError {
    /// Returns true if the operation can be retried without side effects.
    pub fn is_transient(&self) -> bool {
        matches!(self, SyncError::Transient(_))
    }
}

impl From<GatewayError> for SyncError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Unauthenticated => SyncError::Unauthenticated,
            GatewayError::ValidationRejected(msg) => SyncError::ValidationRejected(msg),
            GatewayError::NotFound => SyncError::NotFound,
            GatewayError::Transient(msg) => SyncError::Transient(msg),
        }
    }
}

/// Result type alias using SyncError.
pub type SyncResult<T> = Result<T, SyncError>;
