//! Session error types.

use thiserror::Error;

/// Error type for session operations.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Token could not be parsed into the expected claim shape.
    ///
    /// This is distinct from an expired credential: expiry is a business
    /// condition evaluated by the caller, not a decode failure.
    #[error("Malformed credential: {0}")]
    MalformedCredential(String),

    /// No session exists
    #[error("Not logged in")]
    NotLoggedIn,

    /// Invalid state transition in the session FSM
    #[error("Invalid session state transition: {0}")]
    InvalidStateTransition(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] credential_store::StorageError),
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;
