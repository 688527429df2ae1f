//! Durable credential storage for the Huddle calendar client.
//!
//! The session layer persists exactly one bearer token between runs. This
//! crate provides the storage abstraction plus two implementations:
//! - [`FileCredentialStore`]: token file under the config directory, 0600
//! - [`MemoryCredentialStore`]: in-memory store for tests

mod file;
mod memory;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

use thiserror::Error;

/// Error type for credential storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Could not resolve a storage location on this platform
    #[error("Could not determine storage directory")]
    NoStorageDir,

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for durable credential storage backends.
///
/// Only the session layer touches this; the transport layer receives the
/// credential as an explicit parameter and never reads storage itself.
pub trait CredentialStore: Send + Sync {
    /// Persist the raw token, replacing any previous one.
    fn save(&self, token: &str) -> StorageResult<()>;

    /// Load the persisted token, if any.
    fn load(&self) -> StorageResult<Option<String>>;

    /// Remove the persisted token. Removing an absent token is not an error.
    fn clear(&self) -> StorageResult<()>;
}
