//! In-memory credential storage for tests.

use crate::{CredentialStore, StorageResult};
use std::sync::Mutex;

/// Credential store that keeps the token in memory.
///
/// Useful in tests and anywhere persistence across runs is not wanted.
#[derive(Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn save(&self, token: &str) -> StorageResult<()> {
        *self.token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    fn load(&self) -> StorageResult<Option<String>> {
        Ok(self.token.lock().unwrap().clone())
    }

    fn clear(&self) -> StorageResult<()> {
        *self.token.lock().unwrap() = None;
        Ok(())
    }
}
