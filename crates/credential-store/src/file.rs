//! File-backed credential storage.
//!
//! Stores the bearer token at `~/.huddle/token` (or a custom base directory).

use crate::{CredentialStore, StorageError, StorageResult};
use std::path::PathBuf;
use tracing::debug;

/// Token filename under the base directory.
const TOKEN_FILE_NAME: &str = "token";

/// Credential store backed by a file under the user's home directory.
pub struct FileCredentialStore {
    base_dir: PathBuf,
}

impl FileCredentialStore {
    /// Create a store rooted at `~/.huddle`.
    pub fn new() -> StorageResult<Self> {
        let home = dirs::home_dir().ok_or(StorageError::NoStorageDir)?;
        Ok(Self {
            base_dir: home.join(".huddle"),
        })
    }

    /// Create a store rooted at a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    fn token_path(&self) -> PathBuf {
        self.base_dir.join(TOKEN_FILE_NAME)
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, token: &str) -> StorageResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        let path = self.token_path();
        std::fs::write(&path, token)?;

        // Owner-only since the file contains a bearer credential
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
        }

        debug!(path = %path.display(), "Persisted credential");
        Ok(())
    }

    fn load(&self) -> StorageResult<Option<String>> {
        let path = self.token_path();
        if !path.exists() {
            return Ok(None);
        }
        let token = std::fs::read_to_string(&path)?;
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(token.to_string()))
    }

    fn clear(&self) -> StorageResult<()> {
        let path = self.token_path();
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Cleared persisted credential");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
