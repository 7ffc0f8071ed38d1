//! Persistence for the Session Token. The token survives restarts until an
//! explicit logout or a 401 clears it. Only the token itself is stored, under
//! the well-known key `token`.

use crate::client::ClientError;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

pub const TOKEN_KEY: &str = "token";

pub trait TokenStore {
    /// # Errors
    /// Returns `Storage` if the backing store cannot be read.
    fn load(&self) -> Result<Option<SecretString>, ClientError>;

    /// # Errors
    /// Returns `Storage` if the token cannot be written.
    fn save(&mut self, token: &SecretString) -> Result<(), ClientError>;

    /// Removing an absent token is not an error.
    ///
    /// # Errors
    /// Returns `Storage` if the token cannot be removed.
    fn clear(&mut self) -> Result<(), ClientError>;
}

#[derive(Serialize, Deserialize)]
struct StoredToken {
    token: String,
}

/// File-backed token storage, one JSON object per file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<SecretString>, ClientError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        // An unreadable token is treated as signed out; the next save or
        // clear replaces the file.
        let stored: StoredToken = match serde_json::from_str(&contents) {
            Ok(stored) => stored,
            Err(err) => {
                warn!("ignoring invalid token file {}: {err}", self.path.display());
                return Ok(None);
            }
        };

        if stored.token.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(SecretString::from(stored.token)))
    }

    fn save(&mut self, token: &SecretString) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let payload = serde_json::to_string(&StoredToken {
            token: token.expose_secret().to_string(),
        })
        .map_err(|err| ClientError::Storage(format!("failed to encode token: {err}")))?;

        write_private(&self.path, payload.as_bytes())?;

        debug!("session token saved to {}", self.path.display());

        Ok(())
    }

    fn clear(&mut self) -> Result<(), ClientError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("session token removed from {}", self.path.display());
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Writes the file readable by the owner only. The mode is set at creation
/// and re-applied for files created earlier with wider permissions.
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> Result<(), ClientError> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)?;
    Ok(())
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> Result<(), ClientError> {
    fs::write(path, contents)?;
    Ok(())
}

/// In-process token storage.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Option<SecretString>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Some(SecretString::from(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<SecretString>, ClientError> {
        Ok(self
            .token
            .as_ref()
            .map(|token| SecretString::from(token.expose_secret().to_string())))
    }

    fn save(&mut self, token: &SecretString) -> Result<(), ClientError> {
        self.token = Some(SecretString::from(token.expose_secret().to_string()));
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ClientError> {
        self.token = None;
        Ok(())
    }
}
