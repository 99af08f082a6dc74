//! Persisted session state: auth token and user profile.
//!
//! The mobile client kept these in on-device key-value storage under the
//! fixed keys `userToken` and `userData`, read ad hoc by every screen. Here
//! the same data lives behind an injected [`SessionProvider`] with a
//! well-defined lifecycle: populated at login, cleared at logout.

use std::fmt;
use std::path::PathBuf;
use std::sync::RwLock;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::types::User;

/// Errors that can occur reading or writing the session store.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Filesystem operation failed.
    #[error("session storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored session is not valid JSON.
    #[error("corrupt session data: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The logged-in session: Bearer token plus cached user profile.
#[derive(Clone)]
pub struct Session {
    /// Backend-issued Bearer token.
    pub token: SecretString,
    /// User profile captured at login.
    pub user: User,
}

impl Session {
    /// Create a session from a freshly issued token and profile.
    #[must_use]
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Self {
            token: SecretString::from(token.into()),
            user,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// On-disk shape, preserving the mobile client's fixed storage keys.
#[derive(Serialize, Deserialize)]
struct DiskSession {
    #[serde(rename = "userToken")]
    token: String,
    #[serde(rename = "userData")]
    user: User,
}

/// Access to the persisted session.
///
/// Populated at login, cleared at logout; everything else only reads.
pub trait SessionProvider: Send + Sync {
    /// Read the current session, if one is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or is corrupt.
    fn get_session(&self) -> Result<Option<Session>, SessionError>;

    /// Replace the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn set_session(&self, session: &Session) -> Result<(), SessionError>;

    /// Remove the stored session (logout).
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be cleared.
    fn clear_session(&self) -> Result<(), SessionError>;
}

// =============================================================================
// File-backed store
// =============================================================================

/// Session store persisted as a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store at the given path. Nothing is touched until the first
    /// read or write.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SessionProvider for FileSessionStore {
    fn get_session(&self) -> Result<Option<Session>, SessionError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionError::Io(e)),
        };

        let disk: DiskSession = serde_json::from_str(&raw)?;
        Ok(Some(Session::new(disk.token, disk.user)))
    }

    fn set_session(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let disk = DiskSession {
            token: session.token.expose_secret().to_owned(),
            user: session.user.clone(),
        };
        let raw = serde_json::to_string(&disk)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    fn clear_session(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Io(e)),
        }
    }
}

// =============================================================================
// In-memory store (tests, ephemeral sessions)
// =============================================================================

/// Session store held in memory; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionProvider for MemorySessionStore {
    fn get_session(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.slot.read().map(|s| s.clone()).unwrap_or(None))
    }

    fn set_session(&self, session: &Session) -> Result<(), SessionError> {
        if let Ok(mut slot) = self.slot.write() {
            *slot = Some(session.clone());
        }
        Ok(())
    }

    fn clear_session(&self) -> Result<(), SessionError> {
        if let Ok(mut slot) = self.slot.write() {
            *slot = None;
        }
        Ok(())
    }
}
