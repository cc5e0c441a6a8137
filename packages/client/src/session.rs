use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use common::UserIdentity;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// The authenticated identity of this client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: Option<UserIdentity>,
    /// Bearer token issued at login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Owner of the session.
///
/// Written by login/logout flows and by the request client when the backend
/// answers 401. A store created with [`SessionStore::load`] writes every
/// change through to its file.
#[derive(Debug, Default)]
pub struct SessionStore {
    state: RwLock<Session>,
    path: Option<PathBuf>,
}

impl SessionStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a persistent store. A missing file yields an empty session.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let session = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Session::default(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), authenticated = session.user.is_some(), "Session loaded");

        Ok(Self {
            state: RwLock::new(session),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn user(&self) -> Option<UserIdentity> {
        self.read().user.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().user.is_some()
    }

    /// Install a freshly logged-in identity.
    pub fn set(&self, user: UserIdentity, token: Option<String>) {
        info!(user_id = user.id, username = %user.username, "Session established");
        *self.write() = Session {
            user: Some(user),
            token,
        };
        self.write_through();
    }

    /// Refresh the identity, keeping the current token.
    pub fn set_user(&self, user: UserIdentity) {
        self.write().user = Some(user);
        self.write_through();
    }

    /// Drop the identity and token. Clearing an empty session is a no-op.
    pub fn clear(&self) {
        {
            let mut state = self.write();
            if state.user.is_none() && state.token.is_none() {
                return;
            }
            *state = Session::default();
        }
        info!("Session cleared");
        self.write_through();
    }

    /// Write the session to its file. In-memory stores do nothing.
    pub fn persist(&self) -> Result<(), SessionError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let bytes = serde_json::to_vec_pretty(&self.snapshot())?;
        let tmp = path.with_extension("tmp");
        if let Err(e) = std::fs::write(&tmp, bytes) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        if let Err(e) = std::fs::rename(&tmp, path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn write_through(&self) {
        if let Err(e) = self.persist() {
            warn!(error = %e, "Failed to persist session");
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
