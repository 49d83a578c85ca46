//! Persisted bearer-token store.
//!
//! The HTTP layer reads the token from here for every call and clears it when
//! the backend answers 401.

use crate::consts::binding_consts::{CONFIG_DIR, SESSION_FILE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::{fs, io};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl Session {
    /// Loads a session from a JSON file at the given path.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if reading from file fails or JSON is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self, io::Error> {
        let buf = fs::read(path)?;
        let session: Session = serde_json::from_slice(&buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(session)
    }

    /// Saves the session to a JSON file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Returns `$HOME/.dashboard-binding/session.json`.
pub fn default_session_path() -> Result<PathBuf, io::Error> {
    let home = home::home_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Home directory not found"))?;
    Ok(home.join(CONFIG_DIR).join(SESSION_FILE))
}

/// Shared handle to the current session, optionally backed by a file.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    path: Option<PathBuf>,
    inner: Arc<RwLock<Session>>,
}

impl SessionStore {
    /// A store that is never persisted.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens the store at `path`; a missing file means an empty session.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, io::Error> {
        let path = path.into();
        let session = if path.exists() {
            Session::load_from_file(&path)?
        } else {
            Session::default()
        };
        Ok(Self {
            path: Some(path),
            inner: Arc::new(RwLock::new(session)),
        })
    }

    pub fn token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }

    pub fn username(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .username
            .clone()
    }

    /// Stores a token and persists it.
    pub fn set_token(&self, token: String, username: Option<String>) -> Result<(), io::Error> {
        let snapshot = {
            let mut session = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            session.token = Some(token);
            session.username = username;
            session.clone()
        };
        match &self.path {
            Some(path) => snapshot.save(path),
            None => Ok(()),
        }
    }

    /// Forgets the token and deletes the persisted file.
    pub fn clear(&self) -> Result<(), io::Error> {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Session::default();
        match &self.path {
            Some(path) if path.exists() => fs::remove_file(path),
            _ => Ok(()),
        }
    }
}
