//! Session persistence: one credential (bearer token + user record) per
//! client, stored durably and restored lazily on first access.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Bearer token plus the user it belongs to. Token and user are persisted
/// together and cleared together; neither ever exists on disk alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub token: String,
    pub user: User,
}

/// Storage for the active session. The token is treated as opaque; expiry is
/// only ever detected through the backend's 401 response.
pub trait SessionStore: Send + Sync {
    /// Store a credential, overwriting any prior one.
    fn attach(&self, credential: Credential) -> Result<(), ClientError>;

    /// The active credential, or `None` when no session is attached.
    fn current(&self) -> Option<Credential>;

    /// Replace only the user record, preserving the token.
    fn update_user(&self, user: User) -> Result<(), ClientError>;

    /// Remove the credential. Clearing an absent session is a no-op.
    fn clear(&self) -> Result<(), ClientError>;
}

/// Directory holding client state, `~/.config/taskflow` unless overridden
/// via `TASKFLOW_CONFIG_DIR`.
pub fn config_dir() -> Result<PathBuf, ClientError> {
    let dir = if let Ok(custom) = std::env::var("TASKFLOW_CONFIG_DIR") {
        PathBuf::from(custom)
    } else {
        let home = std::env::var("HOME")
            .map_err(|_| ClientError::Storage("HOME environment variable not set".to_string()))?;
        PathBuf::from(home).join(".config").join("taskflow")
    };

    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }

    Ok(dir)
}

/// File-backed store: a single `session.json` under the config directory.
pub struct FileSessionStore {
    path: PathBuf,
    // Outer None: not yet restored from disk. Inner Option: restored state.
    cached: Mutex<Option<Option<Credential>>>,
}

impl FileSessionStore {
    pub fn from_env() -> Result<Self, ClientError> {
        Ok(Self::at(config_dir()?.join("session.json")))
    }

    pub fn at(path: PathBuf) -> Self {
        Self {
            path,
            cached: Mutex::new(None),
        }
    }

    fn restore(&self) -> Option<Credential> {
        if !self.path.exists() {
            return None;
        }
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("unreadable session file {}: {err}", self.path.display());
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(credential) => Some(credential),
            Err(err) => {
                tracing::warn!("corrupt session file {}: {err}", self.path.display());
                None
            }
        }
    }

    fn persist(&self, credential: &Credential) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(credential)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn with_cache<R>(&self, f: impl FnOnce(&mut Option<Credential>) -> R) -> R {
        let mut guard = self
            .cached
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if guard.is_none() {
            *guard = Some(self.restore());
        }
        f(guard.as_mut().expect("cache populated above"))
    }
}

impl SessionStore for FileSessionStore {
    fn attach(&self, credential: Credential) -> Result<(), ClientError> {
        self.persist(&credential)?;
        self.with_cache(|slot| *slot = Some(credential));
        Ok(())
    }

    fn current(&self) -> Option<Credential> {
        self.with_cache(|slot| slot.clone())
    }

    fn update_user(&self, user: User) -> Result<(), ClientError> {
        let updated = self.with_cache(|slot| {
            slot.as_mut().map(|credential| {
                credential.user = user;
                credential.clone()
            })
        });
        match updated {
            Some(credential) => self.persist(&credential),
            None => Err(ClientError::validation("no active session to update")),
        }
    }

    fn clear(&self) -> Result<(), ClientError> {
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                return Err(err.into());
            }
        }
        self.with_cache(|slot| *slot = None);
        Ok(())
    }
}

/// In-memory store for tests and embedding.
#[derive(Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<Credential>>,
}

impl SessionStore for MemorySessionStore {
    fn attach(&self, credential: Credential) -> Result<(), ClientError> {
        *self.slot.lock().unwrap_or_else(|p| p.into_inner()) = Some(credential);
        Ok(())
    }

    fn current(&self) -> Option<Credential> {
        self.slot.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn update_user(&self, user: User) -> Result<(), ClientError> {
        let mut slot = self.slot.lock().unwrap_or_else(|p| p.into_inner());
        match slot.as_mut() {
            Some(credential) => {
                credential.user = user;
                Ok(())
            }
            None => Err(ClientError::validation("no active session to update")),
        }
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.slot.lock().unwrap_or_else(|p| p.into_inner()) = None;
        Ok(())
    }
}
