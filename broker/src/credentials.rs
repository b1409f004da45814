//! Session-scoped credential storage
//!
//! Maps a session identifier to the username/password pair used to
//! authenticate against the backend. A process-wide default pair, when
//! configured, is returned for sessions that never set their own.
//!
//! # Key Features
//!
//! - **Session isolation**: a pair set for one session is never visible to another
//! - **Short critical sections**: one lock around one map, no I/O while held
//! - **Copies out**: callers receive clones, never references into the map
//!
//! # Usage
//!
//! ```ignore
//! store.set("client-1", "alice", "s3cret");
//! let pair = store.get("client-1")?;
//! store.clear("client-1");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, instrument};

use crate::errors::BrokerError;

#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub user: String,
    pub secret: String,
}

impl CredentialPair {
    pub fn new(user: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("user", &self.user)
            .field("secret", &"<redacted>")
            .finish()
    }
}

pub struct CredentialStore {
    credentials: RwLock<HashMap<String, CredentialPair>>, // session_id -> pair
    default_credentials: Option<CredentialPair>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self {
            credentials: RwLock::new(HashMap::new()),
            default_credentials: None,
        }
    }

    /// Store with a process-wide fallback pair
    pub fn with_default(default_credentials: Option<CredentialPair>) -> Self {
        if let Some(pair) = &default_credentials {
            info!("Default credentials configured for user {}", pair.user);
        }
        Self {
            credentials: RwLock::new(HashMap::new()),
            default_credentials,
        }
    }

    // A writer that panicked cannot leave the map half-updated (single insert/remove),
    // so a poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CredentialPair>> {
        self.credentials
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CredentialPair>> {
        self.credentials
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert or overwrite the pair for a session
    #[instrument(skip(self, secret), fields(session = %session_id, user = %user))]
    pub fn set(&self, session_id: &str, user: &str, secret: &str) {
        let pair = CredentialPair::new(user, secret);
        let replaced = self.write().insert(session_id.to_string(), pair).is_some();
        info!(
            "{} credentials for session {}",
            if replaced { "Replaced" } else { "Stored" },
            session_id
        );
    }

    /// Explicit pair for the session, else the default pair
    pub fn get(&self, session_id: &str) -> Result<CredentialPair, BrokerError> {
        if let Some(pair) = self.read().get(session_id) {
            return Ok(pair.clone());
        }

        if let Some(pair) = &self.default_credentials {
            debug!("Session {} falls back to default credentials", session_id);
            return Ok(pair.clone());
        }

        Err(BrokerError::CredentialsNotFound {
            session_id: session_id.to_string(),
        })
    }

    pub fn has(&self, session_id: &str) -> bool {
        self.default_credentials.is_some() || self.read().contains_key(session_id)
    }

    /// Remove the session's explicit pair. Idempotent.
    #[instrument(skip(self), fields(session = %session_id))]
    pub fn clear(&self, session_id: &str) {
        if self.write().remove(session_id).is_some() {
            info!("Cleared credentials for session {}", session_id);
        }
    }

    /// Username of the session's explicit pair, ignoring the default
    pub fn explicit_user(&self, session_id: &str) -> Option<String> {
        self.read().get(session_id).map(|pair| pair.user.clone())
    }

    pub fn has_default(&self) -> bool {
        self.default_credentials.is_some()
    }

    /// Number of sessions holding explicit credentials
    pub fn session_count(&self) -> usize {
        self.read().len()
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}
