//! Session context and its persistence.
//!
//! The session is an explicit value handed to whatever performs fetches.
//! The non-secret part (user id, role, profile) is stored as JSON in the
//! config directory; the bearer token lives in the system keyring.

pub mod credentials;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use credentials::{CredentialError, CredentialResult};

use crate::error::Result;
use crate::model::{Role, UserId, UserRef};

/// File name of the persisted session profile.
const SESSION_FILE: &str = "session.json";

/// Authenticated session of the current user.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Bearer token sent with every authenticated request.
    pub token: String,
    /// Identifier of the current user.
    pub user_id: UserId,
    /// Role of the current user, if known.
    pub role: Option<Role>,
    /// Profile of the current user.
    pub user: Option<UserRef>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("role", &self.role)
            .field("user", &self.user)
            .finish()
    }
}

impl SessionContext {
    /// Creates a session for an authenticated user.
    #[must_use]
    pub fn new(token: impl Into<String>, user: UserRef) -> Self {
        Self {
            token: token.into(),
            user_id: user.id,
            role: user.role,
            user: Some(user),
        }
    }

    /// Creates a session from a bare token and user id.
    #[must_use]
    pub fn with_token(token: impl Into<String>, user_id: UserId) -> Self {
        Self {
            token: token.into(),
            user_id,
            role: None,
            user: None,
        }
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Non-secret part of the session as written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredSession {
    user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<UserRef>,
}

/// Persists sessions across runs.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Creates a store rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the session file.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    /// Saves the session: profile to disk, token to the keyring.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the keyring fails.
    pub fn save(&self, session: &SessionContext) -> Result<()> {
        self.save_profile(session)?;
        credentials::store_token(session.user_id, &session.token)?;
        info!("Session saved for user {}", session.user_id);
        Ok(())
    }

    /// Loads the saved session.
    ///
    /// Returns `Ok(None)` if no profile is stored or its token is gone.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or the keyring fails.
    pub fn load(&self) -> Result<Option<SessionContext>> {
        let Some(stored) = self.load_profile()? else {
            return Ok(None);
        };
        let Some(token) = credentials::get_token(stored.user_id)? else {
            debug!("Session profile present but no token for user {}", stored.user_id);
            return Ok(None);
        };
        Ok(Some(SessionContext {
            token,
            user_id: stored.user_id,
            role: stored.role,
            user: stored.user,
        }))
    }

    /// Removes the saved session and its token (logout).
    ///
    /// An unreadable profile is still removed; its keyring entry is left
    /// alone since the owning user is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be removed or the keyring fails.
    pub fn clear(&self) -> Result<()> {
        match self.load_profile() {
            Ok(Some(stored)) => credentials::delete_token(stored.user_id)?,
            Ok(None) => {}
            Err(e) => warn!("Discarding unreadable session profile: {e}"),
        }
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        info!("Session cleared");
        Ok(())
    }

    fn save_profile(&self, session: &SessionContext) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let stored = StoredSession {
            user_id: session.user_id,
            role: session.role,
            user: session.user.clone(),
        };
        let contents = serde_json::to_string_pretty(&stored)?;
        std::fs::write(self.session_path(), contents)?;
        Ok(())
    }

    fn load_profile(&self) -> Result<Option<StoredSession>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }
}
