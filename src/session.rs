//! Session provider.
//!
//! The signed-in session is an explicit object handed to whoever needs it,
//! with a defined lifecycle:
//!
//! 1. **Created** at process start in the `Loading` state.
//! 2. **Resolved** from the session file; an expired access token is
//!    refreshed, a failed refresh ends up `Unauthenticated`.
//! 3. **Refreshed** on every credential change (sign-in, sign-up, token
//!    refresh), each of which rewrites the session file.
//! 4. **Torn down** at logout: the file is removed and the state becomes
//!    `Unauthenticated`.

use crate::backend::AuthBackend;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Refresh this many seconds before the token actually expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// The authenticated user as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Tokens for one signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp (seconds) at which `access_token` stops being valid.
    pub expires_at: i64,
    pub user: AuthUser,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    /// Whether the access token is expired (or about to be) at `now`.
    pub fn is_expired(&self, now: i64) -> bool {
        now + EXPIRY_MARGIN_SECS >= self.expires_at
    }
}

/// The two-state authentication gate, plus the initial loading state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Loading,
    Authenticated(Session),
    Unauthenticated,
}

/// Persists the session between runs.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved session, if any.
    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file: {:?}", self.path))?;
        let session = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse session file: {:?}", self.path))?;
        Ok(Some(session))
    }

    /// Save the session with owner-only permissions.
    pub fn save(&self, session: &Session) -> Result<()> {
        let content =
            serde_json::to_string_pretty(session).context("Failed to serialize session")?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create session directory: {:?}", parent))?;
        }

        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write session file: {:?}", self.path))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&self.path)
                .with_context(|| format!("Failed to get file metadata: {:?}", self.path))?
                .permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&self.path, perms)
                .with_context(|| format!("Failed to set file permissions: {:?}", self.path))?;
        }

        Ok(())
    }

    /// Remove the saved session. Missing files are fine.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to remove session file: {:?}", self.path))
            }
        }
    }
}

/// Resolve the persisted session into an authentication state.
///
/// Runs off the UI thread; the result is applied with
/// [`SessionProvider::apply_resolved`].
pub async fn resolve_session(
    store: &SessionStore,
    auth: &dyn AuthBackend,
    now: i64,
) -> SessionState {
    let saved = match store.load() {
        Ok(Some(session)) => session,
        Ok(None) => return SessionState::Unauthenticated,
        Err(e) => {
            warn!("Discarding unreadable session file: {:#}", e);
            discard(store);
            return SessionState::Unauthenticated;
        }
    };

    if !saved.is_expired(now) {
        return SessionState::Authenticated(saved);
    }

    info!("Access token expired, refreshing session");
    match auth.refresh_session(&saved.refresh_token).await {
        Ok(session) => {
            if let Err(e) = store.save(&session) {
                warn!("Failed to persist refreshed session: {:#}", e);
            }
            SessionState::Authenticated(session)
        }
        Err(e) => {
            warn!("Session refresh failed: {}", e);
            discard(store);
            SessionState::Unauthenticated
        }
    }
}

fn discard(store: &SessionStore) {
    if let Err(e) = store.clear() {
        warn!("{:#}", e);
    }
}

/// Owns the current authentication state for the process.
#[derive(Debug)]
pub struct SessionProvider {
    store: SessionStore,
    state: SessionState,
}

impl SessionProvider {
    /// Create the provider in the `Loading` state.
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            state: SessionState::Loading,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SessionState::Loading)
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn current_user(&self) -> Option<&AuthUser> {
        self.session().map(|s| &s.user)
    }

    /// Resolve in place (used by the CLI, which can block on it).
    pub async fn resolve(&mut self, auth: &dyn AuthBackend) -> &SessionState {
        let now = chrono::Utc::now().timestamp();
        self.state = resolve_session(&self.store, auth, now).await;
        &self.state
    }

    /// Apply a state produced by [`resolve_session`] on a background task.
    pub fn apply_resolved(&mut self, state: SessionState) {
        self.state = state;
    }

    /// Adopt a new session after a credential change and persist it.
    ///
    /// The session is in effect even when the error reports a failed write;
    /// it just won't survive a restart.
    pub fn establish(&mut self, session: Session) -> Result<()> {
        info!("Session established for user {}", session.user.id);
        let saved = self.store.save(&session);
        self.state = SessionState::Authenticated(session);
        saved
    }

    /// Tear the session down, returning it so the caller can revoke it
    /// remotely, along with the outcome of removing the saved file.
    ///
    /// The in-memory state is `Unauthenticated` afterwards either way.
    pub fn tear_down(&mut self) -> (Option<Session>, Result<()>) {
        let previous = std::mem::replace(&mut self.state, SessionState::Unauthenticated);
        let previous = match previous {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        };
        (previous, self.store.clear())
    }
}
