//! Session store: the single owner of the signed-in user's state.
//!
//! SYSTEM CONTEXT
//! ==============
//! Created once by the application root and handed to views by clone. Views
//! read snapshots or subscribe to changes; every mutation goes through one of
//! the async operations here, which call the backend and publish the result.
//!
//! TRADE-OFFS
//! ==========
//! No lock spans a backend call. Two overlapping operations both run and the
//! last transition to land wins. A hung backend call leaves `loading` set;
//! the HTTP backend's timeouts are the only bound.

pub mod avatar;

#[cfg(test)]
pub(crate) mod test_helpers;


use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::backend::{AccountBackend, AppwriteBackend};
use crate::config::Config;
use crate::error::{BackendError, SessionError, password_error, session_error};
use crate::types::{AVATAR_ID_PREF, AvatarFile, Preferences, Profile, ProfileUpdate};

// =============================================================================
// SESSION STATE
// =============================================================================

/// Snapshot of the session as views see it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionState {
    /// Present iff the last profile fetch succeeded.
    pub user: Option<Profile>,
    /// Derived from `user.prefs`; never set on its own.
    pub avatar_url: Option<String>,
    pub loading: bool,
    /// Message from the most recent failed operation.
    pub error: Option<String>,
    pub is_authenticated: bool,
}

/// Coarse session phase derived from a [`SessionState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// A request is in flight and no user is confirmed yet.
    Unknown,
    Authenticated,
    Anonymous,
}

impl SessionState {
    /// State at application start, before the first session probe.
    #[must_use]
    pub fn initial() -> Self {
        Self { user: None, avatar_url: None, loading: true, error: None, is_authenticated: false }
    }

    #[must_use]
    pub fn logged_out() -> Self {
        Self { user: None, avatar_url: None, loading: false, error: None, is_authenticated: false }
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.is_authenticated {
            SessionPhase::Authenticated
        } else if self.loading {
            SessionPhase::Unknown
        } else {
            SessionPhase::Anonymous
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::initial()
    }
}

// =============================================================================
// SESSION STORE
// =============================================================================

/// Cheap-to-clone handle to the shared session state and its backend.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn AccountBackend>,
    avatar_bucket_id: Option<String>,
    state: Arc<watch::Sender<SessionState>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(backend: Arc<dyn AccountBackend>, avatar_bucket_id: Option<String>) -> Self {
        let (state, _) = watch::channel(SessionState::initial());
        Self { backend, avatar_bucket_id, state: Arc::new(state) }
    }

    /// Build a store over the Appwrite backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, BackendError> {
        let backend = AppwriteBackend::new(config)?;
        Ok(Self::new(Arc::new(backend), config.avatar_bucket_id.clone()))
    }

    /// Current state, cloned out of the channel.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every published transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Resolve the avatar URL for `prefs` with this store's backend and bucket.
    #[must_use]
    pub fn avatar_url_for(&self, prefs: &Preferences) -> Option<String> {
        avatar::resolve_avatar_url(self.backend.as_ref(), self.avatar_bucket_id.as_deref(), prefs)
    }

    /// Probe for an existing session at startup.
    ///
    /// "Nobody logged in" is the expected outcome for a fresh client and lands
    /// the store in the anonymous state without an error.
    ///
    /// # Errors
    ///
    /// Any failure other than [`SessionError::Unauthenticated`].
    pub async fn init(&self) -> Result<(), SessionError> {
        match self.refresh(None).await {
            Ok(_) | Err(SessionError::Unauthenticated(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Apply `updates` (password, then name, then prefs) and re-fetch the
    /// canonical profile.
    ///
    /// # Errors
    ///
    /// - [`SessionError::WrongCurrentPassword`]: user kept, `error` set.
    /// - [`SessionError::Unauthenticated`]: store reset to logged-out.
    /// - [`SessionError::Other`]: user kept, `error` set.
    pub async fn refresh(&self, updates: Option<ProfileUpdate>) -> Result<Profile, SessionError> {
        self.state.send_modify(|s| s.loading = true);

        match self.apply_and_fetch(updates.as_ref()).await {
            Ok(profile) => {
                let avatar_url = self.avatar_url_for(&profile.prefs);
                tracing::debug!(user_id = %profile.id, has_avatar = avatar_url.is_some(), "session refreshed");
                let user = profile.clone();
                self.state.send_modify(move |s| {
                    s.user = Some(user);
                    s.avatar_url = avatar_url;
                    s.loading = false;
                    s.error = None;
                    s.is_authenticated = true;
                });
                Ok(profile)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    async fn apply_and_fetch(&self, updates: Option<&ProfileUpdate>) -> Result<Profile, SessionError> {
        if let Some(updates) = updates {
            if let Some(change) = &updates.password {
                self.backend
                    .update_account_password(&change.new_password, change.current_password.as_deref())
                    .await
                    .map_err(password_error)?;
            }
            if let Some(name) = &updates.name {
                self.backend.update_account_name(name).await?;
            }
            if let Some(prefs) = &updates.prefs {
                self.backend.update_account_preferences(prefs).await?;
            }
        }
        Ok(self.backend.fetch_current_account().await?)
    }

    /// Open a session and load the profile.
    ///
    /// # Errors
    ///
    /// Every failure sets `error`. Session-creation failures are returned as
    /// [`SessionError::Other`] and keep the prior user; a follow-up fetch
    /// that finds no session still resets to logged-out first.
    pub async fn login(&self, email: &str, password: &str) -> Result<Profile, SessionError> {
        self.begin();
        if let Err(err) = self.backend.create_session(email, password).await {
            return Err(self.fail(session_error(err)));
        }
        match self.refresh(None).await {
            Ok(profile) => {
                tracing::info!(user_id = %profile.id, "logged in");
                Ok(profile)
            }
            Err(err) => {
                let message = err.to_string();
                self.state.send_modify(move |s| {
                    s.loading = false;
                    s.error = Some(message);
                });
                Err(err)
            }
        }
    }

    /// Register an account under a fresh ID, then log in with it.
    ///
    /// # Errors
    ///
    /// Account-creation failures set `error`; login failures as in
    /// [`SessionStore::login`].
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<Profile, SessionError> {
        self.begin();
        let user_id = unique_id();
        if let Err(err) = self.backend.create_account(&user_id, email, password, name).await {
            return Err(self.fail(session_error(err)));
        }
        tracing::info!(%user_id, "account created");
        self.login(email, password).await
    }

    /// End the remote session and reset to logged-out.
    ///
    /// # Errors
    ///
    /// On failure `error` is set and whether the remote session ended is
    /// unknown; treat logout as best-effort.
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.begin();
        match self.backend.delete_current_session().await {
            Ok(()) => {
                self.state.send_replace(SessionState::logged_out());
                tracing::info!("logged out");
                Ok(())
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Upload `file` as the new avatar and point the user's prefs at it.
    ///
    /// The previous avatar object stays in storage.
    ///
    /// # Errors
    ///
    /// [`SessionError::ConfigurationMissing`] without a bucket (no backend
    /// call), [`SessionError::Unauthenticated`] without a user, and upload or
    /// refresh failures otherwise.
    pub async fn update_avatar(&self, file: &AvatarFile) -> Result<Profile, SessionError> {
        let Some(bucket_id) = self.avatar_bucket_id.as_deref() else {
            return Err(self.fail(SessionError::ConfigurationMissing));
        };
        let Some(mut prefs) = self.current_prefs() else {
            return Err(self.fail(SessionError::Unauthenticated("no active session".into())));
        };

        self.state.send_modify(|s| s.loading = true);
        let file_id = unique_id();
        let stored_id = match self.backend.upload_file(bucket_id, &file_id, file).await {
            Ok(id) => id,
            Err(err) => return Err(self.fail(err.into())),
        };
        tracing::info!(file_id = %stored_id, bucket_id, bytes = file.bytes.len(), "avatar uploaded");

        prefs.insert(AVATAR_ID_PREF.into(), stored_id.into());
        self.refresh(Some(ProfileUpdate::prefs(prefs))).await
    }

    fn current_prefs(&self) -> Option<Preferences> {
        self.state.borrow().user.as_ref().map(|u| u.prefs.clone())
    }

    fn begin(&self) {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
    }

    /// Publish the failure transition for `err` and hand it back.
    fn fail(&self, err: SessionError) -> SessionError {
        if let SessionError::Unauthenticated(reason) = &err {
            tracing::info!(%reason, "session not authenticated; resetting");
            self.state.send_replace(SessionState::logged_out());
        } else {
            tracing::warn!(code = err.code(), error = %err, "session operation failed");
            let message = err.to_string();
            self.state.send_modify(move |s| {
                s.loading = false;
                s.error = Some(message);
            });
        }
        err
    }
}

/// Fresh backend object ID: 32 lowercase hex chars.
fn unique_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
