//! Scripted in-memory backend for store and profile tests.
//!
//! Behaves like a tiny account service: one account, one password, one
//! session flag. Any operation can be forced to fail until cleared.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::json;

use crate::backend::AccountBackend;
use crate::error::BackendError;
use crate::types::{AvatarFile, Preferences, Profile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Op {
    Fetch,
    UpdateName,
    UpdatePassword,
    UpdatePrefs,
    CreateAccount,
    CreateSession,
    DeleteSession,
    Upload,
    ViewUrl,
}

struct Inner {
    profile: Profile,
    password: String,
    session: bool,
    calls: Vec<Op>,
    failures: HashMap<Op, BackendError>,
    uploads: Vec<(String, String, usize)>,
}

pub(crate) struct MockBackend {
    inner: Mutex<Inner>,
}

pub(crate) const PASSWORD: &str = "hunter22";

pub(crate) fn ann() -> Profile {
    Profile { id: "u1".into(), name: "Ann".into(), email: "a@x.com".into(), prefs: Preferences::new() }
}

pub(crate) fn prefs(value: serde_json::Value) -> Preferences {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Preferences::new(),
    }
}

pub(crate) fn avatar_prefs(avatar_id: &str) -> Preferences {
    prefs(json!({ "avatarId": avatar_id }))
}

impl MockBackend {
    /// A backend holding `profile` with no session open.
    pub(crate) fn new(profile: Profile) -> Self {
        Self {
            inner: Mutex::new(Inner {
                profile,
                password: PASSWORD.into(),
                session: false,
                calls: Vec::new(),
                failures: HashMap::new(),
                uploads: Vec::new(),
            }),
        }
    }

    /// A backend holding `profile` with a live session.
    pub(crate) fn logged_in(profile: Profile) -> Self {
        let backend = Self::new(profile);
        backend.lock().session = true;
        backend
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `op` fail with `err` until [`MockBackend::clear_failure`].
    pub(crate) fn fail(&self, op: Op, err: BackendError) {
        self.lock().failures.insert(op, err);
    }

    pub(crate) fn clear_failure(&self, op: Op) {
        self.lock().failures.remove(&op);
    }

    /// Drop the session server-side, as an expiry would.
    pub(crate) fn expire_session(&self) {
        self.lock().session = false;
    }

    /// Remote calls made so far, in order. URL building is not recorded.
    pub(crate) fn calls(&self) -> Vec<Op> {
        self.lock().calls.clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub(crate) fn profile(&self) -> Profile {
        self.lock().profile.clone()
    }

    pub(crate) fn set_prefs(&self, prefs: Preferences) {
        self.lock().profile.prefs = prefs;
    }

    /// `(bucket_id, file_id, byte_len)` per upload.
    pub(crate) fn uploads(&self) -> Vec<(String, String, usize)> {
        self.lock().uploads.clone()
    }

    fn begin(&self, op: Op) -> Result<MutexGuard<'_, Inner>, BackendError> {
        let mut inner = self.lock();
        if op != Op::ViewUrl {
            inner.calls.push(op);
        }
        if let Some(err) = inner.failures.get(&op).cloned() {
            return Err(err);
        }
        Ok(inner)
    }

    fn begin_authed(&self, op: Op) -> Result<MutexGuard<'_, Inner>, BackendError> {
        let inner = self.begin(op)?;
        if inner.session {
            Ok(inner)
        } else {
            Err(BackendError::Unauthenticated("User (role: guests) missing scope (account)".into()))
        }
    }
}

#[async_trait::async_trait]
impl AccountBackend for MockBackend {
    async fn fetch_current_account(&self) -> Result<Profile, BackendError> {
        let inner = self.begin_authed(Op::Fetch)?;
        Ok(inner.profile.clone())
    }

    async fn update_account_name(&self, name: &str) -> Result<(), BackendError> {
        let mut inner = self.begin_authed(Op::UpdateName)?;
        inner.profile.name = name.to_owned();
        Ok(())
    }

    async fn update_account_password(&self, new_password: &str, current: Option<&str>) -> Result<(), BackendError> {
        let mut inner = self.begin_authed(Op::UpdatePassword)?;
        if current.is_some_and(|c| c != inner.password) {
            return Err(BackendError::InvalidCredentials("Invalid credentials. Please check the password.".into()));
        }
        inner.password = new_password.to_owned();
        Ok(())
    }

    async fn update_account_preferences(&self, prefs: &Preferences) -> Result<(), BackendError> {
        let mut inner = self.begin_authed(Op::UpdatePrefs)?;
        inner.profile.prefs = prefs.clone();
        Ok(())
    }

    async fn create_account(&self, user_id: &str, email: &str, password: &str, name: &str) -> Result<(), BackendError> {
        let mut inner = self.begin(Op::CreateAccount)?;
        inner.profile = Profile { id: user_id.into(), name: name.into(), email: email.into(), prefs: Preferences::new() };
        inner.password = password.into();
        Ok(())
    }

    async fn create_session(&self, email: &str, password: &str) -> Result<(), BackendError> {
        let mut inner = self.begin(Op::CreateSession)?;
        if email != inner.profile.email || password != inner.password {
            return Err(BackendError::InvalidCredentials(
                "Invalid credentials. Please check the email and password.".into(),
            ));
        }
        inner.session = true;
        Ok(())
    }

    async fn delete_current_session(&self) -> Result<(), BackendError> {
        let mut inner = self.begin(Op::DeleteSession)?;
        inner.session = false;
        Ok(())
    }

    async fn upload_file(&self, bucket_id: &str, file_id: &str, file: &AvatarFile) -> Result<String, BackendError> {
        let mut inner = self.begin_authed(Op::Upload)?;
        inner.uploads.push((bucket_id.into(), file_id.into(), file.bytes.len()));
        Ok(file_id.to_owned())
    }

    fn file_view_url(&self, bucket_id: &str, file_id: &str) -> Result<String, BackendError> {
        drop(self.begin(Op::ViewUrl)?);
        Ok(format!("https://files.test/{bucket_id}/{file_id}/view"))
    }
}
