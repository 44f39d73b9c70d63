//! Account DTOs shared by the store and the backend.
//!
//! DESIGN
//! ======
//! `Profile` mirrors the account document returned by the backend; unknown
//! fields are dropped on deserialize. Preferences stay an open JSON map since
//! the backend stores arbitrary user keys next to the avatar reference.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Preference key holding an opaque storage object ID for the avatar.
pub const AVATAR_ID_PREF: &str = "avatarId";
/// Preference key holding a literal avatar URL.
pub const AVATAR_URL_PREF: &str = "avatarUrl";

/// Free-form user preference map stored on the account.
pub type Preferences = Map<String, Value>;

/// The authenticated user's profile record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Account identifier (`$id` on the wire).
    #[serde(rename = "$id")]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Login email address.
    #[serde(default)]
    pub email: String,
    /// User preferences, including any avatar reference.
    #[serde(default)]
    pub prefs: Preferences,
}

impl Profile {
    /// Avatar storage object ID, if one is set and is a non-empty string.
    #[must_use]
    pub fn avatar_id(&self) -> Option<&str> {
        non_empty_str(&self.prefs, AVATAR_ID_PREF)
    }
}

pub(crate) fn non_empty_str<'a>(prefs: &'a Preferences, key: &str) -> Option<&'a str> {
    prefs
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// A password change request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasswordChange {
    pub new_password: String,
    /// The user's current password, forwarded to the backend's credential check.
    pub current_password: Option<String>,
}

/// Partial account update applied by [`crate::SessionStore::refresh`].
///
/// Each present group costs exactly one backend call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub password: Option<PasswordChange>,
    pub prefs: Option<Preferences>,
}

impl ProfileUpdate {
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Self::default() }
    }

    #[must_use]
    pub fn password(new_password: impl Into<String>) -> Self {
        Self {
            password: Some(PasswordChange { new_password: new_password.into(), current_password: None }),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn prefs(prefs: Preferences) -> Self {
        Self { prefs: Some(prefs), ..Self::default() }
    }

    /// Attach the current password to an existing password change.
    #[must_use]
    pub fn with_current_password(mut self, current: impl Into<String>) -> Self {
        if let Some(change) = self.password.as_mut() {
            change.current_password = Some(current.into());
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.password.is_none() && self.prefs.is_none()
    }
}

/// Raw avatar upload payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvatarFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl AvatarFile {
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), content_type: None, bytes }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}
