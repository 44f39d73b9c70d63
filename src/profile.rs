//! Profile page logic: form validation, submit, and avatar upload outcomes.
//!
//! DESIGN
//! ======
//! The rendering layer owns widgets; this module owns what they decide. A
//! submit validates locally first, sends one `refresh` with the edits, and
//! maps the store's error taxonomy to what the page shows next.

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;

use crate::error::SessionError;
use crate::store::SessionStore;
use crate::types::{AvatarFile, PasswordChange, Profile, ProfileUpdate};

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;
pub const PASSWORD_MIN_CHARS: usize = 8;

pub const PROFILE_SAVED: &str = "Profile updated successfully!";
pub const PROFILE_AND_PASSWORD_SAVED: &str = "Profile and password updated successfully!";
pub const PROFILE_SAVE_FAILED: &str = "Failed to update profile. Please try again.";
pub const AVATAR_UPLOAD_FAILED: &str = "Failed to upload avatar. Please try again.";

/// Editable profile fields as typed by the user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub name: String,
    /// Shown read-only; never submitted.
    pub email: String,
    pub current_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

/// Per-field validation messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub name: Option<&'static str>,
    pub current_password: Option<&'static str>,
    pub new_password: Option<&'static str>,
    pub confirm_new_password: Option<&'static str>,
}

impl FormErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.current_password.is_none()
            && self.new_password.is_none()
            && self.confirm_new_password.is_none()
    }
}

/// What the page should do after a submit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Local validation failed; nothing was sent.
    Invalid(FormErrors),
    /// Saved; show `message` and leave edit mode.
    Saved { message: &'static str },
    /// Backend refused; show `message` inline and stay in edit mode.
    Failed { message: String },
    /// Session is gone; navigate to the login route.
    RedirectToLogin,
}

impl ProfileForm {
    /// Seed the form from the current profile with blank password fields.
    #[must_use]
    pub fn from_profile(profile: &Profile) -> Self {
        Self { name: profile.name.clone(), email: profile.email.clone(), ..Self::default() }
    }

    /// Drop unsaved edits and reseed from `profile`.
    pub fn discard(&mut self, profile: Option<&Profile>) {
        *self = profile.map(Self::from_profile).unwrap_or_default();
    }

    /// Whether any password field has been touched.
    #[must_use]
    pub fn touches_password(&self) -> bool {
        !(self.current_password.is_empty() && self.new_password.is_empty() && self.confirm_new_password.is_empty())
    }

    /// Whether a submit will include a password change.
    #[must_use]
    pub fn changes_password(&self) -> bool {
        !self.current_password.is_empty()
    }

    /// Check every field and collect all messages at once.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages when any field is invalid.
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors { name: validate_name(&self.name), ..FormErrors::default() };

        if self.touches_password() {
            if self.current_password.is_empty() {
                errors.current_password = Some("Current password is required");
            }
            if self.new_password.is_empty() {
                errors.new_password = Some("New password is required");
            } else if self.new_password.chars().count() < PASSWORD_MIN_CHARS {
                errors.new_password = Some("Password must be at least 8 characters");
            }
            if self.confirm_new_password.is_empty() {
                errors.confirm_new_password = Some("Please confirm your new password");
            } else if self.new_password != self.confirm_new_password {
                errors.confirm_new_password = Some("Passwords do not match");
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Build the store update: always the name, a password change only when
    /// the current password was typed.
    #[must_use]
    pub fn to_update(&self) -> ProfileUpdate {
        let password = self.changes_password().then(|| PasswordChange {
            new_password: self.new_password.clone(),
            current_password: Some(self.current_password.clone()),
        });
        ProfileUpdate { name: Some(self.name.trim().to_owned()), password, prefs: None }
    }

    pub fn clear_passwords(&mut self) {
        self.current_password.clear();
        self.new_password.clear();
        self.confirm_new_password.clear();
    }
}

fn validate_name(name: &str) -> Option<&'static str> {
    let name = name.trim();
    let len = name.chars().count();
    if name.is_empty() {
        Some("Name is required")
    } else if len < NAME_MIN_CHARS {
        Some("Name must be at least 2 characters")
    } else if len > NAME_MAX_CHARS {
        Some("Name must be less than 50 characters")
    } else {
        None
    }
}

/// Validate and save the form through the store.
///
/// Password fields are cleared only on success.
pub async fn submit(store: &SessionStore, form: &mut ProfileForm) -> SubmitOutcome {
    if let Err(errors) = form.validate() {
        return SubmitOutcome::Invalid(errors);
    }

    let changes_password = form.changes_password();
    match store.refresh(Some(form.to_update())).await {
        Ok(_) => {
            form.clear_passwords();
            let message = if changes_password { PROFILE_AND_PASSWORD_SAVED } else { PROFILE_SAVED };
            SubmitOutcome::Saved { message }
        }
        Err(SessionError::Unauthenticated(_)) => SubmitOutcome::RedirectToLogin,
        Err(err) => {
            let message = err.to_string();
            let message = if message.is_empty() { PROFILE_SAVE_FAILED.to_owned() } else { message };
            SubmitOutcome::Failed { message }
        }
    }
}

/// Upload a new avatar, reducing any failure to the page's single message.
///
/// # Errors
///
/// Returns [`AVATAR_UPLOAD_FAILED`] on any store error.
pub async fn upload_avatar(store: &SessionStore, file: &AvatarFile) -> Result<(), &'static str> {
    match store.update_avatar(file).await {
        Ok(_) => Ok(()),
        Err(err) => {
            tracing::debug!(code = err.code(), error = %err, "avatar upload failed");
            Err(AVATAR_UPLOAD_FAILED)
        }
    }
}
