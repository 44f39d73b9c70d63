//! Backend contract for account, session, and file storage calls.
//!
//! DESIGN
//! ======
//! The store depends only on `AccountBackend`, held as
//! `Arc<dyn AccountBackend>`. `appwrite` is the production implementation;
//! tests substitute scripted mocks.

pub mod appwrite;

pub use appwrite::AppwriteBackend;

use crate::error::BackendError;
use crate::types::{AvatarFile, Preferences, Profile};

/// Provider-neutral async trait for the account backend. Enables mocking in tests.
#[async_trait::async_trait]
pub trait AccountBackend: Send + Sync {
    /// Fetch the account attached to the current session.
    ///
    /// # Errors
    ///
    /// [`BackendError::Unauthenticated`] when there is no valid session.
    async fn fetch_current_account(&self) -> Result<Profile, BackendError>;

    /// # Errors
    ///
    /// [`BackendError::Unauthenticated`] or [`BackendError::Other`].
    async fn update_account_name(&self, name: &str) -> Result<(), BackendError>;

    /// Change the password. `current` is checked by the backend when given.
    ///
    /// # Errors
    ///
    /// [`BackendError::InvalidCredentials`] when the current password is wrong.
    async fn update_account_password(&self, new_password: &str, current: Option<&str>) -> Result<(), BackendError>;

    /// Replace the stored preference map. Callers merge before calling.
    ///
    /// # Errors
    ///
    /// [`BackendError::Unauthenticated`] or [`BackendError::Other`].
    async fn update_account_preferences(&self, prefs: &Preferences) -> Result<(), BackendError>;

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// [`BackendError::Other`], e.g. when the email is already taken.
    async fn create_account(&self, user_id: &str, email: &str, password: &str, name: &str) -> Result<(), BackendError>;

    /// Open an email/password session.
    ///
    /// # Errors
    ///
    /// [`BackendError::InvalidCredentials`] for a bad email/password pair.
    async fn create_session(&self, email: &str, password: &str) -> Result<(), BackendError>;

    /// # Errors
    ///
    /// [`BackendError::Other`] when the backend could not be reached or refused.
    async fn delete_current_session(&self) -> Result<(), BackendError>;

    /// Store `file` under `file_id` in `bucket_id`, returning the stored object's ID.
    ///
    /// # Errors
    ///
    /// [`BackendError::Other`] on upload failure.
    async fn upload_file(&self, bucket_id: &str, file_id: &str, file: &AvatarFile) -> Result<String, BackendError>;

    /// Build the public view URL for a stored object. No network call.
    ///
    /// # Errors
    ///
    /// [`BackendError::Other`] when the IDs cannot form a valid URL.
    fn file_view_url(&self, bucket_id: &str, file_id: &str) -> Result<String, BackendError>;
}
