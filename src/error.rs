//! Error taxonomy for backend calls and session operations.
//!
//! ERROR HANDLING
//! ==============
//! The backend reports one of three closed cases. The store narrows them into
//! `SessionError`, which is what view code matches on to decide between an
//! inline message and a redirect to login.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Failure reported by an [`crate::AccountBackend`] call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// No valid session, or the session expired.
    #[error("{0}")]
    Unauthenticated(String),

    /// A credential check (login or current password) failed.
    #[error("{0}")]
    InvalidCredentials(String),

    /// Anything else: transport failures, validation errors, server faults.
    #[error("{0}")]
    Other(String),
}

/// Failure surfaced by [`crate::SessionStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Session invalid or expired. The store has already reset to logged-out.
    #[error("{0}")]
    Unauthenticated(String),

    /// The current password supplied with a password change was rejected.
    /// The session is still valid.
    #[error("Current password is incorrect")]
    WrongCurrentPassword,

    /// Avatar upload was requested but no storage bucket is configured.
    #[error("Avatar bucket ID not configured")]
    ConfigurationMissing,

    /// Any other failure, message passed through verbatim.
    #[error("{0}")]
    Other(String),
}

impl SessionError {
    /// Stable machine-readable code for logs and CLI output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "E_UNAUTHENTICATED",
            Self::WrongCurrentPassword => "E_WRONG_CURRENT_PASSWORD",
            Self::ConfigurationMissing => "E_CONFIGURATION_MISSING",
            Self::Other(_) => "E_OTHER",
        }
    }
}

/// Generic mapping outside the password step: only an expired session is
/// special, a failed credential check is reported as-is.
impl From<BackendError> for SessionError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unauthenticated(msg) => Self::Unauthenticated(msg),
            BackendError::InvalidCredentials(msg) | BackendError::Other(msg) => Self::Other(msg),
        }
    }
}

/// Mapping for the password step, where a failed credential check means the
/// current password was wrong rather than the session being gone.
pub(crate) fn password_error(err: BackendError) -> SessionError {
    match err {
        BackendError::InvalidCredentials(_) => SessionError::WrongCurrentPassword,
        other => other.into(),
    }
}

/// Mapping for session and account creation. No session exists yet, so a 401
/// here is a refusal to report, not an expiry to reset on.
pub(crate) fn session_error(err: BackendError) -> SessionError {
    match err {
        BackendError::Unauthenticated(msg) | BackendError::InvalidCredentials(msg) | BackendError::Other(msg) => {
            SessionError::Other(msg)
        }
    }
}
