//! Client-side account session: login/signup, profile editing, and avatar upload
//! over an Appwrite-compatible backend.
//!
//! ARCHITECTURE
//! ============
//! `backend` defines the remote contract and its HTTP implementation. `store`
//! owns the session state and is the only place that talks to the backend.
//! `guard` and `profile` hold the view-side rules (redirects, form checks)
//! as plain functions so any front end can reuse them.

pub mod backend;
pub mod config;
pub mod error;
pub mod guard;
pub mod profile;
pub mod store;
pub mod types;

pub use backend::AccountBackend;
pub use config::Config;
pub use error::{BackendError, SessionError};
pub use store::{SessionPhase, SessionState, SessionStore};
pub use types::{AvatarFile, PasswordChange, Preferences, Profile, ProfileUpdate};
