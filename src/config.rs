//! Backend connection settings parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is unset or blank.
    #[error("missing config: env var {var} not set")]
    Missing { var: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Timeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// API root, e.g. `https://cloud.appwrite.io/v1`, without trailing slash.
    pub endpoint: String,
    pub project_id: String,
    /// Storage bucket for avatars. Avatar upload is refused when absent.
    pub avatar_bucket_id: Option<String>,
    pub timeouts: Timeouts,
}

impl Config {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, project_id: impl Into<String>) -> Self {
        let endpoint: String = endpoint.into();
        Self {
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            project_id: project_id.into(),
            avatar_bucket_id: None,
            timeouts: Timeouts::default(),
        }
    }

    #[must_use]
    pub fn with_avatar_bucket(mut self, bucket_id: impl Into<String>) -> Self {
        let bucket_id: String = bucket_id.into();
        self.avatar_bucket_id = if bucket_id.trim().is_empty() { None } else { Some(bucket_id) };
        self
    }

    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `APPWRITE_ENDPOINT`
    /// - `APPWRITE_PROJECT_ID`
    ///
    /// Optional:
    /// - `AVATAR_BUCKET_ID`: avatar upload disabled when absent
    /// - `ACCOUNT_REQUEST_TIMEOUT_SECS`: default 30, must be positive
    /// - `ACCOUNT_CONNECT_TIMEOUT_SECS`: default 10, must be positive
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if a required variable is unset or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        let endpoint = env_required("APPWRITE_ENDPOINT")?;
        let project_id = env_required("APPWRITE_PROJECT_ID")?;

        let mut config = Self::new(endpoint, project_id);
        config.avatar_bucket_id = env_non_empty("AVATAR_BUCKET_ID");
        config.timeouts = Timeouts {
            request_secs: env_parse_secs("ACCOUNT_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_secs("ACCOUNT_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Ok(config)
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_owned()),
        _ => None,
    }
}

fn env_required(key: &'static str) -> Result<String, ConfigError> {
    env_non_empty(key).ok_or(ConfigError::Missing { var: key })
}

/// Positive integer from `key`; zero, garbage, or absence yields `default`.
fn env_parse_secs(key: &str, default: u64) -> u64 {
    match env_non_empty(key).map(|v| v.parse::<u64>()) {
        Some(Ok(n)) if n > 0 => n,
        Some(_) => {
            tracing::warn!(var = key, default, "ignoring invalid timeout");
            default
        }
        None => default,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
