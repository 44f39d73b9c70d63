//! Appwrite REST client for the account and storage endpoints.
//!
//! Thin HTTP wrapper over `/account`, `/account/sessions`, and
//! `/storage/buckets`. The session cookie lives in the client's cookie jar, so
//! one `AppwriteBackend` equals one browser-like session. Pure parsing and
//! error classification live in free functions for testability.

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use super::AccountBackend;
use crate::config::Config;
use crate::error::BackendError;
use crate::types::{AvatarFile, Preferences, Profile};

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const INVALID_CREDENTIALS_TYPE: &str = "user_invalid_credentials";
const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";
const MAX_ID_LEN: usize = 36;

// =============================================================================
// CLIENT
// =============================================================================

pub struct AppwriteBackend {
    http: reqwest::Client,
    endpoint: String,
    project_id: String,
}

impl AppwriteBackend {
    /// Build a client with a fresh cookie jar from parsed config.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Other`] if the HTTP client fails to build.
    pub fn new(config: &Config) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(|e| BackendError::Other(format!("http client build failed: {e}")))?;
        Ok(Self { http, endpoint: config.endpoint.clone(), project_id: config.project_id.clone() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, BackendError> {
        let response = request
            .header(PROJECT_HEADER, &self.project_id)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(transport_error)?;

        if !(200..300).contains(&status) {
            let err = classify_error(status, &text);
            tracing::debug!(status, error = %err, "appwrite request failed");
            return Err(err);
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl AccountBackend for AppwriteBackend {
    async fn fetch_current_account(&self) -> Result<Profile, BackendError> {
        let body = self.send(self.http.get(self.url("/account"))).await?;
        parse_profile(&body)
    }

    async fn update_account_name(&self, name: &str) -> Result<(), BackendError> {
        let request = self.http.patch(self.url("/account/name")).json(&NameBody { name });
        self.send(request).await.map(drop)
    }

    async fn update_account_password(&self, new_password: &str, current: Option<&str>) -> Result<(), BackendError> {
        let body = PasswordBody { password: new_password, old_password: current };
        let request = self.http.patch(self.url("/account/password")).json(&body);
        self.send(request).await.map(drop)
    }

    async fn update_account_preferences(&self, prefs: &Preferences) -> Result<(), BackendError> {
        let request = self.http.patch(self.url("/account/prefs")).json(&PrefsBody { prefs });
        self.send(request).await.map(drop)
    }

    async fn create_account(&self, user_id: &str, email: &str, password: &str, name: &str) -> Result<(), BackendError> {
        let body = CreateAccountBody { user_id, email, password, name };
        let request = self.http.post(self.url("/account")).json(&body);
        self.send(request).await.map(drop)
    }

    async fn create_session(&self, email: &str, password: &str) -> Result<(), BackendError> {
        let request = self.http.post(self.url("/account/sessions/email")).json(&SessionBody { email, password });
        self.send(request).await.map(drop)
    }

    async fn delete_current_session(&self) -> Result<(), BackendError> {
        let request = self.http.delete(self.url("/account/sessions/current"));
        self.send(request).await.map(drop)
    }

    async fn upload_file(&self, bucket_id: &str, file_id: &str, file: &AvatarFile) -> Result<String, BackendError> {
        validate_id("bucket", bucket_id)?;
        validate_id("file", file_id)?;

        let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type).map_err(transport_error)?;
        }
        let form = Form::new().text("fileId", file_id.to_owned()).part("file", part);

        let path = format!("/storage/buckets/{bucket_id}/files");
        let body = self.send(self.http.post(self.url(&path)).multipart(form)).await?;
        parse_file_id(&body)
    }

    fn file_view_url(&self, bucket_id: &str, file_id: &str) -> Result<String, BackendError> {
        view_url(&self.endpoint, &self.project_id, bucket_id, file_id)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct NameBody<'a> {
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordBody<'a> {
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    old_password: Option<&'a str>,
}

#[derive(Serialize)]
struct PrefsBody<'a> {
    prefs: &'a Preferences,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateAccountBody<'a> {
    user_id: &'a str,
    email: &'a str,
    password: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct SessionBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default, rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct FileBody {
    #[serde(rename = "$id")]
    id: String,
}

// =============================================================================
// PARSING
// =============================================================================

fn transport_error(e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::Other(format!("request timed out: {e}"))
    } else {
        BackendError::Other(format!("request failed: {e}"))
    }
}

/// Map a non-2xx response to the backend error taxonomy.
///
/// 401 is either a failed credential check or a missing/expired session;
/// the body's `type` (or, failing that, the message text) tells them apart.
pub(crate) fn classify_error(status: u16, body: &str) -> BackendError {
    let (message, kind) = match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => (parsed.message, parsed.kind),
        Err(_) if body.trim().is_empty() => (format!("request failed with status {status}"), String::new()),
        Err(_) => (body.trim().to_owned(), String::new()),
    };

    if status != 401 {
        return BackendError::Other(message);
    }
    if kind == INVALID_CREDENTIALS_TYPE || message.contains(INVALID_CREDENTIALS_MESSAGE) {
        BackendError::InvalidCredentials(message)
    } else {
        BackendError::Unauthenticated(message)
    }
}

pub(crate) fn parse_profile(body: &str) -> Result<Profile, BackendError> {
    serde_json::from_str(body).map_err(|e| BackendError::Other(format!("malformed account response: {e}")))
}

pub(crate) fn parse_file_id(body: &str) -> Result<String, BackendError> {
    serde_json::from_str::<FileBody>(body)
        .map(|file| file.id)
        .map_err(|e| BackendError::Other(format!("malformed file response: {e}")))
}

/// Backend IDs: 1–36 chars of `[A-Za-z0-9._-]`, not starting with a symbol.
fn validate_id(what: &str, id: &str) -> Result<(), BackendError> {
    let valid_chars = id.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    let starts_alnum = id.chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
    if id.len() > MAX_ID_LEN || !valid_chars || !starts_alnum {
        return Err(BackendError::Other(format!("invalid {what} id: {id:?}")));
    }
    Ok(())
}

pub(crate) fn view_url(endpoint: &str, project_id: &str, bucket_id: &str, file_id: &str) -> Result<String, BackendError> {
    validate_id("bucket", bucket_id)?;
    validate_id("file", file_id)?;
    Ok(format!("{endpoint}/storage/buckets/{bucket_id}/files/{file_id}/view?project={project_id}"))
}

#[cfg(test)]
#[path = "appwrite_test.rs"]
mod tests;
