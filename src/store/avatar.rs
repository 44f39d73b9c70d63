//! Avatar URL resolution from stored preferences.

#[cfg(test)]
#[path = "avatar_test.rs"]
mod avatar_test;

use crate::backend::AccountBackend;
use crate::types::{AVATAR_ID_PREF, AVATAR_URL_PREF, Preferences, non_empty_str};

/// Resolve the displayable avatar URL for a preference map.
///
/// A stored object ID wins and goes through the backend's view endpoint; a
/// literal URL is used verbatim otherwise. Failures resolve to `None`: a
/// missing image is not an error for the caller. An ID that fails to
/// resolve does not fall back to the literal URL.
pub fn resolve_avatar_url(backend: &dyn AccountBackend, bucket_id: Option<&str>, prefs: &Preferences) -> Option<String> {
    if let Some(avatar_id) = non_empty_str(prefs, AVATAR_ID_PREF) {
        let Some(bucket_id) = bucket_id else {
            tracing::warn!(avatar_id, "avatar bucket not configured; avatar hidden");
            return None;
        };
        return match backend.file_view_url(bucket_id, avatar_id) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(error = %e, avatar_id, "avatar url resolution failed");
                None
            }
        };
    }
    non_empty_str(prefs, AVATAR_URL_PREF).map(str::to_owned)
}
