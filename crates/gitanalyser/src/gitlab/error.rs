//! GitLab API error types.

use thiserror::Error;

use crate::http::HttpError;
use crate::platform::{GitError, ProviderError};

/// Errors that can occur when interacting with the GitLab API.
#[derive(Debug, Error)]
pub enum GitLabError {
    /// The access token was rejected (HTTP 401), typically because it expired.
    #[error("GitLab rejected the access token: {message}")]
    Unauthorized { message: String },

    #[error("GitLab API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] HttpError),

    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GitLabError {
    /// Classify an HTTP status code and response body into a typed error.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let message = error_message(body);
        if status == 401 {
            Self::Unauthorized { message }
        } else {
            Self::Api { status, message }
        }
    }

    #[inline]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Pull a readable message out of a GitLab error body.
///
/// GitLab answers with `{"message": "..."}`, `{"message": {...}}` (validation
/// errors) or the OAuth shape `{"error": "...", "error_description": "..."}`.
fn error_message(body: &[u8]) -> String {
    let raw = || String::from_utf8_lossy(body).trim().to_string();
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) else {
        return raw();
    };

    let field = |name: &str| match value.get(name) {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    };

    field("message")
        .or_else(|| field("error_description"))
        .or_else(|| field("error"))
        .unwrap_or_else(raw)
}

impl From<GitLabError> for ProviderError {
    fn from(err: GitLabError) -> Self {
        GitError::GitLab(err).into()
    }
}
