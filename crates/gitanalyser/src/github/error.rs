//! Error types for GitHub API operations.

use thiserror::Error;

use crate::http::HttpError;
use crate::platform::{GitError, ProviderError};

/// Errors that can occur when interacting with the GitHub API.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// The access token was rejected (HTTP 401).
    #[error("GitHub rejected the access token: {message}")]
    Unauthorized { message: String },

    /// API returned a non-2xx response.
    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// Response body did not match the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A commit detail fetch task died before reporting back.
    #[error("commit detail task failed: {0}")]
    Task(String),
}

impl GitHubError {
    /// Classify a non-2xx response.
    ///
    /// GitHub error bodies are `{"message": "..."}`; anything else is kept verbatim.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<super::types::GitHubErrorBody>(body)
            .map(|b| b.message)
            .unwrap_or_else(|_| String::from_utf8_lossy(body).trim().to_string());

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

impl From<GitHubError> for ProviderError {
    fn from(err: GitHubError) -> Self {
        GitError::GitHub(err).into()
    }
}
