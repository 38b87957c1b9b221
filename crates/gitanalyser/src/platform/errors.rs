use thiserror::Error;

use crate::entity::auth_provider::AuthProvider;
use crate::github::GitHubError;
use crate::gitlab::GitLabError;

/// A provider API failure, tagged with the provider that produced it.
#[derive(Debug, Error)]
pub enum GitError {
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error(transparent)]
    GitLab(#[from] GitLabError),
}

impl GitError {
    /// Provider the failure came from.
    pub fn provider(&self) -> AuthProvider {
        match self {
            Self::GitHub(_) => AuthProvider::GitHub,
            Self::GitLab(_) => AuthProvider::GitLab,
        }
    }

    /// Whether the provider rejected the access token.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::GitHub(e) => e.is_unauthorized(),
            Self::GitLab(e) => e.is_unauthorized(),
        }
    }
}

/// Outcome classification of a failed provider call.
///
/// `Unauthorized` is the only variant that can trigger a token refresh.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unauthorized: {0}")]
    Unauthorized(GitError),

    #[error(transparent)]
    Other(GitError),
}

impl ProviderError {
    #[inline]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Drop the classification and keep the underlying provider error.
    pub fn into_git_error(self) -> GitError {
        match self {
            Self::Unauthorized(e) | Self::Other(e) => e,
        }
    }
}

impl From<GitError> for ProviderError {
    fn from(err: GitError) -> Self {
        if err.is_unauthorized() {
            Self::Unauthorized(err)
        } else {
            Self::Other(err)
        }
    }
}

/// Extract a short error message suitable for display.
///
/// Takes the first line of an error message, which keeps provider response
/// bodies out of single-line log output.
///
/// # Example
///
/// ```ignore
/// use gitanalyser::platform::short_error_message;
/// let error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
/// assert_eq!(short_error_message(&error), "file not found");
/// ```
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Result type for provider client operations.
pub type Result<T> = std::result::Result<T, ProviderError>;
