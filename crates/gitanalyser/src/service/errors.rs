use thiserror::Error;

use crate::platform::GitError;
use crate::store::{CredentialError, StoreError};

/// Errors surfaced by [`GitService`](super::GitService).
///
/// Callers map `Authentication` to an unauthorized response and `Git` /
/// `NoProviderFound` to a server error.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The provider failed for a reason a token refresh cannot fix.
    #[error("git provider error: {0}")]
    Git(#[from] GitError),

    /// The provider kept rejecting the user's credentials, or refreshing them failed.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The user has no usable provider link.
    #[error("no git provider found: {0}")]
    NoProviderFound(String),

    #[error("user not found: id={user_id}")]
    NotFound { user_id: i64 },

    #[error(transparent)]
    Credentials(CredentialError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    #[inline]
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<CredentialError> for ServiceError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::NotFound { user_id } => Self::NotFound { user_id },
            other => Self::Credentials(other),
        }
    }
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
