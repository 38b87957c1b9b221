//! Token refresh seam and per-user refresh serialization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;

use crate::http::HttpError;
use crate::store::CredentialError;

/// Errors raised while exchanging a refresh token.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("token endpoint unreachable: {0}")]
    Http(#[from] HttpError),

    #[error("token endpoint returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected token response: {0}")]
    Parse(String),

    #[error("no refresh token stored for user {user_id}")]
    MissingRefreshToken { user_id: i64 },

    #[error(transparent)]
    Credentials(#[from] CredentialError),
}

/// Obtains a new access token for a user and persists it.
///
/// Not idempotent: each call consumes the stored refresh token.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, user_id: i64) -> Result<(), RefreshError>;
}

/// One async mutex per user, so concurrent calls for the same user never
/// refresh at the same time.
#[derive(Default)]
pub struct RefreshLocks {
    locks: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
}

impl RefreshLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock for `user_id`. Entries no caller holds any more are dropped.
    pub fn for_user(&self, user_id: i64) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|id, lock| *id == user_id || Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(user_id).or_default())
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
