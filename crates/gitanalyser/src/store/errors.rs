use sea_orm::DbErr;
use thiserror::Error;

/// Errors from the credential source.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No `user_account` row with this id.
    #[error("User not found: id={user_id}")]
    NotFound { user_id: i64 },

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl CredentialError {
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors from the cached repository store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}
