//! Persistence collaborators.
//!
//! The web application owns `user_account` and `saved_repository`; this crate
//! reads and rotates credentials on the former and prunes the latter. Both
//! concerns sit behind traits so the service layer can be exercised without a
//! database.

mod credentials;
mod errors;
mod saved_repositories;

use std::collections::HashSet;

use async_trait::async_trait;

pub use credentials::DbCredentialSource;
pub use errors::{CredentialError, StoreError};
pub use saved_repositories::DbRepositoryStore;

/// Per-user provider credentials.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn access_token(&self, user_id: i64) -> Result<String, CredentialError>;

    /// `None` when the provider never issued a refresh token.
    async fn refresh_token(&self, user_id: i64) -> Result<Option<String>, CredentialError>;

    /// Provider name as stored by the web application, if any.
    async fn linked_provider(&self, user_id: i64) -> Result<Option<String>, CredentialError>;

    /// Replace both tokens after a refresh.
    async fn update_tokens(
        &self,
        user_id: i64,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(), CredentialError>;
}

/// The web application's cache of a user's repositories.
#[async_trait]
pub trait CachedRepositoryStore: Send + Sync {
    /// Delete the user's cached repositories whose `platform_id` is not in
    /// `keep`. Returns the number of rows deleted.
    async fn delete_all_except(&self, user_id: i64, keep: &HashSet<i64>)
    -> Result<u64, StoreError>;
}
