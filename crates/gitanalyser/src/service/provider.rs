use async_trait::async_trait;
use tracing::warn;

use crate::entity::auth_provider::AuthProvider;
use crate::platform::{RemoteBranch, RemoteCommit, RemoteRepository, short_error_message};

use super::errors::Result;

/// Per-user access to one provider, with failure recovery applied.
///
/// This is what [`ProviderRegistry`](super::ProviderRegistry) dispatches to.
#[async_trait]
pub trait GitProvider: Send + Sync {
    fn provider(&self) -> AuthProvider;

    async fn list_repositories(&self, user_id: i64) -> Result<Vec<RemoteRepository>>;

    async fn get_repository(&self, user_id: i64, platform_id: i64) -> Result<RemoteRepository>;

    async fn list_branches(&self, user_id: i64, platform_id: i64) -> Result<Vec<RemoteBranch>>;

    async fn list_commits(
        &self,
        user_id: i64,
        platform_id: i64,
        branch: Option<&str>,
    ) -> Result<Vec<RemoteCommit>>;

    /// Whether `get_repository` succeeds for this user. Never fails.
    async fn is_accessible(&self, user_id: i64, platform_id: i64) -> bool {
        match self.get_repository(user_id, platform_id).await {
            Ok(_) => true,
            Err(e) => {
                warn!(
                    user_id,
                    platform_id,
                    provider = %self.provider(),
                    error = %short_error_message(&e),
                    "repository not accessible"
                );
                false
            }
        }
    }
}
