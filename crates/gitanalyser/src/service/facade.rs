//! Entry point used by the rest of the application.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::entity::auth_provider::AuthProvider;
use crate::platform::{Committer, CommitterStats, RemoteBranch, RemoteCommit, RemoteRepository};
use crate::store::{CachedRepositoryStore, CredentialSource};

use super::errors::{Result, ServiceError};
use super::provider::GitProvider;
use super::registry::ProviderRegistry;
use super::stats::{committer_stats, distinct_committers};

/// Dispatches each call to the provider the user's account is linked to.
///
/// The link is read on every call, so relinking an account takes effect
/// immediately.
#[derive(Clone)]
pub struct GitService {
    registry: ProviderRegistry,
    credentials: Arc<dyn CredentialSource>,
    repositories: Arc<dyn CachedRepositoryStore>,
}

impl GitService {
    pub fn new(
        registry: ProviderRegistry,
        credentials: Arc<dyn CredentialSource>,
        repositories: Arc<dyn CachedRepositoryStore>,
    ) -> Self {
        Self {
            registry,
            credentials,
            repositories,
        }
    }

    /// The provider the user is linked to.
    ///
    /// # Errors
    ///
    /// `NoProviderFound` when the link is missing, unrecognized, or names a
    /// provider with nothing registered for it.
    pub async fn linked_provider(&self, user_id: i64) -> Result<AuthProvider> {
        let Some(raw) = self.credentials.linked_provider(user_id).await? else {
            return Err(ServiceError::NoProviderFound(format!(
                "user {user_id} has no linked provider"
            )));
        };
        raw.parse::<AuthProvider>()
            .map_err(|e| ServiceError::NoProviderFound(format!("user {user_id}: {e}")))
    }

    async fn provider_for(&self, user_id: i64) -> Result<Arc<dyn GitProvider>> {
        let provider = self.linked_provider(user_id).await?;
        let Some(git) = self.registry.get(provider) else {
            return Err(ServiceError::NoProviderFound(format!(
                "{provider} is not configured"
            )));
        };
        debug!(user_id, %provider, "resolved provider");
        Ok(Arc::clone(git))
    }

    /// Every repository the user can see upstream.
    ///
    /// On success, cached repository records for this user that are not in
    /// the result are deleted.
    pub async fn list_repositories(&self, user_id: i64) -> Result<Vec<RemoteRepository>> {
        let provider = self.provider_for(user_id).await?;
        let repositories = provider.list_repositories(user_id).await?;

        let keep: HashSet<i64> = repositories.iter().map(|r| r.platform_id).collect();
        let pruned = self
            .repositories
            .delete_all_except(user_id, &keep)
            .await?;

        info!(
            user_id,
            provider = %provider.provider(),
            repositories = repositories.len(),
            pruned,
            "listed repositories"
        );
        Ok(repositories)
    }

    pub async fn get_repository_by_id(
        &self,
        user_id: i64,
        platform_id: i64,
    ) -> Result<RemoteRepository> {
        self.provider_for(user_id)
            .await?
            .get_repository(user_id, platform_id)
            .await
    }

    pub async fn get_branches(&self, user_id: i64, platform_id: i64) -> Result<Vec<RemoteBranch>> {
        self.provider_for(user_id)
            .await?
            .list_branches(user_id, platform_id)
            .await
    }

    /// Commits of `branch` (the default branch when `None`), oldest first.
    pub async fn get_commits(
        &self,
        user_id: i64,
        platform_id: i64,
        branch: Option<&str>,
    ) -> Result<Vec<RemoteCommit>> {
        let commits = self
            .provider_for(user_id)
            .await?
            .list_commits(user_id, platform_id, branch)
            .await?;
        info!(
            user_id,
            platform_id,
            branch = branch.unwrap_or("<default>"),
            commits = commits.len(),
            "listed commits"
        );
        Ok(commits)
    }

    pub async fn get_committers(
        &self,
        user_id: i64,
        platform_id: i64,
        branch: Option<&str>,
    ) -> Result<Vec<Committer>> {
        let commits = self.get_commits(user_id, platform_id, branch).await?;
        Ok(distinct_committers(&commits))
    }

    pub async fn get_stats(
        &self,
        user_id: i64,
        platform_id: i64,
        branch: Option<&str>,
    ) -> Result<Vec<CommitterStats>> {
        let commits = self.get_commits(user_id, platform_id, branch).await?;
        Ok(committer_stats(&commits))
    }

    /// Whether the user can read the repository. Never fails.
    pub async fn is_accessible_by_user(&self, user_id: i64, platform_id: i64) -> bool {
        match self.provider_for(user_id).await {
            Ok(provider) => provider.is_accessible(user_id, platform_id).await,
            Err(e) => {
                warn!(user_id, platform_id, error = %e, "repository access check failed");
                false
            }
        }
    }
}
