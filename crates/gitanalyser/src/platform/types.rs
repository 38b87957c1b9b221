use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::auth_provider::AuthProvider;

use super::errors::Result;

/// A repository as seen by the remote account, normalized across providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteRepository {
    /// Provider-specific numeric ID.
    pub platform_id: i64,
    /// Repository name (without owner or namespace).
    pub name: String,
    /// HTTPS clone URL.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteBranch {
    pub name: String,
}

/// A single commit on a branch.
///
/// Immutable once built; the merge flag is derived from the parent list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteCommit {
    id: String,
    message: String,
    author: String,
    timestamp: DateTime<Utc>,
    parent_ids: Vec<String>,
    additions: u64,
    deletions: u64,
}

impl RemoteCommit {
    pub fn new(
        id: impl Into<String>,
        message: impl Into<String>,
        author: impl Into<String>,
        timestamp: DateTime<Utc>,
        parent_ids: Vec<String>,
        additions: u64,
        deletions: u64,
    ) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            author: author.into(),
            timestamp,
            parent_ids,
            additions,
            deletions,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Author display name used for committer grouping.
    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn parent_ids(&self) -> &[String] {
        &self.parent_ids
    }

    pub fn additions(&self) -> u64 {
        self.additions
    }

    pub fn deletions(&self) -> u64 {
        self.deletions
    }

    #[inline]
    pub fn is_merge_commit(&self) -> bool {
        self.parent_ids.len() > 1
    }
}

/// Sort commits oldest first. Commits sharing a timestamp keep their input order.
pub fn sort_chronologically(commits: &mut [RemoteCommit]) {
    commits.sort_by_key(RemoteCommit::timestamp);
}

/// A distinct commit author on a branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Committer {
    pub name: String,
}

/// Contribution totals for one author on one branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitterStats {
    pub committer: String,
    pub number_of_commits: u64,
    pub number_of_additions: u64,
    pub number_of_deletions: u64,
}

/// Access to a single Git hosting provider's REST API.
///
/// Every call takes the caller's access token; clients hold no credentials.
/// A rejected token is reported as [`ProviderError::Unauthorized`](super::ProviderError).
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Provider this client talks to.
    fn provider(&self) -> AuthProvider;

    /// All repositories visible to the token's account.
    async fn list_repositories(&self, token: &str) -> Result<Vec<RemoteRepository>>;

    async fn get_repository(&self, token: &str, platform_id: i64) -> Result<RemoteRepository>;

    async fn list_branches(&self, token: &str, platform_id: i64) -> Result<Vec<RemoteBranch>>;

    /// Commits of `branch` (the default branch when `None`), oldest first,
    /// with per-commit line statistics.
    async fn list_commits(
        &self,
        token: &str,
        platform_id: i64,
        branch: Option<&str>,
    ) -> Result<Vec<RemoteCommit>>;
}
