//! GitHub REST v3 payloads, limited to the fields this crate reads.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Default GitHub REST API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default number of commit detail requests in flight per `list_commits` call.
pub const DEFAULT_COMMIT_STATS_CONCURRENCY: usize = 8;

/// Page size for list endpoints (GitHub's maximum).
pub const PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepo {
    pub id: i64,
    pub name: String,
    pub clone_url: String,
    #[serde(default)]
    pub default_branch: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubBranch {
    pub name: String,
}

/// A commit from `/commits` (no `stats`) or `/commits/{sha}` (with `stats`).
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubCommit {
    pub sha: String,
    pub commit: GitCommitData,
    #[serde(default)]
    pub parents: Vec<GitHubParent>,
    #[serde(default)]
    pub stats: Option<GitHubCommitStats>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitCommitData {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: Option<GitActor>,
    #[serde(default)]
    pub committer: Option<GitActor>,
}

/// Git-level identity (not a GitHub account).
#[derive(Debug, Clone, Deserialize)]
pub struct GitActor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubParent {
    pub sha: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct GitHubCommitStats {
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitHubErrorBody {
    pub message: String,
}
