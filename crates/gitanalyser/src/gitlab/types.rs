//! GitLab REST v4 payloads, limited to the fields this crate reads.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Default GitLab host.
pub const DEFAULT_HOST: &str = "https://gitlab.com";

/// Page size for list endpoints (GitLab's maximum).
pub const PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct GitLabProject {
    pub id: i64,
    pub name: String,
    pub http_url_to_repo: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitLabBranch {
    pub name: String,
}

/// A commit from `/repository/commits?with_stats=true`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabCommit {
    pub id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub committer_name: Option<String>,
    #[serde(default)]
    pub committed_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub authored_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub parent_ids: Vec<String>,
    #[serde(default)]
    pub stats: Option<GitLabCommitStats>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct GitLabCommitStats {
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}
