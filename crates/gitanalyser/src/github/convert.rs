//! Conversion from GitHub payloads to the provider-agnostic model.

use chrono::{DateTime, Utc};

use crate::platform::{RemoteBranch, RemoteCommit, RemoteRepository};

use super::types::{GitActor, GitHubBranch, GitHubCommit, GitHubRepo};

const UNKNOWN_AUTHOR: &str = "unknown";

pub fn to_remote_repository(repo: GitHubRepo) -> RemoteRepository {
    RemoteRepository {
        platform_id: repo.id,
        name: repo.name,
        url: repo.clone_url,
    }
}

pub fn to_remote_branch(branch: GitHubBranch) -> RemoteBranch {
    RemoteBranch { name: branch.name }
}

/// Convert a commit detail payload.
///
/// Author is the git author name, falling back to the git committer name.
/// Timestamp is the committer date, falling back to the author date.
pub fn to_remote_commit(commit: GitHubCommit) -> RemoteCommit {
    let data = &commit.commit;
    let author = actor_name(data.author.as_ref())
        .or_else(|| actor_name(data.committer.as_ref()))
        .unwrap_or(UNKNOWN_AUTHOR)
        .to_string();
    let timestamp = actor_date(data.committer.as_ref())
        .or_else(|| actor_date(data.author.as_ref()))
        .unwrap_or_default();
    let stats = commit.stats.unwrap_or_default();

    RemoteCommit::new(
        commit.sha,
        commit.commit.message,
        author,
        timestamp,
        commit.parents.into_iter().map(|p| p.sha).collect(),
        stats.additions,
        stats.deletions,
    )
}

fn actor_name(actor: Option<&GitActor>) -> Option<&str> {
    actor
        .and_then(|a| a.name.as_deref())
        .filter(|name| !name.trim().is_empty())
}

fn actor_date(actor: Option<&GitActor>) -> Option<DateTime<Utc>> {
    actor.and_then(|a| a.date)
}
