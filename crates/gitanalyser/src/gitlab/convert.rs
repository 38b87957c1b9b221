//! Conversion from GitLab payloads to the provider-agnostic model.

use crate::platform::{RemoteBranch, RemoteCommit, RemoteRepository};

use super::types::{GitLabBranch, GitLabCommit, GitLabProject};

const UNKNOWN_AUTHOR: &str = "unknown";

pub fn to_remote_repository(project: GitLabProject) -> RemoteRepository {
    RemoteRepository {
        platform_id: project.id,
        name: project.name,
        url: project.http_url_to_repo,
    }
}

pub fn to_remote_branch(branch: GitLabBranch) -> RemoteBranch {
    RemoteBranch { name: branch.name }
}

pub fn to_remote_commit(commit: GitLabCommit) -> RemoteCommit {
    let author = [commit.author_name.as_deref(), commit.committer_name.as_deref()]
        .into_iter()
        .flatten()
        .find(|name| !name.trim().is_empty())
        .unwrap_or(UNKNOWN_AUTHOR)
        .to_string();
    let timestamp = commit
        .committed_date
        .or(commit.authored_date)
        .unwrap_or_default();
    let stats = commit.stats.unwrap_or_default();

    RemoteCommit::new(
        commit.id,
        commit.message,
        author,
        timestamp,
        commit.parent_ids,
        stats.additions,
        stats.deletions,
    )
}
