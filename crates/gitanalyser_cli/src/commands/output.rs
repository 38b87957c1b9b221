use clap::ValueEnum;
use gitanalyser::{Committer, CommitterStats, RemoteBranch, RemoteCommit, RemoteRepository};
use serde::Serialize;
use tabled::Tabled;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

/// Render `items` to a string in the requested format.
pub(crate) fn render<T: Tabled + Serialize>(
    items: &[T],
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Table => {
            let mut table = tabled::Table::new(items);
            table.with(tabled::settings::Style::rounded());
            Ok(table.to_string())
        }
        OutputFormat::Json => serde_json::to_string_pretty(items),
    }
}

pub(crate) fn print<T: Tabled + Serialize>(
    items: &[T],
    format: OutputFormat,
) -> Result<(), serde_json::Error> {
    println!("{}", render(items, format)?);
    Ok(())
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct RepositoryRow {
    #[tabled(rename = "ID")]
    pub platform_id: i64,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Clone URL")]
    pub url: String,
}

impl From<RemoteRepository> for RepositoryRow {
    fn from(repo: RemoteRepository) -> Self {
        Self {
            platform_id: repo.platform_id,
            name: repo.name,
            url: repo.url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct BranchRow {
    #[tabled(rename = "Branch")]
    pub name: String,
}

impl From<RemoteBranch> for BranchRow {
    fn from(branch: RemoteBranch) -> Self {
        Self { name: branch.name }
    }
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct CommitRow {
    #[tabled(rename = "Commit")]
    pub id: String,
    #[tabled(rename = "Author")]
    pub author: String,
    #[tabled(rename = "Date")]
    pub timestamp: String,
    #[tabled(rename = "+")]
    pub additions: u64,
    #[tabled(rename = "-")]
    pub deletions: u64,
    #[tabled(rename = "Merge")]
    pub merge: bool,
    #[tabled(rename = "Message")]
    pub summary: String,
}

impl From<&RemoteCommit> for CommitRow {
    fn from(commit: &RemoteCommit) -> Self {
        Self {
            id: commit.id().chars().take(12).collect(),
            author: commit.author().to_string(),
            timestamp: commit.timestamp().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            additions: commit.additions(),
            deletions: commit.deletions(),
            merge: commit.is_merge_commit(),
            summary: commit.message().lines().next().unwrap_or_default().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct CommitterRow {
    #[tabled(rename = "Committer")]
    pub name: String,
}

impl From<Committer> for CommitterRow {
    fn from(committer: Committer) -> Self {
        Self {
            name: committer.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct StatsRow {
    #[tabled(rename = "Committer")]
    pub committer: String,
    #[tabled(rename = "Commits")]
    pub number_of_commits: u64,
    #[tabled(rename = "Additions")]
    pub number_of_additions: u64,
    #[tabled(rename = "Deletions")]
    pub number_of_deletions: u64,
}

impl From<CommitterStats> for StatsRow {
    fn from(stats: CommitterStats) -> Self {
        Self {
            committer: stats.committer,
            number_of_commits: stats.number_of_commits,
            number_of_additions: stats.number_of_additions,
            number_of_deletions: stats.number_of_deletions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct AccessRow {
    #[tabled(rename = "User")]
    pub user_id: i64,
    #[tabled(rename = "Repository")]
    pub platform_id: i64,
    #[tabled(rename = "Accessible")]
    pub accessible: bool,
}
