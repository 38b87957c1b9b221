use std::sync::Arc;

use gitanalyser::http::ReqwestTransport;
use gitanalyser::service::{GitService, ProviderRegistry};
use gitanalyser::store::{DbCredentialSource, DbRepositoryStore};

use crate::commands::output::{
    self, AccessRow, BranchRow, CommitRow, CommitterRow, OutputFormat, RepositoryRow, StatsRow,
};
use crate::config::Config;

/// A query against the provider a user is linked to.
#[derive(Debug, Clone)]
pub(crate) enum GitQuery {
    Repositories,
    Repository { id: i64 },
    Branches { repo: i64 },
    Commits { repo: i64, branch: Option<String> },
    Committers { repo: i64, branch: Option<String> },
    Stats { repo: i64, branch: Option<String> },
    Access { repo: i64 },
}

/// Wire the service against the configured database and provider endpoints.
pub(crate) async fn build_service(
    config: &Config,
    database_url: &str,
) -> Result<GitService, Box<dyn std::error::Error>> {
    let db = Arc::new(gitanalyser::connect(database_url).await?);
    let transport = Arc::new(ReqwestTransport::with_timeout(config.http_timeout())?);
    let credentials = Arc::new(DbCredentialSource::new(Arc::clone(&db)));

    let registry =
        ProviderRegistry::standard(config.provider_settings(), transport, credentials.clone());
    Ok(GitService::new(
        registry,
        credentials,
        Arc::new(DbRepositoryStore::new(db)),
    ))
}

pub(crate) async fn handle_query(
    service: &GitService,
    user_id: i64,
    query: GitQuery,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::debug!(user_id, ?query, "running query");

    match query {
        GitQuery::Repositories => {
            let rows: Vec<RepositoryRow> = service
                .list_repositories(user_id)
                .await?
                .into_iter()
                .map(RepositoryRow::from)
                .collect();
            output::print(&rows, format)?;
        }
        GitQuery::Repository { id } => {
            let repo = service.get_repository_by_id(user_id, id).await?;
            output::print(&[RepositoryRow::from(repo)], format)?;
        }
        GitQuery::Branches { repo } => {
            let rows: Vec<BranchRow> = service
                .get_branches(user_id, repo)
                .await?
                .into_iter()
                .map(BranchRow::from)
                .collect();
            output::print(&rows, format)?;
        }
        GitQuery::Commits { repo, branch } => {
            let commits = service
                .get_commits(user_id, repo, branch.as_deref())
                .await?;
            let rows: Vec<CommitRow> = commits.iter().map(CommitRow::from).collect();
            output::print(&rows, format)?;
        }
        GitQuery::Committers { repo, branch } => {
            let rows: Vec<CommitterRow> = service
                .get_committers(user_id, repo, branch.as_deref())
                .await?
                .into_iter()
                .map(CommitterRow::from)
                .collect();
            output::print(&rows, format)?;
        }
        GitQuery::Stats { repo, branch } => {
            let rows: Vec<StatsRow> = service
                .get_stats(user_id, repo, branch.as_deref())
                .await?
                .into_iter()
                .map(StatsRow::from)
                .collect();
            output::print(&rows, format)?;
        }
        GitQuery::Access { repo } => {
            let accessible = service.is_accessible_by_user(user_id, repo).await;
            output::print(
                &[AccessRow {
                    user_id,
                    platform_id: repo,
                    accessible,
                }],
                format,
            )?;
        }
    }

    Ok(())
}
