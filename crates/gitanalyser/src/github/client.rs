//! GitHub REST client.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::entity::auth_provider::AuthProvider;
use crate::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::platform::{
    self, ProviderClient, RemoteBranch, RemoteCommit, RemoteRepository, sort_chronologically,
};

use super::convert::{to_remote_branch, to_remote_commit, to_remote_repository};
use super::error::GitHubError;
use super::pagination::parse_link_header;
use super::types::{
    DEFAULT_API_URL, DEFAULT_COMMIT_STATS_CONCURRENCY, GitHubBranch, GitHubCommit, GitHubRepo,
    PAGE_SIZE,
};

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// Connection settings for [`GitHubClient`].
#[derive(Debug, Clone)]
pub struct GitHubOptions {
    /// REST API root, e.g. `https://api.github.com` or a GHES `https://host/api/v3`.
    pub api_url: String,
    /// Commit detail requests in flight per `list_commits` call.
    pub commit_stats_concurrency: usize,
}

impl Default for GitHubOptions {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            commit_stats_concurrency: DEFAULT_COMMIT_STATS_CONCURRENCY,
        }
    }
}

/// GitHub client. Stateless apart from connection settings; the token is
/// passed per call.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    api_url: String,
    commit_stats_concurrency: usize,
}

impl GitHubClient {
    pub fn new(options: GitHubOptions, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            api_url: options.api_url.trim_end_matches('/').to_string(),
            commit_stats_concurrency: options.commit_stats_concurrency.max(1),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Authenticated GET; non-2xx responses become errors.
    async fn send(&self, token: &str, url: &str) -> Result<HttpResponse, GitHubError> {
        let request = HttpRequest::get(url)
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
            .bearer(token);

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(GitHubError::from_status(response.status, &response.body));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, token: &str, url: &str) -> Result<T, GitHubError> {
        let response = self.send(token, url).await?;
        Ok(response.json()?)
    }

    /// Follow `rel="next"` links until exhausted.
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        token: &str,
        first_url: String,
    ) -> Result<Vec<T>, GitHubError> {
        let mut items = Vec::new();
        let mut next = Some(first_url);
        let mut page = 0u32;

        while let Some(url) = next {
            let response = self.send(token, &url).await?;
            let batch: Vec<T> = response.json()?;
            let links = response
                .header("link")
                .map(parse_link_header)
                .unwrap_or_default();

            page += 1;
            debug!(
                url = %url,
                page,
                items = batch.len(),
                last_page = ?links.last_page,
                "fetched GitHub page"
            );

            items.extend(batch);
            next = links.next;
        }

        Ok(items)
    }

    async fn fetch_repo(&self, token: &str, platform_id: i64) -> Result<GitHubRepo, GitHubError> {
        self.get_json(token, &self.url(&format!("/repositories/{platform_id}")))
            .await
    }

    /// Fetch `/commits/{sha}` for every listed commit to obtain line stats.
    ///
    /// At most `commit_stats_concurrency` requests run at once. Results come
    /// back in input order; the first failure aborts the remaining requests.
    async fn fetch_commit_details(
        &self,
        token: &str,
        platform_id: i64,
        commits: Vec<GitHubCommit>,
    ) -> Result<Vec<GitHubCommit>, GitHubError> {
        if commits.is_empty() {
            return Ok(Vec::new());
        }

        let concurrency = self.commit_stats_concurrency.clamp(1, commits.len());
        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut handles = Vec::with_capacity(commits.len());

        for commit in commits {
            let client = self.clone();
            let token = token.to_string();
            let semaphore = Arc::clone(&semaphore);

            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| GitHubError::Task("semaphore closed unexpectedly".to_string()))?;
                let url = client.url(&format!(
                    "/repositories/{platform_id}/commits/{}",
                    commit.sha
                ));
                client.get_json::<GitHubCommit>(&token, &url).await
            }));
        }

        let mut detailed = Vec::with_capacity(handles.len());
        let mut handles = handles.into_iter();
        while let Some(handle) = handles.next() {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(GitHubError::Task(e.to_string())),
            };
            match result {
                Ok(commit) => detailed.push(commit),
                Err(e) => {
                    for pending in handles.by_ref() {
                        pending.abort();
                    }
                    return Err(e);
                }
            }
        }

        Ok(detailed)
    }
}

#[async_trait]
impl ProviderClient for GitHubClient {
    fn provider(&self) -> AuthProvider {
        AuthProvider::GitHub
    }

    async fn list_repositories(&self, token: &str) -> platform::Result<Vec<RemoteRepository>> {
        let repos: Vec<GitHubRepo> = self
            .get_all_pages(token, self.url(&format!("/user/repos?per_page={PAGE_SIZE}")))
            .await?;
        Ok(repos.into_iter().map(to_remote_repository).collect())
    }

    async fn get_repository(
        &self,
        token: &str,
        platform_id: i64,
    ) -> platform::Result<RemoteRepository> {
        let repo = self.fetch_repo(token, platform_id).await?;
        Ok(to_remote_repository(repo))
    }

    async fn list_branches(
        &self,
        token: &str,
        platform_id: i64,
    ) -> platform::Result<Vec<RemoteBranch>> {
        let branches: Vec<GitHubBranch> = self
            .get_all_pages(
                token,
                self.url(&format!(
                    "/repositories/{platform_id}/branches?per_page={PAGE_SIZE}"
                )),
            )
            .await?;
        Ok(branches.into_iter().map(to_remote_branch).collect())
    }

    async fn list_commits(
        &self,
        token: &str,
        platform_id: i64,
        branch: Option<&str>,
    ) -> platform::Result<Vec<RemoteCommit>> {
        let branch = match branch {
            Some(b) => Some(b.to_string()),
            None => self.fetch_repo(token, platform_id).await?.default_branch,
        };

        let mut url = self.url(&format!(
            "/repositories/{platform_id}/commits?per_page={PAGE_SIZE}"
        ));
        if let Some(branch) = &branch {
            let encoded: String = url::form_urlencoded::byte_serialize(branch.as_bytes()).collect();
            url.push_str("&sha=");
            url.push_str(&encoded);
        }

        let listed: Vec<GitHubCommit> = self.get_all_pages(token, url).await?;
        debug!(
            platform_id,
            branch = ?branch,
            commits = listed.len(),
            "fetching GitHub commit details"
        );

        let detailed = self.fetch_commit_details(token, platform_id, listed).await?;
        let mut commits: Vec<RemoteCommit> = detailed.into_iter().map(to_remote_commit).collect();
        sort_chronologically(&mut commits);
        Ok(commits)
    }
}
