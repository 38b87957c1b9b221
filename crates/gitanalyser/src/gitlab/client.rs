//! GitLab REST client.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::entity::auth_provider::AuthProvider;
use crate::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::platform::{
    self, ProviderClient, RemoteBranch, RemoteCommit, RemoteRepository, sort_chronologically,
};

use super::convert::{to_remote_branch, to_remote_commit, to_remote_repository};
use super::error::GitLabError;
use super::types::{DEFAULT_HOST, GitLabBranch, GitLabCommit, GitLabProject, PAGE_SIZE};

/// Connection settings for [`GitLabClient`].
#[derive(Debug, Clone)]
pub struct GitLabOptions {
    /// GitLab host, with or without scheme (`gitlab.com`, `https://git.example.com`).
    pub host: String,
    /// Send `all=true` when listing commits, returning every commit in the
    /// repository instead of only the requested ref's history.
    pub all_commits: bool,
}

impl Default for GitLabOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            all_commits: false,
        }
    }
}

/// Normalize a GitLab host into a base URL with scheme.
///
/// Accepts `"gitlab.com"`, `"https://gitlab.com/"`, etc.
pub(crate) fn base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

/// GitLab client. The token is passed per call.
#[derive(Clone)]
pub struct GitLabClient {
    transport: Arc<dyn HttpTransport>,
    host: String,
    all_commits: bool,
}

impl GitLabClient {
    pub fn new(options: GitLabOptions, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            host: base_url(&options.host),
            all_commits: options.all_commits,
        }
    }

    /// Get the host URL.
    pub fn host(&self) -> &str {
        &self.host
    }

    fn api(&self, path: &str) -> String {
        format!("{}/api/v4{}", self.host, path)
    }

    async fn send(&self, token: &str, url: &str) -> Result<HttpResponse, GitLabError> {
        let request = HttpRequest::get(url)
            .header("Accept", "application/json")
            .bearer(token);

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(GitLabError::from_status(response.status, &response.body));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, token: &str, url: &str) -> Result<T, GitLabError> {
        let response = self.send(token, url).await?;
        Ok(response.json()?)
    }

    /// Fetch every page of a list endpoint.
    ///
    /// `url` must already carry a query string. Pages after the first are
    /// requested with `&page=N` taken from the `x-next-page` header, which is
    /// empty on the last page.
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        token: &str,
        url: &str,
    ) -> Result<Vec<T>, GitLabError> {
        let mut items = Vec::new();
        let mut page_url = url.to_string();

        loop {
            let response = self.send(token, &page_url).await?;
            let batch: Vec<T> = response.json()?;
            let next_page = response
                .header("x-next-page")
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string);

            debug!(
                url = %page_url,
                items = batch.len(),
                next_page = ?next_page,
                "fetched GitLab page"
            );
            items.extend(batch);

            match next_page {
                Some(page) => page_url = format!("{url}&page={page}"),
                None => break,
            }
        }

        Ok(items)
    }

    async fn list_projects(
        &self,
        token: &str,
        filter: &str,
    ) -> Result<Vec<GitLabProject>, GitLabError> {
        self.get_all_pages(
            token,
            &self.api(&format!("/projects?{filter}=true&per_page={PAGE_SIZE}")),
        )
        .await
    }
}

/// Owned projects first, then member projects not already listed.
fn merge_projects(owned: Vec<GitLabProject>, member: Vec<GitLabProject>) -> Vec<GitLabProject> {
    let mut seen = HashSet::with_capacity(owned.len() + member.len());
    owned
        .into_iter()
        .chain(member)
        .filter(|p| seen.insert(p.id))
        .collect()
}

#[async_trait]
impl ProviderClient for GitLabClient {
    fn provider(&self) -> AuthProvider {
        AuthProvider::GitLab
    }

    async fn list_repositories(&self, token: &str) -> platform::Result<Vec<RemoteRepository>> {
        let owned = self.list_projects(token, "owned").await?;
        let member = self.list_projects(token, "membership").await?;
        debug!(
            owned = owned.len(),
            member = member.len(),
            "listed GitLab projects"
        );

        Ok(merge_projects(owned, member)
            .into_iter()
            .map(to_remote_repository)
            .collect())
    }

    async fn get_repository(
        &self,
        token: &str,
        platform_id: i64,
    ) -> platform::Result<RemoteRepository> {
        let project: GitLabProject = self
            .get_json(token, &self.api(&format!("/projects/{platform_id}")))
            .await?;
        Ok(to_remote_repository(project))
    }

    async fn list_branches(
        &self,
        token: &str,
        platform_id: i64,
    ) -> platform::Result<Vec<RemoteBranch>> {
        let branches: Vec<GitLabBranch> = self
            .get_all_pages(
                token,
                &self.api(&format!(
                    "/projects/{platform_id}/repository/branches?per_page={PAGE_SIZE}"
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
        let mut url = self.api(&format!(
            "/projects/{platform_id}/repository/commits?with_stats=true&per_page={PAGE_SIZE}"
        ));
        if let Some(branch) = branch {
            let encoded: String = url::form_urlencoded::byte_serialize(branch.as_bytes()).collect();
            url.push_str("&ref_name=");
            url.push_str(&encoded);
        }
        if self.all_commits {
            url.push_str("&all=true");
        }

        let commits: Vec<GitLabCommit> = self.get_all_pages(token, &url).await?;
        let mut commits: Vec<RemoteCommit> = commits.into_iter().map(to_remote_commit).collect();
        sort_chronologically(&mut commits);
        Ok(commits)
    }
}
