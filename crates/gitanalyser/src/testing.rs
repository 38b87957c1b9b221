//! In-memory collaborators shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::entity::auth_provider::AuthProvider;
use crate::github::GitHubError;
use crate::gitlab::GitLabError;
use crate::platform::{
    self, ProviderClient, ProviderError, RemoteBranch, RemoteCommit, RemoteRepository,
};
use crate::service::{RefreshError, TokenRefresher};
use crate::store::{CachedRepositoryStore, CredentialError, CredentialSource, StoreError};

#[derive(Debug, Clone)]
struct Account {
    access_token: String,
    refresh_token: Option<String>,
    provider: Option<String>,
}

/// Credential store backed by a map; unknown ids are `NotFound`.
#[derive(Default)]
pub struct InMemoryCredentials {
    accounts: Mutex<HashMap<i64, Account>>,
    updates: Mutex<usize>,
}

impl InMemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &self,
        user_id: i64,
        access_token: &str,
        refresh_token: Option<&str>,
        provider: Option<&str>,
    ) {
        self.accounts.lock().unwrap().insert(
            user_id,
            Account {
                access_token: access_token.to_string(),
                refresh_token: refresh_token.map(str::to_string),
                provider: provider.map(str::to_string),
            },
        );
    }

    pub fn access_token_of(&self, user_id: i64) -> Option<String> {
        self.accounts
            .lock()
            .unwrap()
            .get(&user_id)
            .map(|a| a.access_token.clone())
    }

    pub fn refresh_token_of(&self, user_id: i64) -> Option<String> {
        self.accounts
            .lock()
            .unwrap()
            .get(&user_id)
            .and_then(|a| a.refresh_token.clone())
    }

    /// Number of successful `update_tokens` calls.
    pub fn update_count(&self) -> usize {
        *self.updates.lock().unwrap()
    }

    fn with_account<T>(
        &self,
        user_id: i64,
        f: impl FnOnce(&mut Account) -> T,
    ) -> Result<T, CredentialError> {
        self.accounts
            .lock()
            .unwrap()
            .get_mut(&user_id)
            .map(f)
            .ok_or(CredentialError::NotFound { user_id })
    }
}

#[async_trait]
impl CredentialSource for InMemoryCredentials {
    async fn access_token(&self, user_id: i64) -> Result<String, CredentialError> {
        self.with_account(user_id, |a| a.access_token.clone())
    }

    async fn refresh_token(&self, user_id: i64) -> Result<Option<String>, CredentialError> {
        self.with_account(user_id, |a| a.refresh_token.clone())
    }

    async fn linked_provider(&self, user_id: i64) -> Result<Option<String>, CredentialError> {
        self.with_account(user_id, |a| a.provider.clone())
    }

    async fn update_tokens(
        &self,
        user_id: i64,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(), CredentialError> {
        self.with_account(user_id, |a| {
            a.access_token = access_token.to_string();
            a.refresh_token = Some(refresh_token.to_string());
        })?;
        *self.updates.lock().unwrap() += 1;
        Ok(())
    }
}

/// Repository cache holding `platform_id`s per user.
#[derive(Default)]
pub struct InMemoryRepositoryStore {
    cached: Mutex<HashMap<i64, Vec<i64>>>,
    calls: Mutex<usize>,
}

impl InMemoryRepositoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self, user_id: i64, platform_ids: &[i64]) {
        self.cached
            .lock()
            .unwrap()
            .insert(user_id, platform_ids.to_vec());
    }

    pub fn cached(&self, user_id: i64) -> Vec<i64> {
        self.cached
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl CachedRepositoryStore for InMemoryRepositoryStore {
    async fn delete_all_except(
        &self,
        user_id: i64,
        keep: &HashSet<i64>,
    ) -> Result<u64, StoreError> {
        *self.calls.lock().unwrap() += 1;
        let mut cached = self.cached.lock().unwrap();
        let Some(ids) = cached.get_mut(&user_id) else {
            return Ok(0);
        };
        let before = ids.len();
        ids.retain(|id| keep.contains(id));
        Ok((before - ids.len()) as u64)
    }
}

/// Provider client that accepts a fixed set of tokens and answers every
/// other token with a 401.
pub struct ScriptedClient {
    provider: AuthProvider,
    valid_tokens: HashSet<String>,
    seen: Mutex<Vec<String>>,
    /// `(first failing call index, status)`.
    failure: Mutex<Option<(usize, u16)>>,
    commits: Mutex<Vec<RemoteCommit>>,
}

impl ScriptedClient {
    pub fn new(provider: AuthProvider, valid_tokens: &[&str]) -> Self {
        Self {
            provider,
            valid_tokens: valid_tokens.iter().map(|t| t.to_string()).collect(),
            seen: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            commits: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with `status`.
    pub fn fail_with_status(&self, status: u16) {
        self.fail_with_status_after(0, status);
    }

    /// Calls from index `first` on fail with `status`.
    pub fn fail_with_status_after(&self, first: usize, status: u16) {
        *self.failure.lock().unwrap() = Some((first, status));
    }

    pub fn set_commits(&self, commits: Vec<RemoteCommit>) {
        *self.commits.lock().unwrap() = commits;
    }

    pub fn repositories(&self) -> Vec<RemoteRepository> {
        vec![Self::repository(1), Self::repository(2)]
    }

    pub fn seen_tokens(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    fn repository(platform_id: i64) -> RemoteRepository {
        RemoteRepository {
            platform_id,
            name: format!("repo-{platform_id}"),
            url: format!("https://git.example.com/repo-{platform_id}.git"),
        }
    }

    fn error(&self, status: u16) -> ProviderError {
        let body = format!(r#"{{"message":"{status} scripted"}}"#);
        match self.provider {
            AuthProvider::GitHub => GitHubError::from_status(status, body.as_bytes()).into(),
            AuthProvider::GitLab => GitLabError::from_status(status, body.as_bytes()).into(),
        }
    }

    fn check(&self, token: &str) -> platform::Result<()> {
        let index = {
            let mut seen = self.seen.lock().unwrap();
            seen.push(token.to_string());
            seen.len() - 1
        };
        if let Some((first, status)) = *self.failure.lock().unwrap()
            && index >= first
        {
            return Err(self.error(status));
        }
        if self.valid_tokens.contains(token) {
            Ok(())
        } else {
            Err(self.error(401))
        }
    }
}

#[async_trait]
impl ProviderClient for ScriptedClient {
    fn provider(&self) -> AuthProvider {
        self.provider
    }

    async fn list_repositories(&self, token: &str) -> platform::Result<Vec<RemoteRepository>> {
        self.check(token)?;
        Ok(self.repositories())
    }

    async fn get_repository(
        &self,
        token: &str,
        platform_id: i64,
    ) -> platform::Result<RemoteRepository> {
        self.check(token)?;
        Ok(Self::repository(platform_id))
    }

    async fn list_branches(
        &self,
        token: &str,
        _platform_id: i64,
    ) -> platform::Result<Vec<RemoteBranch>> {
        self.check(token)?;
        Ok(vec![RemoteBranch {
            name: "main".to_string(),
        }])
    }

    async fn list_commits(
        &self,
        token: &str,
        _platform_id: i64,
        _branch: Option<&str>,
    ) -> platform::Result<Vec<RemoteCommit>> {
        self.check(token)?;
        Ok(self.commits.lock().unwrap().clone())
    }
}

/// Refresher that rotates the stored access token to a fixed value, or fails
/// with `invalid_grant` when none is configured.
pub struct FakeRefresher {
    credentials: Arc<InMemoryCredentials>,
    next_token: Option<String>,
    calls: AtomicUsize,
    yield_first: AtomicBool,
}

impl FakeRefresher {
    pub fn new(credentials: Arc<InMemoryCredentials>, next_token: Option<&str>) -> Self {
        Self {
            credentials,
            next_token: next_token.map(str::to_string),
            calls: AtomicUsize::new(0),
            yield_first: AtomicBool::new(false),
        }
    }

    /// Yield to the scheduler before storing the new token, so concurrent
    /// callers observe the refresh in flight.
    pub fn yield_before_update(&self) {
        self.yield_first.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRefresher for FakeRefresher {
    async fn refresh(&self, user_id: i64) -> Result<(), RefreshError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.yield_first.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        match &self.next_token {
            Some(token) => {
                self.credentials
                    .update_tokens(user_id, token, "refresh-next")
                    .await?;
                Ok(())
            }
            None => Err(RefreshError::Status {
                status: 400,
                message: "invalid_grant".to_string(),
            }),
        }
    }
}
