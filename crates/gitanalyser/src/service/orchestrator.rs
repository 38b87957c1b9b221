//! Refresh-once-and-retry around an [`AccessTokenService`].
//!
//! ```text
//! attempt 1 ── ok ──────────────────────────────► value
//!     │ Other ─────────────────────────────────► ServiceError::Git
//!     │ Unauthorized, no refresher ────────────► ServiceError::Git
//!     │ Unauthorized
//!     ▼
//! refresh (under the user's lock) ── fails ────► ServiceError::Authentication
//!     ▼
//! attempt 2 ── ok ──────────────────────────────► value
//!     └─ any provider error ───────────────────► ServiceError::Authentication
//! ```
//!
//! Credential lookup failures are fatal at every step.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::entity::auth_provider::AuthProvider;
use crate::platform::{
    ProviderError, RemoteBranch, RemoteCommit, RemoteRepository, short_error_message,
};

use super::access::{AccessError, AccessTokenService};
use super::errors::{Result, ServiceError};
use super::provider::GitProvider;
use super::refresh::{RefreshLocks, TokenRefresher};

pub struct ProviderOrchestrator {
    access: AccessTokenService,
    refresher: Option<Arc<dyn TokenRefresher>>,
    locks: RefreshLocks,
}

impl ProviderOrchestrator {
    /// Orchestrator for a provider without refresh support: a rejected token
    /// is reported as a provider error straight away.
    pub fn new(access: AccessTokenService) -> Self {
        Self {
            access,
            refresher: None,
            locks: RefreshLocks::new(),
        }
    }

    pub fn with_refresher(access: AccessTokenService, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            access,
            refresher: Some(refresher),
            locks: RefreshLocks::new(),
        }
    }

    pub fn supports_refresh(&self) -> bool {
        self.refresher.is_some()
    }

    async fn run<T, F, Fut>(&self, user_id: i64, operation: &'static str, call: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = std::result::Result<T, AccessError>>,
    {
        let Some(refresher) = &self.refresher else {
            return call().await.map_err(|e| match e {
                AccessError::Credentials(e) => e.into(),
                AccessError::Provider { source, .. } => ServiceError::Git(source.into_git_error()),
            });
        };

        let (rejected_token, rejected) = match call().await {
            Ok(value) => return Ok(value),
            Err(AccessError::Credentials(e)) => return Err(e.into()),
            Err(AccessError::Provider {
                source: ProviderError::Other(e),
                ..
            }) => return Err(ServiceError::Git(e)),
            Err(AccessError::Provider {
                token,
                source: ProviderError::Unauthorized(e),
            }) => (token, e),
        };

        warn!(
            user_id,
            provider = %self.provider(),
            operation,
            error = %short_error_message(&rejected),
            "access token rejected, refreshing"
        );

        {
            let lock = self.locks.for_user(user_id);
            let _guard = lock.lock().await;

            // A different stored token means another call already rotated it.
            let current = self.access.current_token(user_id).await?;
            if current == rejected_token {
                refresher.refresh(user_id).await.map_err(|e| {
                    warn!(user_id, operation, error = %e, "token refresh failed");
                    ServiceError::Authentication(format!("token refresh failed: {e}"))
                })?;
            } else {
                debug!(user_id, operation, "token already rotated, skipping refresh");
            }
        }

        match call().await {
            Ok(value) => Ok(value),
            Err(AccessError::Credentials(e)) => Err(e.into()),
            Err(AccessError::Provider { source: e, .. }) => {
                warn!(
                    user_id,
                    operation,
                    error = %short_error_message(&e),
                    "retry after refresh failed"
                );
                Err(ServiceError::Authentication(format!(
                    "{} still failing after token refresh: {e}",
                    self.provider()
                )))
            }
        }
    }
}

#[async_trait]
impl GitProvider for ProviderOrchestrator {
    fn provider(&self) -> AuthProvider {
        self.access.provider()
    }

    async fn list_repositories(&self, user_id: i64) -> Result<Vec<RemoteRepository>> {
        self.run(user_id, "list_repositories", move || {
            self.access.list_repositories(user_id)
        })
        .await
    }

    async fn get_repository(&self, user_id: i64, platform_id: i64) -> Result<RemoteRepository> {
        self.run(user_id, "get_repository", move || {
            self.access.get_repository(user_id, platform_id)
        })
        .await
    }

    async fn list_branches(&self, user_id: i64, platform_id: i64) -> Result<Vec<RemoteBranch>> {
        self.run(user_id, "list_branches", move || {
            self.access.list_branches(user_id, platform_id)
        })
        .await
    }

    async fn list_commits(
        &self,
        user_id: i64,
        platform_id: i64,
        branch: Option<&str>,
    ) -> Result<Vec<RemoteCommit>> {
        self.run(user_id, "list_commits", move || {
            self.access.list_commits(user_id, platform_id, branch)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::store::{CredentialError, CredentialSource};
    use crate::testing::{FakeRefresher, InMemoryCredentials, ScriptedClient};

    struct Fixture {
        client: Arc<ScriptedClient>,
        credentials: Arc<InMemoryCredentials>,
        refresher: Arc<FakeRefresher>,
    }

    impl Fixture {
        /// A GitLab user holding `stored`, a client accepting `valid`, and a
        /// refresher that rotates to `next` (or fails when `None`).
        fn new(stored: &str, valid: &[&str], next: Option<&str>) -> Self {
            let credentials = Arc::new(InMemoryCredentials::new());
            credentials.insert(1, stored, Some("refresh-1"), Some("gitlab"));
            Self {
                client: Arc::new(ScriptedClient::new(AuthProvider::GitLab, valid)),
                refresher: Arc::new(FakeRefresher::new(credentials.clone(), next)),
                credentials,
            }
        }

        fn refreshing(&self) -> ProviderOrchestrator {
            ProviderOrchestrator::with_refresher(
                AccessTokenService::new(self.client.clone(), self.credentials.clone()),
                self.refresher.clone(),
            )
        }

        fn non_refreshing(&self) -> ProviderOrchestrator {
            ProviderOrchestrator::new(AccessTokenService::new(
                self.client.clone(),
                self.credentials.clone(),
            ))
        }
    }

    #[tokio::test]
    async fn success_needs_no_refresh() {
        let f = Fixture::new("good", &["good"], Some("unused"));
        let repos = f.refreshing().list_repositories(1).await.expect("success");
        assert!(!repos.is_empty());
        assert_eq!(f.refresher.calls(), 0);
        assert_eq!(f.client.calls(), 1);
    }

    #[tokio::test]
    async fn unauthorized_once_refreshes_once_and_retries() {
        let f = Fixture::new("expired", &["fresh"], Some("fresh"));
        let repo = f
            .refreshing()
            .get_repository(1, 10)
            .await
            .expect("retry should succeed");
        assert_eq!(repo.platform_id, 10);
        assert_eq!(f.refresher.calls(), 1);
        assert_eq!(
            f.client.seen_tokens(),
            vec!["expired".to_string(), "fresh".to_string()]
        );
    }

    #[tokio::test]
    async fn unauthorized_twice_is_authentication_error_after_one_refresh() {
        let f = Fixture::new("expired", &["never"], Some("still-bad"));
        let err = f
            .refreshing()
            .list_branches(1, 10)
            .await
            .expect_err("second 401 should fail");
        assert!(err.is_authentication());
        assert_eq!(f.refresher.calls(), 1);
        assert_eq!(f.client.calls(), 2);
    }

    #[tokio::test]
    async fn refresh_failure_is_authentication_error_without_retry() {
        let f = Fixture::new("expired", &["fresh"], None);
        let err = f
            .refreshing()
            .list_commits(1, 10, Some("main"))
            .await
            .expect_err("refresh failure should fail");
        assert!(err.is_authentication());
        assert!(err.to_string().contains("token refresh failed"));
        assert_eq!(f.refresher.calls(), 1);
        assert_eq!(f.client.calls(), 1);
    }

    #[tokio::test]
    async fn other_errors_are_git_errors_without_refresh() {
        let f = Fixture::new("good", &["good"], Some("fresh"));
        f.client.fail_with_status(500);
        let err = f
            .refreshing()
            .list_repositories(1)
            .await
            .expect_err("500 should fail");
        assert!(matches!(err, ServiceError::Git(_)));
        assert_eq!(f.refresher.calls(), 0);
    }

    #[tokio::test]
    async fn retry_failing_with_other_error_is_authentication_error() {
        let f = Fixture::new("expired", &["fresh"], Some("fresh"));
        f.client.fail_with_status_after(1, 503);
        let err = f
            .refreshing()
            .list_repositories(1)
            .await
            .expect_err("retry failure should fail");
        assert!(err.is_authentication());
        assert_eq!(f.refresher.calls(), 1);
    }

    #[tokio::test]
    async fn without_refresher_unauthorized_is_git_error() {
        let f = Fixture::new("expired", &["fresh"], Some("fresh"));
        let orchestrator = f.non_refreshing();
        assert!(!orchestrator.supports_refresh());

        let err = orchestrator
            .list_repositories(1)
            .await
            .expect_err("401 should fail");
        match err {
            ServiceError::Git(e) => assert!(e.is_unauthorized()),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(f.refresher.calls(), 0);
        assert_eq!(f.client.calls(), 1);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let f = Fixture::new("good", &["good"], Some("fresh"));
        let err = f
            .refreshing()
            .list_repositories(99)
            .await
            .expect_err("unknown user should fail");
        assert!(err.is_not_found());
        assert_eq!(f.client.calls(), 0);
    }

    #[tokio::test]
    async fn concurrent_rejections_share_one_refresh() {
        let f = Fixture::new("expired", &["fresh"], Some("fresh"));
        f.refresher.yield_before_update();
        let orchestrator = f.refreshing();

        let (a, b) = tokio::join!(
            orchestrator.list_repositories(1),
            orchestrator.list_repositories(1)
        );
        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(f.refresher.calls(), 1);
        assert_eq!(f.credentials.update_count(), 1);
    }

    /// Credentials whose stored token is replaced by `rotated_to` as the
    /// first read is answered.
    struct RotatingCredentials {
        inner: Arc<InMemoryCredentials>,
        rotated_to: &'static str,
        rotated: AtomicBool,
    }

    #[async_trait]
    impl CredentialSource for RotatingCredentials {
        async fn access_token(&self, user_id: i64) -> std::result::Result<String, CredentialError> {
            if !self.rotated.swap(true, Ordering::SeqCst) {
                self.inner
                    .update_tokens(user_id, self.rotated_to, "refresh-rotated")
                    .await?;
            }
            self.inner.access_token(user_id).await
        }

        async fn refresh_token(
            &self,
            user_id: i64,
        ) -> std::result::Result<Option<String>, CredentialError> {
            self.inner.refresh_token(user_id).await
        }

        async fn linked_provider(
            &self,
            user_id: i64,
        ) -> std::result::Result<Option<String>, CredentialError> {
            self.inner.linked_provider(user_id).await
        }

        async fn update_tokens(
            &self,
            user_id: i64,
            access_token: &str,
            refresh_token: &str,
        ) -> std::result::Result<(), CredentialError> {
            self.inner
                .update_tokens(user_id, access_token, refresh_token)
                .await
        }
    }

    #[tokio::test]
    async fn refresh_decision_uses_the_token_the_call_sent() {
        let f = Fixture::new("T1", &["T3"], Some("T3"));
        let credentials = Arc::new(RotatingCredentials {
            inner: f.credentials.clone(),
            rotated_to: "revoked-T2",
            rotated: AtomicBool::new(false),
        });
        let orchestrator = ProviderOrchestrator::with_refresher(
            AccessTokenService::new(f.client.clone(), credentials),
            f.refresher.clone(),
        );

        let repos = orchestrator
            .list_repositories(1)
            .await
            .expect("retry with the refreshed token should succeed");
        assert!(!repos.is_empty());
        assert_eq!(f.refresher.calls(), 1);
        assert_eq!(
            f.client.seen_tokens(),
            vec!["revoked-T2".to_string(), "T3".to_string()]
        );
        assert_eq!(f.credentials.access_token_of(1).as_deref(), Some("T3"));
    }

    #[tokio::test]
    async fn is_accessible_never_fails() {
        let f = Fixture::new("expired", &["never"], None);
        assert!(!f.refreshing().is_accessible(1, 10).await);
        assert!(!f.refreshing().is_accessible(99, 10).await);

        let ok = Fixture::new("good", &["good"], None);
        assert!(ok.refreshing().is_accessible(1, 10).await);
    }
}
