//! Provider lookup table.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entity::auth_provider::AuthProvider;
use crate::github::{GitHubClient, GitHubOptions};
use crate::gitlab::{GitLabClient, GitLabOAuthConfig, GitLabOptions, GitLabTokenRefresher};
use crate::http::HttpTransport;
use crate::store::CredentialSource;

use super::access::AccessTokenService;
use super::orchestrator::ProviderOrchestrator;
use super::provider::GitProvider;

/// Settings for [`ProviderRegistry::standard`].
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    pub github: GitHubOptions,
    pub gitlab: GitLabOptions,
    pub gitlab_oauth: GitLabOAuthConfig,
}

/// Maps each [`AuthProvider`] to the [`GitProvider`] serving it.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<AuthProvider, Arc<dyn GitProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The production wiring: GitHub without token refresh, GitLab with the
    /// OAuth refresh grant. Both share one transport and credential source.
    pub fn standard(
        settings: ProviderSettings,
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        let github = GitHubClient::new(settings.github, Arc::clone(&transport));
        let github = ProviderOrchestrator::new(AccessTokenService::new(
            Arc::new(github),
            Arc::clone(&credentials),
        ));

        let gitlab = GitLabClient::new(settings.gitlab, Arc::clone(&transport));
        let refresher =
            GitLabTokenRefresher::new(settings.gitlab_oauth, transport, Arc::clone(&credentials));
        let gitlab = ProviderOrchestrator::with_refresher(
            AccessTokenService::new(Arc::new(gitlab), credentials),
            Arc::new(refresher),
        );

        Self::new().with(Arc::new(github)).with(Arc::new(gitlab))
    }

    /// Register `provider` under its own [`GitProvider::provider`] key,
    /// replacing any previous entry.
    pub fn register(&mut self, provider: Arc<dyn GitProvider>) {
        self.providers.insert(provider.provider(), provider);
    }

    pub fn with(mut self, provider: Arc<dyn GitProvider>) -> Self {
        self.register(provider);
        self
    }

    pub fn get(&self, provider: AuthProvider) -> Option<&Arc<dyn GitProvider>> {
        self.providers.get(&provider)
    }

    /// Registered providers in [`AuthProvider::ALL`] order.
    pub fn providers(&self) -> Vec<AuthProvider> {
        AuthProvider::ALL
            .into_iter()
            .filter(|p| self.providers.contains_key(p))
            .collect()
    }
}
