//! Token lookup in front of a [`ProviderClient`].

use std::sync::Arc;

use thiserror::Error;

use crate::entity::auth_provider::AuthProvider;
use crate::platform::{
    self, ProviderClient, ProviderError, RemoteBranch, RemoteCommit, RemoteRepository,
};
use crate::store::{CredentialError, CredentialSource};

/// Failure of a single authenticated call.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    /// The provider call failed; `token` is the access token it was sent with.
    #[error("{source}")]
    Provider {
        token: String,
        #[source]
        source: ProviderError,
    },
}

fn sent_with<T>(token: String, result: platform::Result<T>) -> Result<T, AccessError> {
    result.map_err(|source| AccessError::Provider { token, source })
}

/// Reads the user's current access token and calls the provider client with it.
///
/// Performs exactly one provider call per operation; a rejected token comes
/// back as `AccessError::Provider` carrying the token and an
/// `Unauthorized` source.
pub struct AccessTokenService {
    client: Arc<dyn ProviderClient>,
    credentials: Arc<dyn CredentialSource>,
}

impl AccessTokenService {
    pub fn new(client: Arc<dyn ProviderClient>, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            client,
            credentials,
        }
    }

    pub fn provider(&self) -> AuthProvider {
        self.client.provider()
    }

    pub async fn current_token(&self, user_id: i64) -> Result<String, CredentialError> {
        self.credentials.access_token(user_id).await
    }

    pub async fn list_repositories(
        &self,
        user_id: i64,
    ) -> Result<Vec<RemoteRepository>, AccessError> {
        let token = self.current_token(user_id).await?;
        let result = self.client.list_repositories(&token).await;
        sent_with(token, result)
    }

    pub async fn get_repository(
        &self,
        user_id: i64,
        platform_id: i64,
    ) -> Result<RemoteRepository, AccessError> {
        let token = self.current_token(user_id).await?;
        let result = self.client.get_repository(&token, platform_id).await;
        sent_with(token, result)
    }

    pub async fn list_branches(
        &self,
        user_id: i64,
        platform_id: i64,
    ) -> Result<Vec<RemoteBranch>, AccessError> {
        let token = self.current_token(user_id).await?;
        let result = self.client.list_branches(&token, platform_id).await;
        sent_with(token, result)
    }

    pub async fn list_commits(
        &self,
        user_id: i64,
        platform_id: i64,
        branch: Option<&str>,
    ) -> Result<Vec<RemoteCommit>, AccessError> {
        let token = self.current_token(user_id).await?;
        let result = self.client.list_commits(&token, platform_id, branch).await;
        sent_with(token, result)
    }
}
