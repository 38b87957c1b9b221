//! GitLab OAuth refresh-token grant.
//!
//! GitLab OAuth access tokens expire after two hours. When an API call comes
//! back 401, [`GitLabTokenRefresher`] exchanges the stored refresh token for a
//! new access/refresh pair and writes both back through the
//! [`CredentialSource`]. GitLab invalidates the old refresh token on success,
//! so a refresh can only be performed once per stored token.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::http::{HttpRequest, HttpTransport};
use crate::service::{RefreshError, TokenRefresher};
use crate::store::CredentialSource;

use super::client::base_url;
use super::types::DEFAULT_HOST;

/// OAuth application registration used for the refresh grant.
#[derive(Debug, Clone)]
pub struct GitLabOAuthConfig {
    /// GitLab host the application is registered on.
    pub host: String,
    pub client_id: String,
    pub client_secret: String,
    /// Redirect URI the application was registered with.
    pub redirect_uri: String,
}

impl Default for GitLabOAuthConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
        }
    }
}

/// Successful token response. Both tokens are required.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Unix timestamp the token was created at.
    #[serde(default)]
    pub created_at: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchange `refresh_token` for a new token pair.
///
/// The grant parameters are sent as an `application/x-www-form-urlencoded`
/// POST body, not as query parameters on the token URL.
///
/// # Errors
///
/// - [`RefreshError::Http`] when the token endpoint is unreachable
/// - [`RefreshError::Status`] on a non-2xx answer (e.g. `invalid_grant`)
/// - [`RefreshError::Parse`] when either token is missing from the answer
pub async fn request_token_refresh(
    transport: &dyn HttpTransport,
    config: &GitLabOAuthConfig,
    refresh_token: &str,
) -> Result<AccessTokenResponse, RefreshError> {
    let url = format!("{}/oauth/token", base_url(&config.host));
    let body = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("client_id", &config.client_id)
        .append_pair("client_secret", &config.client_secret)
        .append_pair("refresh_token", refresh_token)
        .append_pair("grant_type", "refresh_token")
        .append_pair("redirect_uri", &config.redirect_uri)
        .finish();

    let mut request = HttpRequest::post(url)
        .header("Accept", "application/json")
        .header("Content-Type", "application/x-www-form-urlencoded");
    request.body = body.into_bytes();

    let response = transport.send(request).await?;

    if !response.is_success() {
        let message = response
            .json::<TokenErrorResponse>()
            .map(|e| e.error_description.unwrap_or(e.error))
            .unwrap_or_else(|_| response.body_text());
        return Err(RefreshError::Status {
            status: response.status,
            message,
        });
    }

    response
        .json::<AccessTokenResponse>()
        .map_err(|e| RefreshError::Parse(e.to_string()))
}

/// [`TokenRefresher`] for GitLab accounts.
pub struct GitLabTokenRefresher {
    transport: Arc<dyn HttpTransport>,
    config: GitLabOAuthConfig,
    credentials: Arc<dyn CredentialSource>,
}

impl GitLabTokenRefresher {
    pub fn new(
        config: GitLabOAuthConfig,
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            transport,
            config,
            credentials,
        }
    }
}

#[async_trait]
impl TokenRefresher for GitLabTokenRefresher {
    async fn refresh(&self, user_id: i64) -> Result<(), RefreshError> {
        let refresh_token = self
            .credentials
            .refresh_token(user_id)
            .await?
            .filter(|t| !t.is_empty())
            .ok_or(RefreshError::MissingRefreshToken { user_id })?;

        let tokens =
            request_token_refresh(self.transport.as_ref(), &self.config, &refresh_token).await?;

        self.credentials
            .update_tokens(user_id, &tokens.access_token, &tokens.refresh_token)
            .await?;

        info!(
            user_id,
            expires_in = ?tokens.expires_in,
            "refreshed GitLab access token"
        );
        Ok(())
    }
}
