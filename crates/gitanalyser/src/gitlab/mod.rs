//! GitLab REST v4 provider.
//!
//! - [`client`] - [`GitLabClient`], the [`ProviderClient`](crate::platform::ProviderClient) implementation
//! - [`oauth`] - Refresh-token grant and [`GitLabTokenRefresher`]
//! - [`error`] - Error types and 401 classification
//! - [`types`] - Response payloads and defaults
//! - [`convert`] - Payload to model conversion

mod client;
mod convert;
mod error;
pub mod oauth;
mod types;

pub use client::{GitLabClient, GitLabOptions};
pub use error::GitLabError;
pub use oauth::{GitLabOAuthConfig, GitLabTokenRefresher};
pub use types::DEFAULT_HOST;
