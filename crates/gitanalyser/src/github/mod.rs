//! GitHub REST v3 provider.
//!
//! - [`error`] - Error types and 401 classification
//! - [`types`] - Response payloads and defaults
//! - [`client`] - [`GitHubClient`], the [`ProviderClient`](crate::platform::ProviderClient) implementation
//! - [`pagination`] - `Link` header parsing
//! - [`convert`] - Payload to model conversion
//!
//! GitHub issues no refresh tokens, so a rejected token is terminal.

mod client;
mod convert;
mod error;
mod pagination;
mod types;

pub use client::{GitHubClient, GitHubOptions};
pub use error::GitHubError;
pub use pagination::{LinkPagination, parse_link_header};
pub use types::{DEFAULT_API_URL, DEFAULT_COMMIT_STATS_CONCURRENCY};
