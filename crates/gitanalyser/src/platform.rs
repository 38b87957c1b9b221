//! Provider-agnostic model and client trait.
//!
//! GitHub and GitLab clients both normalize into the types defined here and
//! classify failures into [`ProviderError`], so the orchestration layer never
//! sees provider-native payloads.
//!
//! # Example
//!
//! ```ignore
//! use gitanalyser::platform::{ProviderClient, ProviderError};
//!
//! async fn names<C: ProviderClient>(client: &C, token: &str) -> Result<Vec<String>, ProviderError> {
//!     let repos = client.list_repositories(token).await?;
//!     Ok(repos.into_iter().map(|r| r.name).collect())
//! }
//! ```

mod errors;
mod types;

pub use errors::{GitError, ProviderError, Result, short_error_message};
pub use types::{
    Committer, CommitterStats, ProviderClient, RemoteBranch, RemoteCommit, RemoteRepository,
    sort_chronologically,
};
