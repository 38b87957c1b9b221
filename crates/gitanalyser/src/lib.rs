//! gitanalyser - per-user GitHub and GitLab access for repository analysis.
//!
//! This library resolves which provider a user's account is linked to, calls
//! that provider's REST API with the user's stored token, refreshes expired
//! GitLab tokens once per failure, and keeps the locally cached repository
//! list in step with what the account can still see.
//!
//! # Features
//!
//! - `sqlite` (default) - SQLite driver for [`connect`].
//! - `postgres` - PostgreSQL driver for [`connect`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gitanalyser::http::ReqwestTransport;
//! use gitanalyser::service::{GitService, ProviderRegistry, ProviderSettings};
//! use gitanalyser::store::{DbCredentialSource, DbRepositoryStore};
//!
//! let db = Arc::new(gitanalyser::connect("sqlite://analyser.db?mode=rwc").await?);
//! let credentials = Arc::new(DbCredentialSource::new(Arc::clone(&db)));
//! let transport = Arc::new(ReqwestTransport::with_timeout(gitanalyser::http::DEFAULT_TIMEOUT)?);
//! let service = GitService::new(
//!     ProviderRegistry::standard(ProviderSettings::default(), transport, credentials.clone()),
//!     credentials,
//!     Arc::new(DbRepositoryStore::new(db)),
//! );
//!
//! // Lists upstream repositories and prunes stale cached ones
//! let repos = service.list_repositories(42).await?;
//! ```

pub mod db;
pub mod entity;
pub mod github;
pub mod gitlab;
pub mod http;
pub mod platform;
pub mod service;
pub mod store;

#[cfg(test)]
mod testing;

pub use db::connect;
pub use entity::prelude::*;
pub use platform::{
    Committer, CommitterStats, GitError, ProviderClient, ProviderError, RemoteBranch,
    RemoteCommit, RemoteRepository,
};
pub use service::{GitService, ProviderRegistry, ProviderSettings, ServiceError};
pub use store::{CachedRepositoryStore, CredentialSource};
