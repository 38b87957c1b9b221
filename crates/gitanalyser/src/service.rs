//! Per-user provider access with token refresh and cache repair.
//!
//! Call path for every operation:
//!
//! ```text
//! GitService ─► ProviderRegistry ─► ProviderOrchestrator ─► AccessTokenService ─► ProviderClient
//!   (link lookup,      (by AuthProvider)   (refresh once,         (reads the stored
//!    cache pruning)                          retry once)            access token)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gitanalyser::http::ReqwestTransport;
//! use gitanalyser::service::{GitService, ProviderRegistry, ProviderSettings};
//! use gitanalyser::store::{DbCredentialSource, DbRepositoryStore};
//!
//! let db = Arc::new(gitanalyser::connect("sqlite://gitanalyser.db?mode=rwc").await?);
//! let credentials = Arc::new(DbCredentialSource::new(Arc::clone(&db)));
//! let registry = ProviderRegistry::standard(
//!     ProviderSettings::default(),
//!     Arc::new(ReqwestTransport::with_timeout(gitanalyser::http::DEFAULT_TIMEOUT)?),
//!     credentials.clone(),
//! );
//! let service = GitService::new(registry, credentials, Arc::new(DbRepositoryStore::new(db)));
//!
//! let stats = service.get_stats(user_id, platform_id, Some("main")).await?;
//! ```

mod access;
mod errors;
mod facade;
mod orchestrator;
mod provider;
mod refresh;
mod registry;
mod stats;


pub use access::{AccessError, AccessTokenService};
pub use errors::{Result, ServiceError};
pub use facade::GitService;
pub use orchestrator::ProviderOrchestrator;
pub use provider::GitProvider;
pub use refresh::{RefreshError, RefreshLocks, TokenRefresher};
pub use registry::{ProviderRegistry, ProviderSettings};
pub use stats::{committer_stats, distinct_committers};
