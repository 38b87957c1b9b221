//! Configuration file support for gitanalyser.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables prefixed with `GITANALYSER_`, nested keys joined
//!    by `__` (e.g. `GITANALYSER_GITLAB__CLIENT_SECRET`)
//! 3. Config file (~/.config/gitanalyser/config.toml or ./gitanalyser.toml)
//! 4. Built-in defaults
//!
//! The database URL defaults to `sqlite://~/.local/state/gitanalyser/gitanalyser.db`
//! on Linux if not explicitly configured. In production it points at the web
//! application's database.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "postgres://analyser@localhost/analyser"
//!
//! [github]
//! api_url = "https://api.github.com"
//! commit_stats_concurrency = 8
//!
//! [gitlab]
//! host = "gitlab.com"
//! client_id = "..."
//! client_secret = "..."   # or GITANALYSER_GITLAB__CLIENT_SECRET
//! redirect_uri = "https://analyser.example.com/login/oauth2/code/gitlab"
//! all_commits = false
//!
//! [http]
//! timeout_secs = 30
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use gitanalyser::github::{DEFAULT_API_URL, DEFAULT_COMMIT_STATS_CONCURRENCY, GitHubOptions};
use gitanalyser::gitlab::{DEFAULT_HOST, GitLabOAuthConfig, GitLabOptions};
use gitanalyser::service::ProviderSettings;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub github: GitHubConfig,
    pub gitlab: GitLabConfig,
    pub http: HttpConfig,
}

/// Database configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL.
    /// Supports sqlite:// and postgres:// schemes.
    pub url: Option<String>,
}

/// GitHub configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// REST API base URL; change for GitHub Enterprise.
    pub api_url: String,
    /// Concurrent per-commit detail requests when listing commits.
    pub commit_stats_concurrency: usize,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            commit_stats_concurrency: DEFAULT_COMMIT_STATS_CONCURRENCY,
        }
    }
}

/// GitLab configuration, including the OAuth application used for token refresh.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitLabConfig {
    /// GitLab host (e.g., "gitlab.com" or "https://gitlab.example.com").
    pub host: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// List every commit in the project instead of only the ref's history.
    pub all_commits: bool,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            all_commits: false,
        }
    }
}

/// Outbound HTTP settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/gitanalyser/config.toml)
    /// 3. Local config file (./gitanalyser.toml)
    /// 4. Environment variables with GITANALYSER_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("gitanalyser.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./gitanalyser.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // GITANALYSER_GITLAB__CLIENT_ID -> gitlab.client_id
        builder = builder.add_source(
            Environment::with_prefix("GITANALYSER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the database URL, falling back to the default state directory path.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("gitanalyser.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    /// Filesystem path of a `sqlite://` database URL, without query parameters.
    ///
    /// Returns `None` for other backends and for in-memory databases.
    pub fn sqlite_path(database_url: &str) -> Option<PathBuf> {
        let path = database_url.strip_prefix("sqlite://")?;
        let path = path.split('?').next().unwrap_or(path);
        if path.is_empty() || path == ":memory:" {
            return None;
        }
        Some(PathBuf::from(path))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    /// Library-side settings for the standard provider registry.
    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            github: GitHubOptions {
                api_url: self.github.api_url.clone(),
                commit_stats_concurrency: self.github.commit_stats_concurrency.max(1),
            },
            gitlab: GitLabOptions {
                host: self.gitlab.host.clone(),
                all_commits: self.gitlab.all_commits,
            },
            gitlab_oauth: GitLabOAuthConfig {
                host: self.gitlab.host.clone(),
                client_id: self.gitlab.client_id.clone(),
                client_secret: self.gitlab.client_secret.clone(),
                redirect_uri: self.gitlab.redirect_uri.clone(),
            },
        }
    }

    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "gitanalyser").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/gitanalyser` or `~/.local/state/gitanalyser`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "gitanalyser").map(|dirs| {
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }
}
