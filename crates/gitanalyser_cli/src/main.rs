//! gitanalyser CLI - inspect a user's repositories through their linked GitHub or GitLab account.

mod commands;
mod config;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::git::GitQuery;
use crate::commands::output::OutputFormat;

#[derive(Parser)]
#[command(name = "gitanalyser")]
#[command(version)]
#[command(about = "Query GitHub and GitLab on behalf of analyser users")]
#[command(
    long_about = "gitanalyser reads a user's stored OAuth credentials, calls the Git provider \
their account is linked to, refreshes expired GitLab tokens, and reports repositories, \
branches, commits and per-author statistics. Listing repositories also prunes cached \
repository records the account can no longer see."
)]
#[command(after_long_help = r#"EXAMPLES
    List a user's repositories (and prune stale cached ones):
        $ gitanalyser repos --user 42

    Per-author statistics for a branch, as JSON:
        $ gitanalyser stats --user 42 --repo 1234 --branch main --output json

    Check whether a user can still read a repository:
        $ gitanalyser access --user 42 --repo 1234

CONFIGURATION
    gitanalyser reads configuration from:
      1. ~/.config/gitanalyser/config.toml (or $XDG_CONFIG_HOME/gitanalyser/config.toml)
      2. ./gitanalyser.toml
      3. Environment variables (GITANALYSER_* prefix, nested keys joined by __)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    GITANALYSER_DATABASE__URL             Database shared with the web application
    GITANALYSER_GITLAB__HOST              GitLab host (default: gitlab.com)
    GITANALYSER_GITLAB__CLIENT_ID         GitLab OAuth application id
    GITANALYSER_GITLAB__CLIENT_SECRET     GitLab OAuth application secret
    GITANALYSER_GITLAB__REDIRECT_URI      GitLab OAuth redirect URI
    GITANALYSER_HTTP__TIMEOUT_SECS        Provider request timeout (default: 30)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every user-scoped command.
#[derive(Debug, Clone, Args)]
struct UserOptions {
    /// User account id
    #[arg(short, long)]
    user: i64,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
}

/// Branch selection for commit-based commands.
#[derive(Debug, Clone, Args)]
struct BranchOptions {
    /// Repository id on the provider
    #[arg(short, long)]
    repo: i64,

    /// Branch name (default: the repository's default branch)
    #[arg(short, long)]
    branch: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the user's repositories and prune stale cached records
    Repos {
        #[command(flatten)]
        user: UserOptions,
    },
    /// Show one repository
    Repo {
        #[command(flatten)]
        user: UserOptions,
        /// Repository id on the provider
        #[arg(long)]
        id: i64,
    },
    /// List a repository's branches
    Branches {
        #[command(flatten)]
        user: UserOptions,
        /// Repository id on the provider
        #[arg(short, long)]
        repo: i64,
    },
    /// List a branch's commits, oldest first
    Commits {
        #[command(flatten)]
        user: UserOptions,
        #[command(flatten)]
        branch: BranchOptions,
    },
    /// List distinct commit authors of a branch
    Committers {
        #[command(flatten)]
        user: UserOptions,
        #[command(flatten)]
        branch: BranchOptions,
    },
    /// Per-author commit, addition and deletion totals for a branch
    Stats {
        #[command(flatten)]
        user: UserOptions,
        #[command(flatten)]
        branch: BranchOptions,
    },
    /// Check whether the user can read a repository
    Access {
        #[command(flatten)]
        user: UserOptions,
        /// Repository id on the provider
        #[arg(short, long)]
        repo: i64,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

impl Commands {
    /// Split a user-scoped command into its options and query.
    fn into_query(self) -> Option<(UserOptions, GitQuery)> {
        let pair = match self {
            Commands::Repos { user } => (user, GitQuery::Repositories),
            Commands::Repo { user, id } => (user, GitQuery::Repository { id }),
            Commands::Branches { user, repo } => (user, GitQuery::Branches { repo }),
            Commands::Commits { user, branch } => (
                user,
                GitQuery::Commits {
                    repo: branch.repo,
                    branch: branch.branch,
                },
            ),
            Commands::Committers { user, branch } => (
                user,
                GitQuery::Committers {
                    repo: branch.repo,
                    branch: branch.branch,
                },
            ),
            Commands::Stats { user, branch } => (
                user,
                GitQuery::Stats {
                    repo: branch.repo,
                    branch: branch.branch,
                },
            ),
            Commands::Access { user, repo } => (user, GitQuery::Access { repo }),
            Commands::Completions { .. } => return None,
        };
        Some(pair)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("gitanalyser=info,gitanalyser_cli=info"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();

    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        commands::meta::handle_completions(*shell)?;
        return Ok(());
    }

    let database_url = config
        .database_url()
        .ok_or("Could not determine a database URL; set GITANALYSER_DATABASE__URL")?;

    // Ensure the database directory exists for SQLite
    if let Some(db_path) = config::Config::sqlite_path(&database_url) {
        if db_path.is_relative() {
            tracing::warn!(
                "Database path '{}' is relative - behavior depends on current directory. \
                 Consider using an absolute path.",
                db_path.display()
            );
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
    }

    let Some((user, query)) = cli.command.into_query() else {
        return Ok(());
    };

    let service = commands::git::build_service(&config, &database_url).await?;
    commands::git::handle_query(&service, user.user, query, user.output).await?;

    Ok(())
}
