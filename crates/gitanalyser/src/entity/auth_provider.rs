//! Authentication provider a user account is linked to.
//!
//! The web application stores the provider as free text on `user_account`, so
//! this is not a database enum; parsing happens at the service boundary.

use serde::{Deserialize, Serialize};

/// Git hosting providers a user can authenticate with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    /// github.com
    GitHub,
    /// GitLab, hosted or self-managed
    GitLab,
}

impl AuthProvider {
    pub const ALL: [AuthProvider; 2] = [AuthProvider::GitHub, AuthProvider::GitLab];
}

impl std::fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthProvider::GitHub => write!(f, "github"),
            AuthProvider::GitLab => write!(f, "gitlab"),
        }
    }
}

impl std::str::FromStr for AuthProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "github" => Ok(AuthProvider::GitHub),
            "gitlab" => Ok(AuthProvider::GitLab),
            _ => Err(format!("Unknown authentication provider: {}", s)),
        }
    }
}
