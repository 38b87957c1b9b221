//! UserAccount entity: a person signed in through GitHub or GitLab OAuth.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_account")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub username: String,
    /// Current provider access token.
    #[sea_orm(column_type = "Text")]
    #[serde(skip_serializing)]
    pub access_token: String,
    /// Refresh token; only GitLab issues one.
    #[sea_orm(column_type = "Text", nullable)]
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    /// Provider the account was linked through, as written by the web app
    /// (`"github"` / `"gitlab"`). Free text, parsed with `AuthProvider::from_str`.
    pub authentication_provider: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::saved_repository::Entity")]
    SavedRepository,
}

impl Related<super::saved_repository::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SavedRepository.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_omits_tokens() {
        let model = Model {
            id: 7,
            username: "octocat".to_string(),
            access_token: "gho_secret".to_string(),
            refresh_token: Some("refresh_secret".to_string()),
            authentication_provider: Some("github".to_string()),
        };

        let json = serde_json::to_string(&model).expect("model serializes");
        assert!(json.contains("octocat"));
        assert!(!json.contains("gho_secret"));
        assert!(!json.contains("refresh_secret"));
    }
}
