use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::debug;

use crate::entity::user_account::{Column, Entity as UserAccount, Model};

use super::CredentialSource;
use super::errors::CredentialError;

/// [`CredentialSource`] over the `user_account` table.
#[derive(Clone)]
pub struct DbCredentialSource {
    db: Arc<DatabaseConnection>,
}

impl DbCredentialSource {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn account(&self, user_id: i64) -> Result<Model, CredentialError> {
        UserAccount::find_by_id(user_id)
            .one(self.db.as_ref())
            .await?
            .ok_or(CredentialError::NotFound { user_id })
    }
}

#[async_trait]
impl CredentialSource for DbCredentialSource {
    async fn access_token(&self, user_id: i64) -> Result<String, CredentialError> {
        Ok(self.account(user_id).await?.access_token)
    }

    async fn refresh_token(&self, user_id: i64) -> Result<Option<String>, CredentialError> {
        Ok(self.account(user_id).await?.refresh_token)
    }

    async fn linked_provider(&self, user_id: i64) -> Result<Option<String>, CredentialError> {
        Ok(self.account(user_id).await?.authentication_provider)
    }

    async fn update_tokens(
        &self,
        user_id: i64,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(), CredentialError> {
        let result = UserAccount::update_many()
            .col_expr(Column::AccessToken, Expr::value(access_token))
            .col_expr(Column::RefreshToken, Expr::value(refresh_token))
            .filter(Column::Id.eq(user_id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(CredentialError::NotFound { user_id });
        }

        debug!(user_id, "stored rotated tokens");
        Ok(())
    }
}
