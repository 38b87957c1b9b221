use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::entity::saved_repository::{Column, Entity as SavedRepository};

use super::CachedRepositoryStore;
use super::errors::StoreError;

/// [`CachedRepositoryStore`] over the `saved_repository` table.
#[derive(Clone)]
pub struct DbRepositoryStore {
    db: Arc<DatabaseConnection>,
}

impl DbRepositoryStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CachedRepositoryStore for DbRepositoryStore {
    async fn delete_all_except(
        &self,
        user_id: i64,
        keep: &HashSet<i64>,
    ) -> Result<u64, StoreError> {
        let mut delete = SavedRepository::delete_many().filter(Column::UserId.eq(user_id));
        if !keep.is_empty() {
            delete = delete.filter(Column::PlatformId.is_not_in(keep.iter().copied()));
        }

        let result = delete.exec(self.db.as_ref()).await?;
        Ok(result.rows_affected)
    }
}
