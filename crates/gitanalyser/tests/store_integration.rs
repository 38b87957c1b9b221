//! Integration tests for the credential and repository stores.
//!
//! These tests require the `sqlite` feature and use an in-memory SQLite
//! database with the web application's tables created from the entities.

#![cfg(feature = "sqlite")]

use std::collections::HashSet;
use std::sync::Arc;

use gitanalyser::connect;
use gitanalyser::entity::{saved_repository, user_account};
use gitanalyser::store::{
    CachedRepositoryStore, CredentialError, CredentialSource, DbCredentialSource,
    DbRepositoryStore,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Schema, Set,
};

/// Create an in-memory SQLite database with both tables.
async fn setup_test_db() -> Arc<DatabaseConnection> {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    db.execute(backend.build(&schema.create_table_from_entity(user_account::Entity)))
        .await
        .expect("Failed to create user_account");
    db.execute(backend.build(&schema.create_table_from_entity(saved_repository::Entity)))
        .await
        .expect("Failed to create saved_repository");
    Arc::new(db)
}

async fn insert_user(db: &DatabaseConnection, id: i64, provider: Option<&str>) {
    user_account::ActiveModel {
        id: Set(id),
        username: Set(format!("user-{id}")),
        access_token: Set(format!("access-{id}")),
        refresh_token: Set(Some(format!("refresh-{id}"))),
        authentication_provider: Set(provider.map(str::to_string)),
    }
    .insert(db)
    .await
    .expect("Failed to insert user");
}

async fn save_repositories(db: &DatabaseConnection, user_id: i64, platform_ids: &[i64]) {
    for platform_id in platform_ids {
        saved_repository::ActiveModel {
            user_id: Set(user_id),
            platform_id: Set(*platform_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to insert saved repository");
    }
}

async fn saved_ids(db: &DatabaseConnection, user_id: i64) -> Vec<i64> {
    let mut ids: Vec<i64> = saved_repository::Entity::find()
        .filter(saved_repository::Column::UserId.eq(user_id))
        .all(db)
        .await
        .expect("Failed to query saved repositories")
        .into_iter()
        .map(|r| r.platform_id)
        .collect();
    ids.sort_unstable();
    ids
}

#[tokio::test]
async fn test_credentials_read_and_rotate() {
    let db = setup_test_db().await;
    insert_user(&db, 1, Some("gitlab")).await;
    let credentials = DbCredentialSource::new(Arc::clone(&db));

    assert_eq!(credentials.access_token(1).await.unwrap(), "access-1");
    assert_eq!(
        credentials.refresh_token(1).await.unwrap().as_deref(),
        Some("refresh-1")
    );
    assert_eq!(
        credentials.linked_provider(1).await.unwrap().as_deref(),
        Some("gitlab")
    );

    credentials
        .update_tokens(1, "access-2", "refresh-2")
        .await
        .expect("update should succeed");

    let stored = user_account::Entity::find_by_id(1)
        .one(&*db)
        .await
        .unwrap()
        .expect("user exists");
    assert_eq!(stored.access_token, "access-2");
    assert_eq!(stored.refresh_token.as_deref(), Some("refresh-2"));
    assert_eq!(stored.username, "user-1");
}

#[tokio::test]
async fn test_credentials_unknown_user_is_not_found() {
    let db = setup_test_db().await;
    let credentials = DbCredentialSource::new(db);

    let err = credentials.access_token(9).await.unwrap_err();
    assert!(matches!(err, CredentialError::NotFound { user_id: 9 }));

    let err = credentials
        .update_tokens(9, "access", "refresh")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_all_except_prunes_only_that_user() {
    let db = setup_test_db().await;
    insert_user(&db, 1, Some("github")).await;
    insert_user(&db, 2, Some("github")).await;
    save_repositories(&db, 1, &[10, 11, 12, 13]).await;
    save_repositories(&db, 2, &[10, 99]).await;
    let store = DbRepositoryStore::new(Arc::clone(&db));

    let keep: HashSet<i64> = [11, 13, 500].into_iter().collect();
    let deleted = store.delete_all_except(1, &keep).await.unwrap();

    assert_eq!(deleted, 2);
    assert_eq!(saved_ids(&db, 1).await, vec![11, 13]);
    assert_eq!(saved_ids(&db, 2).await, vec![10, 99]);
}

#[tokio::test]
async fn test_delete_all_except_with_empty_keep_clears_user() {
    let db = setup_test_db().await;
    insert_user(&db, 1, Some("gitlab")).await;
    insert_user(&db, 2, Some("gitlab")).await;
    save_repositories(&db, 1, &[1, 2]).await;
    save_repositories(&db, 2, &[3]).await;
    let store = DbRepositoryStore::new(Arc::clone(&db));

    let deleted = store.delete_all_except(1, &HashSet::new()).await.unwrap();

    assert_eq!(deleted, 2);
    assert!(saved_ids(&db, 1).await.is_empty());
    assert_eq!(saved_ids(&db, 2).await, vec![3]);
}
