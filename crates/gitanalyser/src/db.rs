//! Database connection utilities.
//!
//! The `user_account` and `saved_repository` tables belong to the web
//! application; this crate only connects to them.

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

const SQLITE_PRAGMAS: [&str; 3] = [
    "PRAGMA journal_mode=WAL",
    "PRAGMA busy_timeout=5000",
    "PRAGMA synchronous=NORMAL",
];

/// Apply the SQLite pragmas the web application runs with.
///
/// - `journal_mode=WAL` so the web app and this crate can read while the other writes
/// - `busy_timeout=5000` to wait on locks instead of failing
/// - `synchronous=NORMAL`, safe under WAL
async fn configure_sqlite(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    for pragma in SQLITE_PRAGMAS {
        db.execute(Statement::from_string(backend, pragma.to_string()))
            .await?;
    }
    Ok(())
}

/// Connect to the database shared with the web application.
///
/// SQLite URLs get [`configure_sqlite`] applied.
///
/// # Errors
/// Returns `DbErr` if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    if database_url.starts_with("sqlite:") {
        configure_sqlite(&db).await?;
    }

    tracing::debug!(
        backend = ?db.get_database_backend(),
        "connected to database"
    );
    Ok(db)
}
