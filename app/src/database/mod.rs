use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use url::Url;

use crate::{ledger, user};

pub use memory::MemoryStorage;
pub use migrations::run_migrations;
pub use seeder::seed_development_data;

mod memory;
mod migrations;
mod seeder;

pub type Database = sqlx::Pool<sqlx::Postgres>;
pub(crate) type Transaction = sqlx::Transaction<'static, sqlx::Postgres>;

pub async fn connect(url: &Url) -> Result<Database, StorageError> {
    Ok(PgPoolOptions::new().connect(url.as_str()).await?)
}

/// A failure of the storage layer that is not attributable to the caller's input.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Everything the request handlers need from persistence. Implemented by the Postgres pool and by
/// [`MemoryStorage`].
pub trait Storage: user::UserStore + ledger::TransactionStore {}

impl<T: user::UserStore + ledger::TransactionStore> Storage for T {}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CountRow {
    pub count: i64,
}

/// Connects to the Postgres database named by `DATABASE_URL` and brings its schema up to date.
/// Tests sharing the database must use data that cannot collide with other runs.
#[cfg(test)]
pub(crate) async fn test_database() -> Database {
    static MIGRATED: tokio::sync::OnceCell<()> = tokio::sync::OnceCell::const_new();

    let url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a Postgres database");
    let url = Url::parse(&url).expect("DATABASE_URL is not a valid URL");
    let db = connect(&url).await.expect("failed to connect to the database");
    MIGRATED
        .get_or_try_init(|| run_migrations(&db))
        .await
        .expect("failed to run migrations");
    db
}
