//! Persistence for the jewelry catalog.
//!
//! [`CatalogStore`] is the one storage interface the API talks to. Three
//! implementations share its contract:
//!
//! - [`FileCatalogStore`]: whole collection in a single JSON file, rewritten on
//!   every mutation.
//! - [`PgCatalogStore`]: one row per item in PostgreSQL.
//! - [`MemoryCatalogStore`]: in-process fake for tests and demos.

pub mod error;
pub mod file_store;
pub mod memory_store;
pub mod pg_store;
pub mod store;

use sqlx::postgres::PgPoolOptions;

pub use error::StoreError;
pub use file_store::FileCatalogStore;
pub use memory_store::MemoryCatalogStore;
pub use pg_store::PgCatalogStore;
pub use store::CatalogStore;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
