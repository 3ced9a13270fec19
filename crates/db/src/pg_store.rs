//! PostgreSQL catalog store over the `catalog_items` table.
//!
//! Ids come from the table's `BIGSERIAL` sequence, so they are never reused.
//! Bulk replace runs inside one transaction and then moves the sequence past
//! the highest id it inserted.

use async_trait::async_trait;
use jewelcase_core::catalog::{
    keep_created_at, prepare_replacement, CatalogItem, CatalogItemInput, NewCatalogItem,
};
use jewelcase_core::types::{DbId, Timestamp};
use sqlx::{FromRow, PgPool};

use crate::error::StoreError;
use crate::store::CatalogStore;

/// Column list for `catalog_items` queries.
const COLUMNS: &str = "id, name, category, price, image, description, created_at, updated_at";

/// A row from the `catalog_items` table.
#[derive(Debug, FromRow)]
struct CatalogRow {
    id: DbId,
    name: String,
    category: String,
    price: i64,
    image: String,
    description: String,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl From<CatalogRow> for CatalogItem {
    fn from(row: CatalogRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category: row.category,
            price: row.price,
            image: row.image,
            description: row.description,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

/// Catalog stored in PostgreSQL.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn list(&self) -> Result<Vec<CatalogItem>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM catalog_items ORDER BY id");
        let rows = sqlx::query_as::<_, CatalogRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(CatalogItem::from).collect())
    }

    async fn find(&self, id: DbId) -> Result<Option<CatalogItem>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM catalog_items WHERE id = $1");
        let row = sqlx::query_as::<_, CatalogRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(CatalogItem::from))
    }

    async fn create(&self, input: NewCatalogItem) -> Result<CatalogItem, StoreError> {
        let fields = input.validated()?;
        let query = format!(
            "INSERT INTO catalog_items (name, category, price, image, description) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, CatalogRow>(&query)
            .bind(&fields.name)
            .bind(&fields.category)
            .bind(fields.price)
            .bind(&fields.image)
            .bind(&fields.description)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn update(
        &self,
        id: DbId,
        input: NewCatalogItem,
    ) -> Result<Option<CatalogItem>, StoreError> {
        let fields = input.validated()?;
        let query = format!(
            "UPDATE catalog_items SET \
                 name = $2, category = $3, price = $4, image = $5, description = $6, \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, CatalogRow>(&query)
            .bind(id)
            .bind(&fields.name)
            .bind(&fields.category)
            .bind(fields.price)
            .bind(&fields.image)
            .bind(&fields.description)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(CatalogItem::from))
    }

    async fn delete(&self, id: DbId) -> Result<Option<CatalogItem>, StoreError> {
        let query = format!("DELETE FROM catalog_items WHERE id = $1 RETURNING {COLUMNS}");
        let row = sqlx::query_as::<_, CatalogRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(CatalogItem::from))
    }

    async fn replace_all(
        &self,
        inputs: Vec<CatalogItemInput>,
    ) -> Result<Vec<CatalogItem>, StoreError> {
        let mut items = prepare_replacement(inputs, chrono::Utc::now())?;

        let mut tx = self.pool.begin().await?;

        let previous: Vec<(DbId, Timestamp)> =
            sqlx::query_as("SELECT id, created_at FROM catalog_items FOR UPDATE")
                .fetch_all(&mut *tx)
                .await?;
        keep_created_at(&mut items, previous.into_iter().map(|(id, at)| (id, Some(at))));

        sqlx::query("DELETE FROM catalog_items")
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO catalog_items \
                 (id, name, category, price, image, description, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        let mut stored = Vec::with_capacity(items.len());
        for item in &items {
            let row = sqlx::query_as::<_, CatalogRow>(&query)
                .bind(item.id)
                .bind(&item.name)
                .bind(&item.category)
                .bind(item.price)
                .bind(&item.image)
                .bind(&item.description)
                .bind(item.created_at.unwrap_or_else(chrono::Utc::now))
                .bind(item.updated_at.unwrap_or_else(chrono::Utc::now))
                .fetch_one(&mut *tx)
                .await?;
            stored.push(CatalogItem::from(row));
        }

        // Move the sequence past every explicit id, never backwards.
        sqlx::query(
            "SELECT setval( \
                 pg_get_serial_sequence('catalog_items', 'id'), \
                 GREATEST((SELECT COALESCE(MAX(id), 0) FROM catalog_items), s.last_value), \
                 EXISTS (SELECT 1 FROM catalog_items) OR s.is_called \
             ) FROM catalog_items_id_seq s",
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(count = stored.len(), "Catalog replaced");
        Ok(stored)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
