use async_trait::async_trait;
use jewelcase_core::catalog::{CatalogItem, CatalogItemInput, NewCatalogItem};
use jewelcase_core::types::DbId;

use crate::error::StoreError;

/// Storage interface for the catalog collection.
///
/// Every implementation must behave identically from the caller's side:
///
/// - `list` is ordered by id ascending.
/// - Ids are assigned by the store and never reused within a process.
/// - Inputs are validated and normalized by the store itself, so a caller
///   cannot bypass the item invariants.
/// - `replace_all` is all-or-nothing: if any element is invalid, or ids
///   collide, the collection is left untouched, and no reader ever sees a
///   partially replaced collection.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All items, ordered by id ascending.
    async fn list(&self) -> Result<Vec<CatalogItem>, StoreError>;

    /// A single item, or `None` if no item has this id.
    async fn find(&self, id: DbId) -> Result<Option<CatalogItem>, StoreError> {
        Ok(self.list().await?.into_iter().find(|item| item.id == id))
    }

    /// Validate `input`, assign a fresh id and persist it.
    async fn create(&self, input: NewCatalogItem) -> Result<CatalogItem, StoreError>;

    /// Replace the editable fields of item `id`. `None` if it does not exist.
    async fn update(
        &self,
        id: DbId,
        input: NewCatalogItem,
    ) -> Result<Option<CatalogItem>, StoreError>;

    /// Remove item `id`, returning it. `None` if it does not exist.
    async fn delete(&self, id: DbId) -> Result<Option<CatalogItem>, StoreError>;

    /// Atomically substitute the whole collection.
    async fn replace_all(
        &self,
        items: Vec<CatalogItemInput>,
    ) -> Result<Vec<CatalogItem>, StoreError>;

    /// Cheap probe used by the health endpoint.
    async fn health_check(&self) -> Result<(), StoreError>;

    /// Short backend identifier for logs and health output.
    fn backend_name(&self) -> &'static str;
}
