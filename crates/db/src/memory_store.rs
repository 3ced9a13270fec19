use async_trait::async_trait;
use jewelcase_core::catalog::{
    keep_created_at, prepare_replacement, CatalogItem, CatalogItemInput, IdSequence,
    NewCatalogItem,
};
use jewelcase_core::types::DbId;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::CatalogStore;

/// In-process catalog with the same contract as the persistent stores.
#[derive(Default)]
pub struct MemoryCatalogStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    /// Kept sorted by id.
    items: Vec<CatalogItem>,
    ids: IdSequence,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing collection (e.g. seeded test data).
    pub fn with_items(mut items: Vec<CatalogItem>) -> Self {
        items.sort_by_key(|item| item.id);
        let mut ids = IdSequence::new();
        ids.observe(&items);
        Self {
            inner: RwLock::new(Inner { items, ids }),
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn list(&self) -> Result<Vec<CatalogItem>, StoreError> {
        Ok(self.inner.read().await.items.clone())
    }

    async fn find(&self, id: DbId) -> Result<Option<CatalogItem>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.items.iter().find(|item| item.id == id).cloned())
    }

    async fn create(&self, input: NewCatalogItem) -> Result<CatalogItem, StoreError> {
        let fields = input.validated()?;
        let mut inner = self.inner.write().await;
        let Inner { items, ids } = &mut *inner;

        let item = fields.into_item(ids.allocate(items.iter())?, chrono::Utc::now());
        items.push(item.clone());
        Ok(item)
    }

    async fn update(
        &self,
        id: DbId,
        input: NewCatalogItem,
    ) -> Result<Option<CatalogItem>, StoreError> {
        let fields = input.validated()?;
        let mut inner = self.inner.write().await;

        Ok(inner
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .map(|item| {
                item.apply(fields, chrono::Utc::now());
                item.clone()
            }))
    }

    async fn delete(&self, id: DbId) -> Result<Option<CatalogItem>, StoreError> {
        let mut inner = self.inner.write().await;
        let index = inner.items.iter().position(|item| item.id == id);
        Ok(index.map(|i| inner.items.remove(i)))
    }

    async fn replace_all(
        &self,
        inputs: Vec<CatalogItemInput>,
    ) -> Result<Vec<CatalogItem>, StoreError> {
        let mut items = prepare_replacement(inputs, chrono::Utc::now())?;
        let mut inner = self.inner.write().await;
        keep_created_at(&mut items, inner.items.iter().map(|item| (item.id, item.created_at)));
        inner.ids.observe(&items);
        inner.items = items.clone();
        Ok(items)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
