//! Flat-file catalog store.
//!
//! The whole collection lives in one pretty-printed JSON array. Every mutation
//! loads the array, changes it in memory and writes it back in full. Writes go
//! to a sibling temp file that is then renamed over the original, so readers
//! only ever see the old or the new collection.
//!
//! A missing file is an empty catalog. A file that cannot be parsed is an
//! error ([`StoreError::Corrupt`]); it is never treated as empty, since the
//! next write would silently destroy whatever the file still held.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use jewelcase_core::catalog::{
    keep_created_at, prepare_replacement, CatalogItem, CatalogItemInput, IdSequence,
    NewCatalogItem,
};
use jewelcase_core::types::DbId;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::store::CatalogStore;

/// Prefix written by the legacy storefront script format
/// (`const jewelryData = [...];`). Accepted on read only.
const LEGACY_PREFIX: &str = "const jewelryData =";

/// Catalog stored as a single JSON file.
pub struct FileCatalogStore {
    path: PathBuf,
    /// Serializes load-mutate-write cycles and carries the id high-water mark.
    writer: Mutex<IdSequence>,
}

impl FileCatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(IdSequence::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the whole collection.
    async fn load(&self) -> Result<Vec<CatalogItem>, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        let mut items = parse_catalog(&content).map_err(|reason| {
            tracing::error!(path = %self.path.display(), %reason, "Catalog file is corrupt");
            StoreError::Corrupt {
                path: self.path.clone(),
                reason,
            }
        })?;
        items.sort_by_key(|item| item.id);
        Ok(items)
    }

    /// Serialize the whole collection and atomically replace the file.
    async fn save(&self, items: &[CatalogItem]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(items).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;

        tracing::debug!(path = %self.path.display(), count = items.len(), "Catalog file written");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "catalog.json".into());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

/// Parse either a plain JSON array or the legacy `const jewelryData = [...];`
/// script form.
fn parse_catalog(content: &str) -> Result<Vec<CatalogItem>, String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let body = match trimmed.strip_prefix(LEGACY_PREFIX) {
        Some(rest) => rest.trim().trim_end_matches(';').trim_end(),
        None => trimmed,
    };

    serde_json::from_str(body).map_err(|e| e.to_string())
}

#[async_trait]
impl CatalogStore for FileCatalogStore {
    async fn list(&self) -> Result<Vec<CatalogItem>, StoreError> {
        self.load().await
    }

    async fn create(&self, input: NewCatalogItem) -> Result<CatalogItem, StoreError> {
        let fields = input.validated()?;
        let mut ids = self.writer.lock().await;

        let mut items = self.load().await?;
        let id = ids.allocate(&items)?;
        let item = fields.into_item(id, chrono::Utc::now());
        items.push(item.clone());
        self.save(&items).await?;

        Ok(item)
    }

    async fn update(
        &self,
        id: DbId,
        input: NewCatalogItem,
    ) -> Result<Option<CatalogItem>, StoreError> {
        let fields = input.validated()?;
        let mut ids = self.writer.lock().await;

        let mut items = self.load().await?;
        ids.observe(&items);
        let Some(item) = items.iter_mut().find(|item| item.id == id) else {
            return Ok(None);
        };
        item.apply(fields, chrono::Utc::now());
        let updated = item.clone();
        self.save(&items).await?;

        Ok(Some(updated))
    }

    async fn delete(&self, id: DbId) -> Result<Option<CatalogItem>, StoreError> {
        let mut ids = self.writer.lock().await;

        let mut items = self.load().await?;
        ids.observe(&items);
        let Some(index) = items.iter().position(|item| item.id == id) else {
            return Ok(None);
        };
        let removed = items.remove(index);
        self.save(&items).await?;

        Ok(Some(removed))
    }

    async fn replace_all(
        &self,
        inputs: Vec<CatalogItemInput>,
    ) -> Result<Vec<CatalogItem>, StoreError> {
        let mut items = prepare_replacement(inputs, chrono::Utc::now())?;
        let mut ids = self.writer.lock().await;

        // Remember ids issued before the replace so they are not handed out
        // again after it.
        if let Ok(previous) = self.load().await {
            ids.observe(&previous);
            keep_created_at(
                &mut items,
                previous.iter().map(|item| (item.id, item.created_at)),
            );
        }
        ids.observe(&items);
        self.save(&items).await?;

        Ok(items)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.load().await.map(|_| ())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json_array() {
        let items = parse_catalog(
            r#"[{"id": 1, "name": "Ring", "category": "ring", "price": 5}]"#,
        )
        .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].image, "");
        assert!(items[0].created_at.is_none());
    }

    #[test]
    fn parses_legacy_script_form() {
        let content = "const jewelryData = [\n    {\"id\": 2, \"name\": \"Pearl\", \
                       \"category\": \"earring\", \"price\": 450, \"image\": \"x.jpg\", \
                       \"description\": \"d\"}\n];\n";
        let items = parse_catalog(content).unwrap();
        assert_eq!(items[0].id, 2);
        assert_eq!(items[0].category, "earring");
    }

    #[test]
    fn blank_file_is_empty_catalog() {
        assert!(parse_catalog("  \n").unwrap().is_empty());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_catalog("{not json").is_err());
    }

    #[test]
    fn temp_file_is_a_hidden_sibling() {
        let store = FileCatalogStore::new("/data/jewelry.json");
        assert_eq!(store.temp_path(), PathBuf::from("/data/.jewelry.json.tmp"));
    }
}
