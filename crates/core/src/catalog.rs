//! Catalog item model and validation rules.
//!
//! A catalog item is the only entity in the system. Ids are always assigned by
//! the server; timestamps are always set by the server. Both persistence
//! strategies in `jewelcase-db` share the rules in this module so they stay
//! observably identical.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Entity name used in `NotFound` errors.
pub const ENTITY: &str = "CatalogItem";

// ---------------------------------------------------------------------------
// Entity and DTOs
// ---------------------------------------------------------------------------

/// A single jewelry product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: DbId,
    pub name: String,
    pub category: String,
    pub price: i64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    /// Absent only on items read from legacy files that predate timestamps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

/// Client-editable fields of a catalog item (create and update payloads).
///
/// Unknown fields such as `id` or timestamps are ignored on deserialization,
/// which is what keeps clients from choosing ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCatalogItem {
    pub name: String,
    pub category: String,
    pub price: i64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
}

/// One element of a bulk-replace payload.
///
/// Elements keep their id when one is given; elements without an id are
/// numbered after the highest id in the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItemInput {
    #[serde(default)]
    pub id: Option<DbId>,
    #[serde(flatten)]
    pub fields: NewCatalogItem,
}

impl From<CatalogItem> for CatalogItemInput {
    fn from(item: CatalogItem) -> Self {
        Self {
            id: Some(item.id),
            fields: NewCatalogItem {
                name: item.name,
                category: item.category,
                price: item.price,
                image: item.image,
                description: item.description,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl NewCatalogItem {
    /// Validate and normalize the payload.
    ///
    /// `name` and `image` are trimmed, `category` is trimmed and lowercased.
    /// Fails when `name` or `category` is empty after trimming or `price` is
    /// negative.
    pub fn validated(self) -> Result<Self, CoreError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::Validation("name must not be empty".into()));
        }

        let category = self.category.trim().to_lowercase();
        if category.is_empty() {
            return Err(CoreError::Validation("category must not be empty".into()));
        }

        if self.price < 0 {
            return Err(CoreError::Validation(format!(
                "price must be non-negative, got {}",
                self.price
            )));
        }

        Ok(Self {
            name,
            category,
            price: self.price,
            image: self.image.trim().to_string(),
            description: self.description,
        })
    }

    /// Build a stored item from an already-validated payload.
    pub fn into_item(self, id: DbId, now: Timestamp) -> CatalogItem {
        CatalogItem {
            id,
            name: self.name,
            category: self.category,
            price: self.price,
            image: self.image,
            description: self.description,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

impl CatalogItem {
    /// Overwrite the editable fields, keeping `id` and `created_at`.
    pub fn apply(&mut self, fields: NewCatalogItem, now: Timestamp) {
        self.name = fields.name;
        self.category = fields.category;
        self.price = fields.price;
        self.image = fields.image;
        self.description = fields.description;
        if self.created_at.is_none() {
            self.created_at = Some(now);
        }
        self.updated_at = Some(now);
    }
}

/// Validate a whole bulk-replace payload and turn it into stored items.
///
/// All-or-nothing: the first invalid element or duplicate id fails the whole
/// payload. The result is ordered by id ascending.
pub fn prepare_replacement(
    inputs: Vec<CatalogItemInput>,
    now: Timestamp,
) -> Result<Vec<CatalogItem>, CoreError> {
    let mut seen = HashSet::with_capacity(inputs.len());
    let mut max_id: DbId = 0;

    for (index, input) in inputs.iter().enumerate() {
        if let Some(id) = input.id {
            if id < 1 {
                return Err(CoreError::Validation(format!(
                    "item {index}: id must be positive, got {id}"
                )));
            }
            if !seen.insert(id) {
                return Err(CoreError::Validation(format!("duplicate id {id}")));
            }
            max_id = max_id.max(id);
        }
    }

    let mut next = max_id;
    let mut items = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.into_iter().enumerate() {
        let fields = input
            .fields
            .validated()
            .map_err(|e| {
                CoreError::Validation(format!("item {index}: {}", validation_message(&e)))
            })?;
        let id = match input.id {
            Some(id) => id,
            None => {
                next = next.checked_add(1).ok_or_else(id_out_of_range)?;
                next
            }
        };
        items.push(fields.into_item(id, now));
    }

    items.sort_by_key(|item| item.id);
    Ok(items)
}

/// Carry `created_at` over from items that already existed under the same id.
///
/// A bulk replace rebuilds every item with `now` as its creation time; this
/// restores the stored one where there is one.
pub fn keep_created_at(
    items: &mut [CatalogItem],
    previous: impl IntoIterator<Item = (DbId, Option<Timestamp>)>,
) {
    let created: HashMap<DbId, Timestamp> = previous
        .into_iter()
        .filter_map(|(id, created_at)| created_at.map(|at| (id, at)))
        .collect();
    for item in items {
        if let Some(at) = created.get(&item.id) {
            item.created_at = Some(*at);
        }
    }
}

fn id_out_of_range() -> CoreError {
    CoreError::Validation("id out of range".into())
}

fn validation_message(err: &CoreError) -> String {
    match err {
        CoreError::Validation(msg) => msg.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Id allocation
// ---------------------------------------------------------------------------

/// Monotonic id allocator for stores that keep the collection in one place.
///
/// Allocates `max(existing) + 1`, but never hands out an id at or below one it
/// has already issued, so deleting the highest item and creating a new one
/// does not recycle the deleted id.
#[derive(Debug, Default, Clone)]
pub struct IdSequence {
    high_water: DbId,
}

impl IdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record ids that exist in the collection.
    pub fn observe<'a>(&mut self, items: impl IntoIterator<Item = &'a CatalogItem>) {
        for item in items {
            self.high_water = self.high_water.max(item.id);
        }
    }

    /// Issue the next id, given the ids currently in the collection.
    ///
    /// Fails once the id space is exhausted instead of wrapping.
    pub fn allocate<'a>(
        &mut self,
        items: impl IntoIterator<Item = &'a CatalogItem>,
    ) -> Result<DbId, CoreError> {
        self.observe(items);
        self.high_water = self.high_water.checked_add(1).ok_or_else(id_out_of_range)?;
        Ok(self.high_water)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str, category: &str, price: i64) -> NewCatalogItem {
        NewCatalogItem {
            name: name.into(),
            category: category.into(),
            price,
            image: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn validated_normalizes_category_and_trims_name() {
        let item = fields("  Gold Ring ", " RING ", 100).validated().unwrap();
        assert_eq!(item.name, "Gold Ring");
        assert_eq!(item.category, "ring");
    }

    #[test]
    fn validated_rejects_blank_name() {
        assert!(fields("   ", "ring", 1).validated().is_err());
    }

    #[test]
    fn validated_rejects_blank_category() {
        assert!(fields("Ring", " ", 1).validated().is_err());
    }

    #[test]
    fn validated_rejects_negative_price() {
        assert!(fields("Ring", "ring", -1).validated().is_err());
        assert!(fields("Ring", "ring", 0).validated().is_ok());
    }

    #[test]
    fn create_payload_ignores_client_id() {
        let json = serde_json::json!({
            "id": 999, "name": "Ring", "category": "ring", "price": 5
        });
        let parsed: NewCatalogItem = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, fields("Ring", "ring", 5));
    }

    #[test]
    fn apply_keeps_id_and_created_at() {
        let t0 = chrono::Utc::now();
        let mut item = fields("Ring", "ring", 5).into_item(3, t0);
        let t1 = t0 + chrono::Duration::seconds(10);
        item.apply(fields("Band", "ring", 7), t1);
        assert_eq!(item.id, 3);
        assert_eq!(item.name, "Band");
        assert_eq!(item.created_at, Some(t0));
        assert_eq!(item.updated_at, Some(t1));
    }

    #[test]
    fn replacement_keeps_ids_and_numbers_the_rest() {
        let now = chrono::Utc::now();
        let inputs = vec![
            CatalogItemInput { id: Some(7), fields: fields("A", "ring", 1) },
            CatalogItemInput { id: None, fields: fields("B", "ring", 1) },
            CatalogItemInput { id: Some(2), fields: fields("C", "ring", 1) },
        ];
        let items = prepare_replacement(inputs, now).unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 7, 8]);
        assert_eq!(items[2].name, "B");
    }

    #[test]
    fn replacement_rejects_duplicate_ids() {
        let now = chrono::Utc::now();
        let inputs = vec![
            CatalogItemInput { id: Some(1), fields: fields("A", "ring", 1) },
            CatalogItemInput { id: Some(1), fields: fields("B", "ring", 1) },
        ];
        assert!(prepare_replacement(inputs, now).is_err());
    }

    #[test]
    fn replacement_fails_whole_payload_on_one_invalid_item() {
        let now = chrono::Utc::now();
        let inputs = vec![
            CatalogItemInput { id: Some(1), fields: fields("A", "ring", 1) },
            CatalogItemInput { id: Some(2), fields: fields("B", "ring", -5) },
        ];
        let err = prepare_replacement(inputs, now).unwrap_err();
        assert!(err.to_string().contains("item 1"));
    }

    #[test]
    fn id_sequence_never_reuses_deleted_max() {
        let now = chrono::Utc::now();
        let mut seq = IdSequence::new();
        let mut items = vec![fields("A", "ring", 1).into_item(1, now)];

        let id = seq.allocate(&items).unwrap();
        assert_eq!(id, 2);
        items.push(fields("B", "ring", 1).into_item(id, now));

        // Remove the highest item; the next id must still move forward.
        items.pop();
        assert_eq!(seq.allocate(&items).unwrap(), 3);
    }

    #[test]
    fn id_sequence_follows_externally_raised_max() {
        let now = chrono::Utc::now();
        let mut seq = IdSequence::new();
        let items = vec![fields("A", "ring", 1).into_item(40, now)];
        assert_eq!(seq.allocate(&items).unwrap(), 41);
    }

    #[test]
    fn id_sequence_fails_at_the_top_of_the_id_space() {
        let now = chrono::Utc::now();
        let mut seq = IdSequence::new();
        let items = vec![fields("A", "ring", 1).into_item(DbId::MAX, now)];
        let err = seq.allocate(&items).unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: id out of range");
    }

    #[test]
    fn replacement_accepts_max_id_when_nothing_needs_numbering() {
        let now = chrono::Utc::now();
        let inputs = vec![CatalogItemInput { id: Some(DbId::MAX), fields: fields("A", "ring", 1) }];
        let items = prepare_replacement(inputs, now).unwrap();
        assert_eq!(items[0].id, DbId::MAX);
    }

    #[test]
    fn replacement_rejects_numbering_past_max_id() {
        let now = chrono::Utc::now();
        let inputs = vec![
            CatalogItemInput { id: Some(DbId::MAX), fields: fields("A", "ring", 1) },
            CatalogItemInput { id: None, fields: fields("B", "ring", 1) },
        ];
        let err = prepare_replacement(inputs, now).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ref msg) if msg == "id out of range"));
    }

    #[test]
    fn keep_created_at_restores_existing_items_only() {
        let t0 = chrono::Utc::now();
        let t1 = t0 + chrono::Duration::seconds(60);
        let mut items = vec![
            fields("A", "ring", 1).into_item(1, t1),
            fields("B", "ring", 1).into_item(2, t1),
        ];
        keep_created_at(&mut items, vec![(1, Some(t0)), (9, Some(t0))]);
        assert_eq!(items[0].created_at, Some(t0));
        assert_eq!(items[0].updated_at, Some(t1));
        assert_eq!(items[1].created_at, Some(t1));
    }
}
