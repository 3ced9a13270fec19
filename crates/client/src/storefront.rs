//! Storefront view state: category filter, search, detail view and
//! favorites over the full catalog.
//!
//! The storefront shows every match in one grid; there is no paging. The
//! detail view is addressable by a `#item-<id>` URL fragment so links to a
//! single item work when the page is first loaded.

use std::collections::BTreeSet;

use jewelcase_core::catalog::CatalogItem;
use jewelcase_core::types::DbId;

use crate::api::CatalogApi;
use crate::error::ClientError;
use crate::search::matches_search;

/// Fragment prefix of item deep links.
pub const ITEM_FRAGMENT_PREFIX: &str = "#item-";

/// Category selection in the storefront filter bar.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    /// Lowercased category name.
    Category(String),
}

impl CategoryFilter {
    /// `"all"` (any case, surrounding whitespace ignored) selects everything;
    /// any other value selects that category.
    pub fn parse(value: &str) -> Self {
        let value = value.trim().to_lowercase();
        if value == "all" || value.is_empty() {
            CategoryFilter::All
        } else {
            CategoryFilter::Category(value)
        }
    }

    pub fn matches(&self, item: &CatalogItem) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Category(category) => item.category.to_lowercase() == *category,
        }
    }
}

/// Items that pass both the category filter and the search term, in catalog
/// order.
pub fn visible_items<'a>(
    catalog: &'a [CatalogItem],
    filter: &CategoryFilter,
    search: &str,
) -> Vec<&'a CatalogItem> {
    catalog
        .iter()
        .filter(|item| filter.matches(item))
        .filter(|item| matches_search(item, search))
        .collect()
}

/// `#item-<id>`
pub fn fragment_for(id: DbId) -> String {
    format!("{ITEM_FRAGMENT_PREFIX}{id}")
}

/// Parse a `#item-<id>` fragment. Anything else yields `None`.
pub fn parse_item_fragment(fragment: &str) -> Option<DbId> {
    fragment
        .trim()
        .strip_prefix(ITEM_FRAGMENT_PREFIX)?
        .parse()
        .ok()
}

/// Shareable link to an item: `page_url` with its fragment replaced.
pub fn item_link(page_url: &str, id: DbId) -> String {
    let base = page_url.split('#').next().unwrap_or(page_url);
    format!("{base}{}", fragment_for(id))
}

/// Everything the storefront page renders from.
#[derive(Debug, Clone, Default)]
pub struct StorefrontState {
    catalog: Vec<CatalogItem>,
    category: CategoryFilter,
    search: String,
    /// Item shown in the detail view.
    selected: Option<DbId>,
    favorites: BTreeSet<DbId>,
}

impl StorefrontState {
    pub fn new(catalog: Vec<CatalogItem>) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    pub fn catalog(&self) -> &[CatalogItem] {
        &self.catalog
    }

    /// Replace the catalog. An open detail view stays open only if its item
    /// is still present.
    pub fn set_catalog(&mut self, catalog: Vec<CatalogItem>) {
        self.catalog = catalog;
        if let Some(id) = self.selected {
            if self.item(id).is_none() {
                self.selected = None;
            }
        }
    }

    /// Fetch the catalog from the server. On failure the current catalog is
    /// kept.
    pub async fn refresh<A: CatalogApi + ?Sized>(&mut self, api: &A) -> Result<(), ClientError> {
        match api.list().await {
            Ok(items) => {
                tracing::debug!(count = items.len(), "Storefront catalog loaded");
                self.set_catalog(items);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load storefront catalog");
                Err(e)
            }
        }
    }

    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.category = category;
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// The grid contents for the current filter and search.
    pub fn visible(&self) -> Vec<&CatalogItem> {
        visible_items(&self.catalog, &self.category, &self.search)
    }

    fn item(&self, id: DbId) -> Option<&CatalogItem> {
        self.catalog.iter().find(|item| item.id == id)
    }

    // -- detail view --

    /// Open the detail view for `id`. Returns `false` (and changes nothing)
    /// when the catalog has no such item.
    pub fn open(&mut self, id: DbId) -> bool {
        if self.item(id).is_none() {
            return false;
        }
        self.selected = Some(id);
        true
    }

    pub fn close(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&CatalogItem> {
        self.selected.and_then(|id| self.item(id))
    }

    /// Open the detail view named by a URL fragment, as on page load or a
    /// `hashchange`.
    pub fn open_from_fragment(&mut self, fragment: &str) -> bool {
        parse_item_fragment(fragment).is_some_and(|id| self.open(id))
    }

    /// Fragment for the current detail view, if one is open.
    pub fn current_fragment(&self) -> Option<String> {
        self.selected.map(fragment_for)
    }

    // -- favorites --

    /// Add or remove `id` from favorites; returns whether it is now a favorite.
    pub fn toggle_favorite(&mut self, id: DbId) -> bool {
        if self.favorites.remove(&id) {
            false
        } else {
            self.favorites.insert(id);
            true
        }
    }

    pub fn is_favorite(&self, id: DbId) -> bool {
        self.favorites.contains(&id)
    }

    pub fn favorites(&self) -> impl Iterator<Item = DbId> + '_ {
        self.favorites.iter().copied()
    }

    /// Restore favorites persisted by the embedding page.
    pub fn set_favorites(&mut self, ids: impl IntoIterator<Item = DbId>) {
        self.favorites = ids.into_iter().collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: DbId, name: &str, category: &str, price: i64) -> CatalogItem {
        CatalogItem {
            id,
            name: name.into(),
            category: category.into(),
            price,
            image: String::new(),
            description: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    fn sample() -> Vec<CatalogItem> {
        vec![
            item(1, "Gold Ring", "ring", 100),
            item(2, "Pearl Necklace", "necklace", 200),
        ]
    }

    fn ids(items: &[&CatalogItem]) -> Vec<DbId> {
        items.iter().map(|item| item.id).collect()
    }

    #[test]
    fn necklace_filter_shows_only_necklaces() {
        let catalog = sample();
        let visible = visible_items(&catalog, &CategoryFilter::parse("necklace"), "");
        assert_eq!(ids(&visible), vec![2]);
    }

    #[test]
    fn gold_search_across_all_categories() {
        let catalog = sample();
        let visible = visible_items(&catalog, &CategoryFilter::parse("all"), "gold");
        assert_eq!(ids(&visible), vec![1]);
    }

    #[test]
    fn category_filter_ignores_case() {
        let mut catalog = sample();
        catalog.push(item(3, "Silver Band", "Ring", 50));
        let visible = visible_items(&catalog, &CategoryFilter::parse("RING"), "");
        assert_eq!(ids(&visible), vec![1, 3]);
    }

    #[test]
    fn filter_and_search_combine() {
        let mut catalog = sample();
        catalog.push(item(3, "Gold Chain", "necklace", 300));
        let visible = visible_items(&catalog, &CategoryFilter::parse("necklace"), "gold");
        assert_eq!(ids(&visible), vec![3]);
    }

    #[test]
    fn parse_all_and_blank() {
        assert_eq!(CategoryFilter::parse(" All "), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse(""), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::parse("Bracelet"),
            CategoryFilter::Category("bracelet".into())
        );
    }

    #[test]
    fn state_setters_change_visible_items() {
        let mut state = StorefrontState::new(sample());
        assert_eq!(ids(&state.visible()), vec![1, 2]);

        state.set_category(CategoryFilter::parse("ring"));
        assert_eq!(ids(&state.visible()), vec![1]);

        state.set_search("pearl");
        assert!(state.visible().is_empty());

        state.set_category(CategoryFilter::All);
        assert_eq!(ids(&state.visible()), vec![2]);
    }

    #[test]
    fn fragments_round_trip_and_reject_garbage() {
        assert_eq!(fragment_for(7), "#item-7");
        assert_eq!(parse_item_fragment("#item-7"), Some(7));
        assert_eq!(parse_item_fragment("#item-"), None);
        assert_eq!(parse_item_fragment("#item-x"), None);
        assert_eq!(parse_item_fragment("#other-7"), None);
    }

    #[test]
    fn deep_link_opens_only_known_items() {
        let mut state = StorefrontState::new(sample());

        assert!(state.open_from_fragment("#item-2"));
        assert_eq!(state.selected().map(|i| i.id), Some(2));
        assert_eq!(state.current_fragment().as_deref(), Some("#item-2"));

        assert!(!state.open_from_fragment("#item-99"));
        assert_eq!(state.selected().map(|i| i.id), Some(2));

        state.close();
        assert!(state.selected().is_none());
    }

    #[test]
    fn replacing_catalog_closes_detail_of_removed_item() {
        let mut state = StorefrontState::new(sample());
        state.open(1);
        state.set_catalog(vec![item(2, "Pearl Necklace", "necklace", 200)]);
        assert!(state.selected().is_none());
    }

    #[test]
    fn item_link_replaces_existing_fragment() {
        assert_eq!(
            item_link("https://shop.example.com/index.html#item-3", 9),
            "https://shop.example.com/index.html#item-9"
        );
    }

    #[test]
    fn favorites_toggle() {
        let mut state = StorefrontState::new(sample());
        assert!(state.toggle_favorite(1));
        assert!(state.is_favorite(1));
        assert!(!state.toggle_favorite(1));
        assert_eq!(state.favorites().count(), 0);
    }
}
