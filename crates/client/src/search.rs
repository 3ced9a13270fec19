//! Case-insensitive text search shared by the storefront and admin views.

use jewelcase_core::catalog::CatalogItem;

/// Whether `term` occurs in the item's name, description or category,
/// ignoring case. An empty term matches everything.
pub fn matches_search(item: &CatalogItem, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    [&item.name, &item.description, &item.category]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}
