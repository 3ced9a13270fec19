//! Client-side logic for the jewelcase storefront and admin panel.
//!
//! State lives in explicit structs ([`storefront::StorefrontState`],
//! [`admin::AdminState`]) and the filter, search and pagination steps are
//! plain functions over a catalog slice, so a UI layer only has to render
//! what these return. Server calls go through the [`api::CatalogApi`] trait.

pub mod admin;
pub mod api;
pub mod error;
pub mod search;
pub mod storefront;
