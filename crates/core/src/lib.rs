//! Domain types and rules for the jewelry catalog.
//!
//! Everything in this crate is pure: item validation, upload naming and
//! image-path resolution, and the credential-check seam. Persistence lives
//! in `jewelcase-db`, HTTP in `jewelcase-api`.

pub mod auth;
pub mod catalog;
pub mod error;
pub mod types;
pub mod upload;
