//! Jewelcase HTTP API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes) so the
//! binary entrypoint and integration tests assemble the exact same app.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
