//! Extractors whose rejections are reported as JSON [`AppError`]s.
//!
//! Axum's stock `Json` and `Path` extractors answer malformed input with
//! plain-text bodies (and 422 for JSON that does not match the target type).
//! These wrappers route every rejection through [`AppError::BadRequest`] so
//! clients always get a 400 with a `{ "error", "code" }` body.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// `axum::Json` with [`AppError`] rejections.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Path` with [`AppError`] rejections.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// `axum::extract::Query` with [`AppError`] rejections.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
