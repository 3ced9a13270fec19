use std::path::PathBuf;

use jewelcase_core::error::CoreError;

/// Errors raised by [`CatalogStore`](crate::CatalogStore) implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but does not hold a catalog.
    #[error("Catalog data in {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The input was rejected before anything was written.
    #[error(transparent)]
    Validation(#[from] CoreError),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
