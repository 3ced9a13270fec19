use jewelcase_core::types::DbId;

/// Errors returned by catalog API calls and the admin panel.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport failure, timeout or undecodable response body.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The operation names an item the local catalog does not hold.
    #[error("Item {0} is not in the local catalog")]
    UnknownItem(DbId),
}

impl ClientError {
    /// HTTP status of a server-side rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            ClientError::UnknownItem(_) => None,
        }
    }
}
