//! Shared response bodies for handlers that do not return a catalog item.

use serde::Serialize;

/// `{ "success": true, "message": ... }` acknowledgement.
#[derive(Debug, Serialize)]
pub struct SuccessMessage {
    pub success: bool,
    pub message: String,
}

impl SuccessMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
