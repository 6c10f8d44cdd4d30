//! Response envelopes that are not domain documents.

use serde::{Deserialize, Serialize};

/// Body of every failed request: `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    pub fn internal_error() -> Self {
        Self::new("Internal Server Error")
    }
}

/// Plain acknowledgement such as the delete confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Sent for every delete, whether or not a post was removed.
    pub fn post_deleted() -> Self {
        Self::new("Post deleted successfully")
    }
}
