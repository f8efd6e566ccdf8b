use serde::{Deserialize, Serialize};

/// Success body for `POST /upload`, echoing the stored key.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub file: String,
    pub queue_status: String,
}

/// Failure body: a single human-readable cause.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

impl ErrorDetail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
