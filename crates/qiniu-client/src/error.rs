//! Qiniu client errors

use thiserror::Error;

/// Errors that can occur when interacting with the Qiniu API
#[derive(Debug, Error)]
pub enum QiniuError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Qiniu API returned a non-success status
    #[error("Qiniu API error: {status} (code {}) - {message}", .code.map_or_else(|| "-".to_string(), |c| c.to_string()))]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Credentials rejected or unusable
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request (e.g., malformed URL)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Response that decodes but breaks the API contract
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl QiniuError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
