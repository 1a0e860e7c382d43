//! Error types for the outbound API clients

use thiserror::Error;

/// API client errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required setting (credential, repository) is missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level error (connection, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status code
    #[error("{service} API error ({status}): {body}")]
    Status {
        /// Which API answered
        service: String,
        /// HTTP status code
        status: u16,
        /// Response body, as returned
        body: String,
    },

    /// The response was well-formed JSON but lacked what we needed
    #[error("Invalid response from {service}: {details}")]
    InvalidResponse {
        /// Which API answered
        service: String,
        /// What was missing
        details: String,
    },

    /// Posting a comment failed; comments are never retried
    #[error("Failed to add comment to issue #{issue_number}: {source}")]
    Comment {
        /// Issue the comment was meant for
        issue_number: u64,
        /// Underlying failure
        #[source]
        source: Box<ApiError>,
    },

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// Shorthand for [`ApiError::InvalidResponse`]
    pub fn invalid_response(service: &str, details: impl Into<String>) -> Self {
        Self::InvalidResponse {
            service: service.to_string(),
            details: details.into(),
        }
    }
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, ApiError>;
