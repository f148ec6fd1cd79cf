use thiserror::Error;

/// Result type alias for signing operations
pub type Result<T> = std::result::Result<T, SignerError>;

/// Errors that can occur when talking to a signing service
#[derive(Error, Debug)]
pub enum SignerError {
    /// The token was rejected or lacks the policy for this path
    #[error("permission denied: {message}")]
    PermissionDenied {
        /// Error message from the service
        message: String,
    },

    /// The service rejected the request body (unknown role, bad key, ...)
    #[error("bad request: {message}")]
    BadRequest {
        /// Error message from the service
        message: String,
    },

    /// Mount or role does not exist
    #[error("not found: {resource}")]
    NotFound {
        /// Path that wasn't found
        resource: String,
    },

    /// Service returned an unexpected error status
    #[error("API error ({code}): {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Error message from the service
        message: String,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request timed out
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Connection failed
    #[error("connection failed: {0}")]
    Connection(String),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response decoded but lacks the expected fields
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Invalid endpoint URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Client could not be configured
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
