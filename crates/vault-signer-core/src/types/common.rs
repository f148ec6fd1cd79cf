use serde::{Deserialize, Serialize};

/// Envelope wrapped around every successful Vault API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultResponse<T> {
    /// Request identifier assigned by the server
    #[serde(default)]
    pub request_id: Option<String>,

    /// Lease identifier (empty for non-leased secrets)
    #[serde(default)]
    pub lease_id: Option<String>,

    /// Whether the lease can be renewed
    #[serde(default)]
    pub renewable: bool,

    /// Endpoint-specific payload
    pub data: Option<T>,

    /// Non-fatal warnings emitted by the server
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
}

impl<T> VaultResponse<T> {
    /// Warnings attached to the response, if any
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.warnings.iter().flatten().map(String::as_str)
    }
}

/// Body of a Vault error response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error messages
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ErrorResponse {
    /// Join all error messages into a single line
    #[must_use]
    pub fn message(&self) -> Option<String> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.join("; "))
        }
    }
}
