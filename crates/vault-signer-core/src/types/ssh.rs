use serde::{Deserialize, Serialize};

/// Kind of certificate requested from the SSH secrets engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertType {
    /// Client certificate presented to servers
    #[default]
    User,
}

/// Body of `POST /v1/{mount}/sign/{role}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignKeyRequest {
    /// Public key in authorized-keys format
    pub public_key: String,

    /// Certificate type
    #[serde(default)]
    pub cert_type: CertType,

    /// Requested time-to-live (e.g. "30m", "8h")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,

    /// Comma-separated principals to embed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_principals: Option<String>,
}

impl SignKeyRequest {
    /// Request a user certificate for the given public key
    #[must_use]
    pub fn new(public_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            cert_type: CertType::User,
            ttl: None,
            valid_principals: None,
        }
    }
}

/// Signed certificate returned by the SSH secrets engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedKey {
    /// Certificate serial number (hex, dash separated)
    #[serde(default)]
    pub serial_number: Option<String>,

    /// OpenSSH certificate line
    pub signed_key: String,
}

impl SignedKey {
    /// Certificate text terminated by exactly one newline
    #[must_use]
    pub fn to_file_contents(&self) -> String {
        let mut text = self.signed_key.trim_end().to_string();
        text.push('\n');
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_omits_unset_fields() {
        let req = SignKeyRequest::new("ssh-rsa AAAA test");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["public_key"], "ssh-rsa AAAA test");
        assert_eq!(json["cert_type"], "user");
        assert!(json.get("ttl").is_none());
        assert!(json.get("valid_principals").is_none());
    }

    #[test]
    fn test_signed_key_file_contents() {
        let key = SignedKey {
            serial_number: Some("4d-2a".into()),
            signed_key: "ssh-rsa-cert-v01@openssh.com AAAA\n\n".into(),
        };
        assert_eq!(key.to_file_contents(), "ssh-rsa-cert-v01@openssh.com AAAA\n");
    }
}
