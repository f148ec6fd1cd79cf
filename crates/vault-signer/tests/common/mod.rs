//! Mock Vault SSH signer backed by a throwaway ed25519 CA.

#![allow(dead_code)]

use serde_json::json;
use ssh_key::certificate::{Builder, CertType};
use ssh_key::{Algorithm, PrivateKey, PublicKey};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use wiremock::{Request, Respond, ResponseTemplate};

/// Signs whatever public key arrives in the request body.
pub struct CaResponder {
    ca: PrivateKey,
    principal: String,
}

impl CaResponder {
    pub fn new(principal: &str) -> Self {
        Self {
            ca: PrivateKey::random(&mut rand::rngs::OsRng, Algorithm::Ed25519).unwrap(),
            principal: principal.to_string(),
        }
    }

    pub fn sign(&self, public_key: &str) -> String {
        let subject = PublicKey::from_openssh(public_key).unwrap();
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        let mut builder = Builder::new_with_random_nonce(
            &mut rand::rngs::OsRng,
            subject.key_data().clone(),
            now - 60,
            now + 3600,
        )
        .unwrap();
        builder.serial(42).unwrap();
        builder.key_id(format!("vault-{}", self.principal)).unwrap();
        builder.cert_type(CertType::User).unwrap();
        builder.valid_principal(self.principal.clone()).unwrap();

        builder.sign(&self.ca).unwrap().to_openssh().unwrap()
    }
}

impl Respond for CaResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        let public_key = body["public_key"].as_str().unwrap();

        ResponseTemplate::new(200).set_body_json(json!({
            "request_id": "8a1f0c2e-5b7d-4e3a-9c6f-1d2e3f4a5b6c",
            "lease_id": "",
            "renewable": false,
            "data": {
                "serial_number": "00:00:00:00:00:00:00:2a",
                "signed_key": format!("{}\n", self.sign(public_key))
            },
            "warnings": null
        }))
    }
}

/// Signs a different key than the one submitted.
pub struct WrongKeyResponder(pub CaResponder);

impl Respond for WrongKeyResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let other = PrivateKey::random(&mut rand::rngs::OsRng, Algorithm::Ed25519).unwrap();
        let line = other.public_key().to_openssh().unwrap();

        ResponseTemplate::new(200).set_body_json(json!({
            "data": { "serial_number": "01", "signed_key": self.0.sign(&line) }
        }))
    }
}

/// One `vaultConfigs` entry.
pub fn entry(alias: &str, endpoint: &str, username: &str, subnet: &str) -> String {
    format!(
        "  - alias: {alias}\n    token: s.{alias}\n    endpoint: {endpoint}\n    username: {username}\n    subnet: \"{subnet}\"\n"
    )
}

/// A config document with 2048-bit keys and the given entries.
pub fn config_yaml(entries: &[String]) -> String {
    format!("keyBits: 2048\nvaultConfigs:\n{}", entries.concat())
}

/// File mode bits, masked to permissions.
#[cfg(unix)]
pub fn mode(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path).unwrap().permissions().mode() & 0o777
}
