//! RSA key pair generation and encoding.
//!
//! The private key is serialized as PKCS#1 PEM (`RSA PRIVATE KEY`), which
//! OpenSSH reads directly. The public key is rendered as an authorized-keys
//! line, which is also the format Vault expects in a signing request.

use chrono::{DateTime, Utc};
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use ssh_key::public::{KeyData, RsaPublicKey};
use ssh_key::{Certificate, PublicKey};
use thiserror::Error;
use tracing::debug;

/// Errors raised while producing or encoding key material.
#[derive(Error, Debug)]
pub enum KeyError {
    /// The RNG or prime search failed.
    #[error("failed to generate {bits}-bit RSA key: {source}")]
    Generate {
        bits: usize,
        #[source]
        source: rsa::Error,
    },

    /// Generated key failed its consistency check.
    #[error("generated RSA key is invalid: {0}")]
    Validate(#[source] rsa::Error),

    /// PKCS#1 encoding or decoding failed.
    #[error("PKCS#1 error: {0}")]
    Pkcs1(#[from] rsa::pkcs1::Error),

    /// OpenSSH encoding or certificate parsing failed.
    #[error("OpenSSH encoding error: {0}")]
    Ssh(#[from] ssh_key::Error),
}

/// Comment appended to the public key line: `vault-signer@<hostname>`.
#[must_use]
pub fn default_comment() -> String {
    match hostname::get() {
        Ok(host) => format!("vault-signer@{}", host.to_string_lossy()),
        Err(_) => "vault-signer".to_string(),
    }
}

/// The one key pair generated per run.
pub struct KeyPair {
    private: RsaPrivateKey,
    public: PublicKey,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("bits", &self.bits())
            .field("comment", &self.public.comment())
            .finish_non_exhaustive()
    }
}

impl KeyPair {
    /// Generate a fresh RSA key of `bits` from the OS CSPRNG.
    pub fn generate(bits: usize, comment: &str) -> Result<Self, KeyError> {
        debug!(bits, "Generating RSA key pair");

        let private = RsaPrivateKey::new(&mut rand::rngs::OsRng, bits)
            .map_err(|source| KeyError::Generate { bits, source })?;
        private.validate().map_err(KeyError::Validate)?;

        Self::from_private(private, comment)
    }

    /// Decode a PKCS#1 PEM private key.
    pub fn from_private_key_pem(pem: &str, comment: &str) -> Result<Self, KeyError> {
        let private = RsaPrivateKey::from_pkcs1_pem(pem)?;
        Self::from_private(private, comment)
    }

    fn from_private(private: RsaPrivateKey, comment: &str) -> Result<Self, KeyError> {
        let key_data = KeyData::Rsa(RsaPublicKey::try_from(private.to_public_key())?);
        let public = PublicKey::new(key_data, comment);
        Ok(Self { private, public })
    }

    /// Modulus size in bits.
    #[must_use]
    pub fn bits(&self) -> usize {
        self.private.n().bits()
    }

    /// PKCS#1 PEM encoding of the private key.
    pub fn private_key_pem(&self) -> Result<String, KeyError> {
        let pem = self.private.to_pkcs1_pem(LineEnding::LF)?;
        Ok(pem.as_str().to_string())
    }

    /// `ssh-rsa <base64> <comment>` without a trailing newline.
    pub fn public_key_openssh(&self) -> Result<String, KeyError> {
        Ok(self.public.to_openssh()?)
    }

    /// SHA-256 fingerprint of the public key.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        self.public.fingerprint(ssh_key::HashAlg::Sha256).to_string()
    }

    /// Parse an OpenSSH certificate and check it against this key.
    pub fn inspect_certificate(&self, certificate: &str) -> Result<CertificateInfo, KeyError> {
        let cert = Certificate::from_openssh(certificate.trim())?;

        Ok(CertificateInfo {
            certifies_key: cert.public_key() == self.public.key_data(),
            serial: cert.serial(),
            key_id: cert.key_id().to_string(),
            principals: cert.valid_principals().to_vec(),
            valid_until: i64::try_from(cert.valid_before())
                .ok()
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
        })
    }
}

/// Fields of an issued certificate worth reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    /// Subject key equals the generated public key.
    pub certifies_key: bool,
    /// CA-assigned serial.
    pub serial: u64,
    /// CA-assigned key identifier.
    pub key_id: String,
    /// Principals the certificate is valid for.
    pub principals: Vec<String>,
    /// Expiry; `None` for certificates that never expire.
    pub valid_until: Option<DateTime<Utc>>,
}
