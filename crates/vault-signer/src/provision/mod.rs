//! A provisioning run: one key pair, one certificate per endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};
use vault_signer_client::VaultClient;
use vault_signer_core::{SignedKey, SignerError};

use crate::artifacts::{write_secret, ArtifactError, KeyLayout};
use crate::config::{EndpointConfig, SignerConfig};
use crate::keys::{CertificateInfo, KeyError, KeyPair};
use crate::ssh_config::{self, HostStanza};

/// Exit status when at least one endpoint failed.
pub const PARTIAL_FAILURE_EXIT: u8 = 2;

/// Failures that abort the run before any endpoint is contacted.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Key generation or encoding failed.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// Key directory or key files could not be written.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Failures confined to a single endpoint.
#[derive(Error, Debug)]
pub enum EntryError {
    /// The signing service could not be reached or refused.
    #[error(transparent)]
    Signer(#[from] SignerError),

    /// Returned text is not an OpenSSH certificate.
    #[error("returned certificate is unreadable: {0}")]
    Certificate(#[source] KeyError),

    /// Certificate was issued for a different key.
    #[error("returned certificate does not certify the generated public key")]
    KeyMismatch,

    /// Certificate could not be saved.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Result for one configuration entry.
#[derive(Debug, Clone, Serialize)]
pub struct EntryOutcome {
    /// Entry alias.
    pub alias: String,
    /// Signing endpoint.
    pub endpoint: String,
    /// What happened.
    #[serde(flatten)]
    pub status: EntryStatus,
}

/// Signed or failed.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EntryStatus {
    /// Certificate written.
    Signed {
        /// Where the certificate was written.
        credential_path: PathBuf,
        /// Serial number reported by the service.
        serial_number: Option<String>,
        /// Principals embedded in the certificate.
        principals: Vec<String>,
        /// Certificate expiry.
        valid_until: Option<DateTime<Utc>>,
    },
    /// Entry skipped.
    Failed {
        /// Rendered error chain.
        error: String,
    },
}

impl EntryOutcome {
    /// Whether a certificate was written for this entry.
    #[must_use]
    pub const fn is_signed(&self) -> bool {
        matches!(self.status, EntryStatus::Signed { .. })
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Private key path.
    pub private_key: PathBuf,
    /// Public key path.
    pub public_key: PathBuf,
    /// SHA-256 fingerprint of the generated key.
    pub fingerprint: String,
    /// One outcome per configuration entry, in file order.
    pub entries: Vec<EntryOutcome>,
    /// Assembled client config for the signed entries.
    pub ssh_config: String,
}

impl RunReport {
    /// Number of entries that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_signed()).count()
    }

    /// Process exit status: 0 when every entry signed.
    #[must_use]
    pub fn exit_status(&self) -> u8 {
        if self.failed() == 0 {
            0
        } else {
            PARTIAL_FAILURE_EXIT
        }
    }
}

/// Runs the generate, sign, write sequence against a [`KeyLayout`].
#[derive(Debug, Clone)]
pub struct Provisioner {
    layout: KeyLayout,
    comment: String,
}

impl Provisioner {
    /// Provisioner writing into `layout`.
    #[must_use]
    pub fn new(layout: KeyLayout) -> Self {
        Self {
            layout,
            comment: crate::keys::default_comment(),
        }
    }

    /// Override the public key comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Generate the key pair, then sign it at every endpoint in order.
    ///
    /// Endpoint failures are recorded in the report and do not stop the run.
    pub async fn run(&self, config: &SignerConfig) -> Result<RunReport, ProvisionError> {
        let keys = self.prepare_keys(config.key_bits)?;
        let public_key = keys.public_key_openssh()?;

        let mut entries = Vec::with_capacity(config.endpoints.len());
        let mut stanzas = Vec::new();

        for entry in &config.endpoints {
            match self.sign_entry(entry, &keys, &public_key).await {
                Ok((credential_path, signed, cert)) => {
                    info!(
                        alias = %entry.alias,
                        path = %credential_path.display(),
                        serial = signed.serial_number.as_deref().unwrap_or("-"),
                        key_id = %cert.key_id,
                        "Certificate written"
                    );
                    stanzas.push(HostStanza {
                        subnet: entry.subnet.clone(),
                        user: entry.username.clone(),
                        port: entry.port(),
                        identity_file: self.layout.private_key(),
                        certificate_file: credential_path.clone(),
                    });
                    entries.push(EntryOutcome {
                        alias: entry.alias.clone(),
                        endpoint: entry.endpoint.clone(),
                        status: EntryStatus::Signed {
                            credential_path,
                            serial_number: signed.serial_number,
                            principals: cert.principals,
                            valid_until: cert.valid_until,
                        },
                    });
                }
                Err(e) => {
                    warn!(alias = %entry.alias, endpoint = %entry.endpoint, error = %e, "Signing failed");
                    entries.push(EntryOutcome {
                        alias: entry.alias.clone(),
                        endpoint: entry.endpoint.clone(),
                        status: EntryStatus::Failed {
                            error: e.to_string(),
                        },
                    });
                }
            }
        }

        Ok(RunReport {
            private_key: self.layout.private_key(),
            public_key: self.layout.public_key(),
            fingerprint: keys.fingerprint(),
            entries,
            ssh_config: ssh_config::render(&stanzas),
        })
    }

    /// Generate a key pair and write both halves, replacing old files.
    pub fn prepare_keys(&self, bits: usize) -> Result<KeyPair, ProvisionError> {
        self.layout.ensure_dir()?;

        let keys = KeyPair::generate(bits, &self.comment)?;
        let private_pem = keys.private_key_pem()?;
        let mut public_line = keys.public_key_openssh()?;
        public_line.push('\n');

        write_secret(&self.layout.private_key(), private_pem.as_bytes())?;
        write_secret(&self.layout.public_key(), public_line.as_bytes())?;

        info!(fingerprint = %keys.fingerprint(), dir = %self.layout.dir().display(), "Key pair generated");
        Ok(keys)
    }

    async fn sign_entry(
        &self,
        entry: &EndpointConfig,
        keys: &KeyPair,
        public_key: &str,
    ) -> Result<(PathBuf, SignedKey, CertificateInfo), EntryError> {
        let mut builder = VaultClient::builder(&entry.endpoint, entry.token.clone());
        if let Some(namespace) = &entry.namespace {
            builder = builder.namespace(namespace.clone());
        }
        if let Some(timeout) = entry.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        debug!(alias = %entry.alias, mount = entry.mount(), role = entry.role(), "Signing public key");
        let signed = client
            .ssh(entry.mount())
            .sign(entry.role())
            .public_key(public_key)
            .ttl(entry.ttl.clone())
            .valid_principals(entry.principals.iter().cloned())
            .send()
            .await?;

        let cert = keys
            .inspect_certificate(&signed.signed_key)
            .map_err(EntryError::Certificate)?;
        if !cert.certifies_key {
            return Err(EntryError::KeyMismatch);
        }

        let path = self.layout.signed_key(&entry.alias);
        write_secret(&path, signed.to_file_contents().as_bytes())?;

        Ok((path, signed, cert))
    }
}
