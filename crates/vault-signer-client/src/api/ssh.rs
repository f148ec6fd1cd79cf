//! SSH secrets engine endpoints.

use crate::VaultClient;
use tracing::debug;
use vault_signer_core::{Result, SignKeyRequest, SignedKey, SignerError};

/// Endpoints of one SSH secrets engine mount
pub struct SshApi<'a> {
    client: &'a VaultClient,
    mount: String,
}

impl<'a> SshApi<'a> {
    pub(crate) fn new(client: &'a VaultClient, mount: impl Into<String>) -> Self {
        Self {
            client,
            mount: mount.into(),
        }
    }

    /// Start a signing request against `role`
    #[must_use]
    pub fn sign(&self, role: impl Into<String>) -> SignRequestBuilder<'_> {
        SignRequestBuilder::new(self, role.into())
    }

    /// Sign a public key with the given role
    pub async fn sign_key(&self, role: &str, request: &SignKeyRequest) -> Result<SignedKey> {
        if request.public_key.trim().is_empty() {
            return Err(SignerError::Config(
                "a public key is required for signing".to_string(),
            ));
        }

        let mut segments: Vec<&str> = self.mount.split('/').collect();
        segments.extend(["sign", role]);

        debug!(mount = %self.mount, role, "Requesting SSH certificate");
        let envelope = self.client.post::<SignedKey, _>(&segments, request).await?;

        let signed = envelope.data.ok_or_else(|| {
            SignerError::MalformedResponse("response has no data section".to_string())
        })?;

        if signed.signed_key.trim().is_empty() {
            return Err(SignerError::MalformedResponse(
                "response has an empty signed_key".to_string(),
            ));
        }

        Ok(signed)
    }
}

/// Builder for signing requests
pub struct SignRequestBuilder<'a> {
    api: &'a SshApi<'a>,
    role: String,
    request: SignKeyRequest,
}

impl<'a> SignRequestBuilder<'a> {
    fn new(api: &'a SshApi<'a>, role: String) -> Self {
        Self {
            api,
            role,
            request: SignKeyRequest::new(String::new()),
        }
    }

    /// Public key to sign, in authorized-keys format
    #[must_use]
    pub fn public_key(mut self, key: impl Into<String>) -> Self {
        self.request.public_key = key.into();
        self
    }

    /// Requested time-to-live
    #[must_use]
    pub fn ttl(mut self, ttl: Option<String>) -> Self {
        self.request.ttl = ttl;
        self
    }

    /// Add principals to embed in the certificate
    #[must_use]
    pub fn valid_principals<I, S>(mut self, principals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let joined: Vec<String> = principals.into_iter().map(Into::into).collect();
        if !joined.is_empty() {
            self.request.valid_principals = Some(joined.join(","));
        }
        self
    }

    /// Submit the signing request
    pub async fn send(self) -> Result<SignedKey> {
        self.api.sign_key(&self.role, &self.request).await
    }
}
