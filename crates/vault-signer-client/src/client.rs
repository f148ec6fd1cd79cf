//! Main Vault API client implementation.

use crate::api::SshApi;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;
use vault_signer_core::{ErrorResponse, Result, SignerError, VaultResponse};

/// Mount path of the SSH client signer when none is configured
pub const DEFAULT_SSH_MOUNT: &str = "ssh-client-signer";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const TOKEN_HEADER: &str = "X-Vault-Token";
const NAMESPACE_HEADER: &str = "X-Vault-Namespace";
const REQUEST_HEADER: &str = "X-Vault-Request";
const USER_AGENT: &str = concat!("vault-signer/", env!("CARGO_PKG_VERSION"));

/// Client for a single Vault server, authenticated with one token
#[derive(Clone)]
pub struct VaultClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    token: String,
    address: Url,
    namespace: Option<String>,
}

impl std::fmt::Debug for VaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultClient")
            .field("address", &self.inner.address.as_str())
            .field("namespace", &self.inner.namespace)
            .finish_non_exhaustive()
    }
}

impl VaultClient {
    /// Create a new client for `address` using default settings
    pub fn new(address: impl AsRef<str>, token: impl Into<String>) -> Result<Self> {
        VaultClientBuilder::new(address, token).build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder(address: impl AsRef<str>, token: impl Into<String>) -> VaultClientBuilder {
        VaultClientBuilder::new(address, token)
    }

    /// Access the SSH secrets engine mounted at `mount`
    #[must_use]
    pub fn ssh(&self, mount: impl Into<String>) -> SshApi<'_> {
        SshApi::new(self, mount)
    }

    /// Perform a POST request with JSON body and unwrap the response envelope
    pub(crate) async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<VaultResponse<T>> {
        let url = self.build_url(segments)?;
        debug!(url = %url, "POST request");

        let mut request = self
            .inner
            .http
            .post(url.clone())
            .header(TOKEN_HEADER, &self.inner.token)
            .header(REQUEST_HEADER, "true")
            .json(body);

        if let Some(namespace) = &self.inner.namespace {
            request = request.header(NAMESPACE_HEADER, namespace);
        }

        let response = request.send().await.map_err(transport_error)?;

        Self::handle_response(url.path(), response).await
    }

    /// Build `{address}/v1/{segments...}`, percent-encoding each segment
    fn build_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.inner.address.clone();
        url.path_segments_mut()
            .map_err(|()| SignerError::InvalidUrl(self.inner.address.to_string()))?
            .pop_if_empty()
            .push("v1")
            .extend(segments.iter().filter(|s| !s.is_empty()));
        Ok(url)
    }

    /// Handle an API response that returns a JSON envelope
    async fn handle_response<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<VaultResponse<T>> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await.map_err(transport_error)?;
            let envelope: VaultResponse<T> = serde_json::from_str(&body)?;
            for warning in envelope.warnings() {
                warn!(path, warning, "Vault returned a warning");
            }
            Ok(envelope)
        } else {
            Self::handle_error(path, status.as_u16(), response).await
        }
    }

    /// Convert an error response to a [`SignerError`]
    async fn handle_error<T>(path: &str, status: u16, response: reqwest::Response) -> Result<T> {
        let body = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(|e| e.message())
            .unwrap_or_else(|| body.trim().to_string());

        match status {
            400 => Err(SignerError::BadRequest { message }),
            401 | 403 => Err(SignerError::PermissionDenied { message }),
            404 => Err(SignerError::NotFound {
                resource: path.to_string(),
            }),
            _ => Err(SignerError::Api {
                code: status,
                message,
            }),
        }
    }
}

/// Classify a reqwest failure by what went wrong on the wire
fn transport_error(e: reqwest::Error) -> SignerError {
    if e.is_timeout() {
        SignerError::Timeout(e.to_string())
    } else if e.is_connect() {
        SignerError::Connection(e.to_string())
    } else {
        SignerError::Http(e.to_string())
    }
}

/// Builder for configuring a [`VaultClient`]
pub struct VaultClientBuilder {
    address: String,
    token: String,
    namespace: Option<String>,
    timeout: Duration,
}

impl VaultClientBuilder {
    /// Create a new builder for the given server address and token
    #[must_use]
    pub fn new(address: impl AsRef<str>, token: impl Into<String>) -> Self {
        Self {
            address: address.as_ref().to_string(),
            token: token.into(),
            namespace: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Send requests to a Vault Enterprise namespace
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<VaultClient> {
        let address = Url::parse(&self.address)
            .map_err(|e| SignerError::InvalidUrl(format!("{}: {e}", self.address)))?;

        if !matches!(address.scheme(), "http" | "https") {
            return Err(SignerError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                self.address
            )));
        }

        if self.token.is_empty() {
            return Err(SignerError::Config("a Vault token is required".to_string()));
        }

        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| SignerError::Config(e.to_string()))?;

        Ok(VaultClient {
            inner: Arc::new(ClientInner {
                http,
                token: self.token,
                address,
                namespace: self.namespace,
            }),
        })
    }
}
