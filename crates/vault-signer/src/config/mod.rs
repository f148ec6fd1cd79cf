//! Configuration file loading and validation.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;
use vault_signer_client::DEFAULT_SSH_MOUNT;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// RSA modulus size used when the file doesn't set `keyBits`.
pub const DEFAULT_KEY_BITS: usize = 4096;

/// Smallest RSA modulus accepted from the file.
pub const MIN_KEY_BITS: usize = 2048;

/// SSH port written into emitted host stanzas.
pub const DEFAULT_SSH_PORT: u16 = 47805;

/// Errors raised while loading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid YAML for this schema.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// YAML text could not be decoded.
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Parsed, but the values are unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration file.
///
/// ```yaml
/// keyBits: 4096
/// vaultConfigs:
///   - alias: prod
///     token: s.xxxxx
///     endpoint: https://vault.prod.example.com:8200
///     username: deploy
///     subnet: "10.20.*.*"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerConfig {
    /// Signing endpoints, in the order they are processed.
    #[serde(rename = "vaultConfigs", default)]
    pub endpoints: Vec<EndpointConfig>,

    /// RSA modulus size for the generated key.
    #[serde(default = "default_key_bits")]
    pub key_bits: usize,
}

const fn default_key_bits() -> usize {
    DEFAULT_KEY_BITS
}

/// One signing endpoint and the identity requested from it.
#[derive(Clone, Deserialize)]
pub struct EndpointConfig {
    /// Display name, also used in the certificate file name.
    pub alias: String,

    /// Vault token.
    pub token: String,

    /// Vault server address.
    pub endpoint: String,

    /// Remote login name.
    pub username: String,

    /// Host pattern such as `10.20.*.*`.
    pub subnet: String,

    /// SSH secrets engine mount.
    #[serde(default)]
    pub mount: Option<String>,

    /// Signing role; the username when unset.
    #[serde(default)]
    pub role: Option<String>,

    /// SSH port for the emitted stanza.
    #[serde(default)]
    pub port: Option<u16>,

    /// Vault Enterprise namespace.
    #[serde(default)]
    pub namespace: Option<String>,

    /// Requested certificate TTL.
    #[serde(default)]
    pub ttl: Option<String>,

    /// Principals to embed; the role's defaults apply when empty.
    #[serde(default)]
    pub principals: Vec<String>,

    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl std::fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("alias", &self.alias)
            .field("token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("subnet", &self.subnet)
            .field("mount", &self.mount)
            .field("role", &self.role)
            .field("port", &self.port)
            .field("namespace", &self.namespace)
            .field("ttl", &self.ttl)
            .field("principals", &self.principals)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl EndpointConfig {
    /// Mount path of the SSH signer.
    #[must_use]
    pub fn mount(&self) -> &str {
        self.mount.as_deref().unwrap_or(DEFAULT_SSH_MOUNT)
    }

    /// Role the key is signed under.
    #[must_use]
    pub fn role(&self) -> &str {
        self.role.as_deref().unwrap_or(&self.username)
    }

    /// SSH port for the emitted stanza.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_SSH_PORT)
    }

    /// Request timeout, when the entry overrides the client default.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    fn validate(&self) -> Result<(), String> {
        if self.alias.is_empty() {
            return Err("alias is empty".to_string());
        }
        if !self
            .alias
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            || self.alias.starts_with('.')
        {
            return Err(format!(
                "alias {:?} may only contain letters, digits, '.', '_' and '-'",
                self.alias
            ));
        }
        if self.token.is_empty() {
            return Err("token is empty".to_string());
        }
        if self.username.is_empty() {
            return Err("username is empty".to_string());
        }
        if self.role().is_empty() {
            return Err("role is empty".to_string());
        }
        if self.principals.iter().any(|p| p.trim().is_empty() || p.contains(',')) {
            return Err("principals must be non-empty names without commas".to_string());
        }
        if self.timeout == Some(0) {
            return Err("timeout must be at least one second".to_string());
        }

        let url = Url::parse(&self.endpoint)
            .map_err(|e| format!("endpoint {:?} is not a valid URL: {e}", self.endpoint))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!(
                "endpoint {:?} must use http or https",
                self.endpoint
            ));
        }

        Ok(())
    }
}

impl SignerConfig {
    /// Read, parse and validate the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_yaml(&content).map_err(|e| match e {
            ConfigError::Yaml(source) => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse and validate configuration text.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every entry and the cross-entry constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoints.is_empty() {
            return Err(ConfigError::Invalid(
                "no entries under vaultConfigs".to_string(),
            ));
        }

        if self.key_bits < MIN_KEY_BITS {
            return Err(ConfigError::Invalid(format!(
                "keyBits {} is below the minimum of {MIN_KEY_BITS}",
                self.key_bits
            )));
        }

        let mut seen = HashSet::new();
        for (index, entry) in self.endpoints.iter().enumerate() {
            entry.validate().map_err(|msg| {
                ConfigError::Invalid(format!("entry {} ({:?}): {msg}", index + 1, entry.alias))
            })?;

            if !seen.insert(entry.alias.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "alias {:?} is used more than once",
                    entry.alias
                )));
            }
        }

        Ok(())
    }
}
