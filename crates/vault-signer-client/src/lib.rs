//! HTTP client for the Vault SSH secrets engine.
//!
//! This crate provides [`VaultClient`] for submitting public keys to a Vault
//! SSH signer mount and retrieving the resulting certificates.
//!
//! ```rust,ignore
//! let client = VaultClient::new("https://vault.example.com:8200", token)?;
//! let signed = client
//!     .ssh("ssh-client-signer")
//!     .sign("alice")
//!     .public_key(public_key_line)
//!     .send()
//!     .await?;
//! ```

mod client;
pub mod api;

pub use client::{VaultClient, VaultClientBuilder, DEFAULT_SSH_MOUNT};
pub use vault_signer_core::{Result, SignerError};
