//! # vault-signer
//!
//! Provision an SSH client identity signed by one or more Vault SSH secrets
//! engines.
//!
//! ## Flow
//!
//! 1. Load the YAML configuration listing signing endpoints
//! 2. Generate one RSA key pair and write it to the key directory
//! 3. Ask every endpoint to sign the public key, writing each certificate
//! 4. Optionally print `Match exec` stanzas for `~/.ssh/config`
//!
//! Endpoint failures are reported and skipped; the exit status reflects them.

pub mod artifacts;
pub mod cli;
pub mod config;
pub mod keys;
pub mod logging;
pub mod output;
pub mod provision;
pub mod ssh_config;

pub use cli::run;
