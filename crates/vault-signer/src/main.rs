//! vault-signer - SSH certificates from Vault
//!
//! Generates a key pair, gets it signed, and writes SSH client config.

use anyhow::Result;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    vault_signer::run().await
}
