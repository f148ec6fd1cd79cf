//! Core types and errors for the vault-signer client.
//!
//! This crate provides the foundational types shared by the signing client and
//! the command-line tool:
//!
//! - **Types**: Request and response bodies of the Vault SSH secrets engine
//! - **Errors**: Signing failures classified by [`SignerError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use vault_signer_core::{Result, SignedKey};
//!
//! fn store(key: SignedKey) -> Result<()> {
//!     println!("serial: {}", key.serial_number.as_deref().unwrap_or("-"));
//!     std::fs::write("id_rsa-cert.pub", key.signed_key)?;
//!     Ok(())
//! }
//! ```

mod error;
pub mod types;

pub use error::{Result, SignerError};
pub use types::*;
