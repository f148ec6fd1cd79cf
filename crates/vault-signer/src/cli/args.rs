//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::artifacts::DEFAULT_KEY_DIR;
use crate::config::DEFAULT_CONFIG_FILE;
use crate::output::OutputFormat;

/// Generate an SSH key pair, have it signed by every configured Vault SSH
/// signer, and optionally print matching SSH client config.
///
/// Exits 0 when every endpoint signed, 2 when some failed, 1 on fatal errors.
#[derive(Parser, Debug)]
#[command(name = "vault-signer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The vault-signer config file
    #[arg(short, long, env = "VAULT_SIGNER_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Print SSH client config for the signed identities
    #[arg(long)]
    pub ssh_config: bool,

    /// Directory receiving the key pair and certificates
    #[arg(short = 'd', long, env = "VAULT_SIGNER_KEY_DIR", default_value = DEFAULT_KEY_DIR)]
    pub key_dir: PathBuf,

    /// Summary format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["vault-signer"]).unwrap();
        assert!(!cli.ssh_config);
        assert_eq!(cli.output, OutputFormat::Pretty);
        // env vars may override these in the test environment
        if std::env::var_os("VAULT_SIGNER_CONFIG").is_none() {
            assert_eq!(cli.config, PathBuf::from("config.yaml"));
        }
        if std::env::var_os("VAULT_SIGNER_KEY_DIR").is_none() {
            assert_eq!(cli.key_dir, PathBuf::from("~/.ssh/vault-signer"));
        }
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "vault-signer",
            "--config",
            "/etc/vault-signer.yaml",
            "--ssh-config",
            "-d",
            "/tmp/keys",
            "-o",
            "json",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/vault-signer.yaml"));
        assert!(cli.ssh_config);
        assert_eq!(cli.key_dir, PathBuf::from("/tmp/keys"));
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(cli.verbose);
    }
}
