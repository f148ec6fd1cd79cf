//! CLI argument parsing and the top-level run.

pub mod args;

use anyhow::{Context, Result};
use args::Cli;
use clap::Parser;
use std::process::ExitCode;
use tracing::debug;

use crate::artifacts::{expand_tilde, KeyLayout};
use crate::config::SignerConfig;
use crate::output;
use crate::provision::Provisioner;

/// Run the CLI application.
pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    crate::logging::init(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    execute(cli).await
}

/// Load config, provision, print, and map the report to an exit code.
pub async fn execute(cli: Cli) -> Result<ExitCode> {
    let config_path = expand_tilde(&cli.config);
    let config = SignerConfig::load(&config_path).with_context(|| {
        format!("Could not load configuration from {}", config_path.display())
    })?;
    debug!(entries = config.endpoints.len(), key_bits = config.key_bits, "Configuration loaded");

    let layout = KeyLayout::expand(&cli.key_dir);
    let report = Provisioner::new(layout)
        .run(&config)
        .await
        .context("Could not prepare the SSH key pair")?;

    output::render(&report, cli.output, cli.ssh_config)?.print();

    Ok(ExitCode::from(report.exit_status()))
}
