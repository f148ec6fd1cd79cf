//! Output formatting for the run summary.

use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::provision::{EntryOutcome, EntryStatus, RunReport};

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summary on stderr, SSH config on stdout
    #[default]
    Pretty,
    /// JSON document on stdout
    Json,
    /// YAML document on stdout
    Yaml,
}

/// Machine-readable form of a [`RunReport`].
#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
    private_key: &'a Path,
    public_key: &'a Path,
    fingerprint: &'a str,
    entries: &'a [EntryOutcome],
    ssh_config: Option<&'a str>,
}

impl<'a> ReportDocument<'a> {
    fn new(report: &'a RunReport, with_ssh_config: bool) -> Self {
        Self {
            private_key: &report.private_key,
            public_key: &report.public_key,
            fingerprint: &report.fingerprint,
            entries: &report.entries,
            ssh_config: with_ssh_config.then_some(report.ssh_config.as_str()),
        }
    }
}

/// Render `report` in `format`.
///
/// The SSH config text is included only when `with_ssh_config` is set.
pub fn render(report: &RunReport, format: OutputFormat, with_ssh_config: bool) -> anyhow::Result<Rendered> {
    let rendered = match format {
        OutputFormat::Json => Rendered {
            stdout: format!(
                "{}\n",
                serde_json::to_string_pretty(&ReportDocument::new(report, with_ssh_config))?
            ),
            stderr: String::new(),
        },
        OutputFormat::Yaml => Rendered {
            stdout: serde_yaml::to_string(&ReportDocument::new(report, with_ssh_config))?,
            stderr: String::new(),
        },
        OutputFormat::Pretty => Rendered {
            stdout: if with_ssh_config {
                report.ssh_config.clone()
            } else {
                String::new()
            },
            stderr: summary(report),
        },
    };

    Ok(rendered)
}

/// Text destined for each stream.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Text for standard output.
    pub stdout: String,
    /// Text for standard error.
    pub stderr: String,
}

impl Rendered {
    /// Write both streams.
    pub fn print(&self) {
        eprint!("{}", self.stderr);
        print!("{}", self.stdout);
    }
}

fn summary(report: &RunReport) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "{} {}", "Key:".bold(), report.private_key.display());
    let _ = writeln!(out, "{} {}", "Fingerprint:".bold(), report.fingerprint);

    for entry in &report.entries {
        match &entry.status {
            EntryStatus::Signed {
                credential_path,
                serial_number,
                valid_until,
                ..
            } => {
                let _ = writeln!(
                    out,
                    "  {} {} -> {}{}{}",
                    "signed".green().bold(),
                    entry.alias.cyan(),
                    credential_path.display(),
                    serial_number
                        .as_deref()
                        .map(|s| format!(" (serial {s})"))
                        .unwrap_or_default(),
                    valid_until
                        .map(|t| format!(", valid until {}", t.format("%Y-%m-%d %H:%M UTC")))
                        .unwrap_or_default()
                );
            }
            EntryStatus::Failed { error } => {
                let _ = writeln!(
                    out,
                    "  {} {} ({}): {}",
                    "failed".red().bold(),
                    entry.alias.cyan(),
                    entry.endpoint,
                    error
                );
            }
        }
    }

    let failed = report.failed();
    if failed > 0 {
        let _ = writeln!(
            out,
            "{}",
            format!("{failed} of {} endpoints failed", report.entries.len()).yellow()
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample() -> RunReport {
        RunReport {
            private_key: PathBuf::from("/k/id_rsa"),
            public_key: PathBuf::from("/k/id_rsa.pub"),
            fingerprint: "SHA256:abc".to_string(),
            entries: vec![
                EntryOutcome {
                    alias: "prod".to_string(),
                    endpoint: "https://vault.prod".to_string(),
                    status: EntryStatus::Signed {
                        credential_path: PathBuf::from("/k/id_rsa_prod.pub"),
                        serial_number: Some("01".to_string()),
                        principals: vec!["deploy".to_string()],
                        valid_until: chrono::DateTime::from_timestamp(1_700_003_600, 0),
                    },
                },
                EntryOutcome {
                    alias: "lab".to_string(),
                    endpoint: "https://vault.lab".to_string(),
                    status: EntryStatus::Failed {
                        error: "permission denied".to_string(),
                    },
                },
            ],
            ssh_config: "Match exec \"host %h | grep -qE '10\\.'\"\n".to_string(),
        }
    }

    #[test]
    fn test_pretty_splits_streams() {
        colored::control::set_override(false);
        let rendered = render(&sample(), OutputFormat::Pretty, true).unwrap();
        assert!(rendered.stdout.starts_with("Match exec"));
        assert!(rendered
            .stderr
            .contains("signed prod -> /k/id_rsa_prod.pub (serial 01), valid until 2023-11-14 23:13 UTC"));
        assert!(rendered.stderr.contains("failed lab (https://vault.lab): permission denied"));
        assert!(rendered.stderr.contains("1 of 2 endpoints failed"));
    }

    #[test]
    fn test_pretty_without_ssh_config() {
        let rendered = render(&sample(), OutputFormat::Pretty, false).unwrap();
        assert!(rendered.stdout.is_empty());
    }

    #[test]
    fn test_json_document() {
        let rendered = render(&sample(), OutputFormat::Json, false).unwrap();
        assert!(rendered.stderr.is_empty());

        let doc: serde_json::Value = serde_json::from_str(&rendered.stdout).unwrap();
        assert_eq!(doc["fingerprint"], "SHA256:abc");
        assert_eq!(doc["entries"][0]["status"], "signed");
        assert_eq!(doc["entries"][1]["status"], "failed");
        assert!(doc["ssh_config"].is_null());

        let rendered = render(&sample(), OutputFormat::Json, true).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&rendered.stdout).unwrap();
        assert!(doc["ssh_config"].as_str().unwrap().starts_with("Match exec"));
    }

    #[test]
    fn test_yaml_document() {
        let rendered = render(&sample(), OutputFormat::Yaml, true).unwrap();
        assert!(rendered.stdout.contains("fingerprint: SHA256:abc"));
        assert!(rendered.stdout.contains("ssh_config:"));
    }
}
