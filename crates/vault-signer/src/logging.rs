//! Logging setup for the binary.

use tracing_subscriber::EnvFilter;

const CRATES: [&str; 3] = ["vault_signer", "vault_signer_client", "vault_signer_core"];

/// Build the filter: WARN by default, DEBUG for this workspace when
/// `verbose`. `RUST_LOG` directives are applied on top.
#[must_use]
pub fn filter(verbose: bool) -> EnvFilter {
    filter_with(verbose, std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref())
}

fn filter_with(verbose: bool, env: Option<&str>) -> EnvFilter {
    let mut directives = vec!["warn".to_string()];
    if verbose {
        directives.extend(CRATES.iter().map(|name| format!("{name}=debug")));
    }
    if let Some(env) = env.filter(|env| !env.trim().is_empty()) {
        directives.push(env.to_string());
    }

    EnvFilter::builder().parse_lossy(directives.join(","))
}

/// Install a stderr subscriber. Safe to call once per process.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::filter_with;

    #[test]
    fn verbose_filter_enables_debug() {
        let filter = filter_with(true, None).to_string();
        assert!(filter.contains("vault_signer=debug"));
        assert!(filter.contains("vault_signer_client=debug"));
    }

    #[test]
    fn quiet_filter_defaults_to_warn() {
        let filter = filter_with(false, None).to_string();
        assert!(filter.contains("warn"));
        assert!(!filter.contains("vault_signer=debug"));
    }

    #[test]
    fn env_span_filter_is_parsed_by_env_filter() {
        let filter = filter_with(false, Some("[sign{alias=prod}]=trace")).to_string();
        assert!(filter.contains("[sign{alias=prod}]=trace"), "{filter}");
    }

    #[test]
    fn env_overrides_verbose_targets() {
        let filter = filter_with(true, Some("vault_signer=error")).to_string();
        assert!(filter.contains("vault_signer=error"), "{filter}");
        assert!(!filter.contains("vault_signer=debug"), "{filter}");
    }

    #[test]
    fn env_directives_are_added() {
        let filter = filter_with(false, Some("reqwest=debug,hyper=info")).to_string();
        assert!(filter.contains("reqwest=debug"), "{filter}");
        assert!(filter.contains("hyper=info"), "{filter}");
    }
}
