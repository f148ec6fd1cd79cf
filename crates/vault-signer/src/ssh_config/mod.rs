//! OpenSSH client config stanzas for signed identities.

use std::fmt;
use std::path::PathBuf;

/// Turn a subnet pattern into an extended-regex prefix for `grep -E`.
///
/// Octets are kept up to the first one containing `*`; kept octets are
/// joined with escaped dots, and a trailing `\.` marks the wildcard tail:
/// `10.20.*.*` becomes `10\.20\.`, `172.16.0.5` stays `172\.16\.0\.5`.
/// A pattern with no literal leading octet yields an empty predicate, which
/// matches every host.
#[must_use]
pub fn subnet_predicate(pattern: &str) -> String {
    let segments: Vec<&str> = pattern.split('.').collect();
    let literal: Vec<&str> = segments
        .iter()
        .take_while(|segment| !segment.contains('*'))
        .copied()
        .collect();

    let mut predicate = literal.join("\\.");
    if !literal.is_empty() && literal.len() < segments.len() {
        predicate.push_str("\\.");
    }
    predicate
}

/// One `Match exec` block pointing SSH at a signed identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostStanza {
    /// Subnet pattern from the configuration entry.
    pub subnet: String,
    /// Remote login name.
    pub user: String,
    /// Remote SSH port.
    pub port: u16,
    /// Private key file.
    pub identity_file: PathBuf,
    /// Certificate file issued for the private key.
    pub certificate_file: PathBuf,
}

impl fmt::Display for HostStanza {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Match exec \"host %h | grep -qE '{}'\"",
            subnet_predicate(&self.subnet)
        )?;
        writeln!(f, "\tUser {}", self.user)?;
        writeln!(f, "\tPort {}", self.port)?;
        writeln!(f, "\tIdentityFile {}", self.identity_file.display())?;
        writeln!(f, "\tIdentityFile {}", self.certificate_file.display())
    }
}

/// Concatenate stanzas in the order given.
#[must_use]
pub fn render(stanzas: &[HostStanza]) -> String {
    stanzas.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stanza(subnet: &str) -> HostStanza {
        HostStanza {
            subnet: subnet.to_string(),
            user: "deploy".to_string(),
            port: 47805,
            identity_file: PathBuf::from("/home/u/.ssh/vault-signer/id_rsa"),
            certificate_file: PathBuf::from("/home/u/.ssh/vault-signer/id_rsa_prod.pub"),
        }
    }

    #[test]
    fn test_predicate_two_wildcards() {
        assert_eq!(subnet_predicate("10.20.*.*"), r"10\.20\.");
    }

    #[test]
    fn test_predicate_single_wildcard() {
        assert_eq!(subnet_predicate("192.168.1.*"), r"192\.168\.1\.");
    }

    #[test]
    fn test_predicate_without_wildcards() {
        assert_eq!(subnet_predicate("172.16.0.5"), r"172\.16\.0\.5");
    }

    #[test]
    fn test_predicate_class_a() {
        assert_eq!(subnet_predicate("10.*.*.*"), r"10\.");
    }

    #[test]
    fn test_predicate_all_wildcards_matches_everything() {
        assert_eq!(subnet_predicate("*.*.*.*"), "");
        assert_eq!(subnet_predicate("*"), "");
    }

    #[test]
    fn test_predicate_stops_at_partial_wildcard() {
        assert_eq!(subnet_predicate("10.1*.3.4"), r"10\.");
    }

    #[test]
    fn test_predicate_never_has_adjacent_dots_or_markers() {
        for pattern in ["10.*.*.*", "10.1.*.*", "10.1.2.*", "*.example.com", "a.b*.c"] {
            let predicate = subnet_predicate(pattern);
            assert!(!predicate.contains('*'), "{pattern} -> {predicate}");
            assert!(!predicate.contains(r"\.\."), "{pattern} -> {predicate}");
            let bare_dot = predicate
                .char_indices()
                .any(|(i, c)| c == '.' && (i == 0 || &predicate[i - 1..i] != "\\"));
            assert!(!bare_dot, "{pattern} -> {predicate}");
        }
    }

    #[test]
    fn test_stanza_text() {
        let text = stanza("10.20.*.*").to_string();
        assert_eq!(
            text,
            "Match exec \"host %h | grep -qE '10\\.20\\.'\"\n\
             \tUser deploy\n\
             \tPort 47805\n\
             \tIdentityFile /home/u/.ssh/vault-signer/id_rsa\n\
             \tIdentityFile /home/u/.ssh/vault-signer/id_rsa_prod.pub\n"
        );
    }

    #[test]
    fn test_render_keeps_order() {
        let mut second = stanza("192.168.*.*");
        second.user = "alice".to_string();
        let text = render(&[stanza("10.20.*.*"), second]);

        let first_at = text.find("User deploy").unwrap();
        let second_at = text.find("User alice").unwrap();
        assert!(first_at < second_at);
        assert_eq!(text.matches("Match exec").count(), 2);
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[]), "");
    }
}
