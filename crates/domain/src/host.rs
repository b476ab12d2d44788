//! Hostname and IP address validation.

use crate::patterns::static_regex;
use regex::Regex;
use std::net::Ipv6Addr;
use std::sync::LazyLock;

/// Longest hostname accepted, delimiting dots included.
pub const MAX_HOSTNAME_LENGTH: usize = 253;

static IPV4: LazyLock<Regex> = LazyLock::new(|| {
    static_regex(
        r"^((25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$",
    )
});

static NUMERIC_DOTTED: LazyLock<Regex> = LazyLock::new(|| static_regex(r"^[0-9.]+$"));

static LABEL_WITH_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r"(?i)^([a-z0-9][a-z0-9_-]{1,62}|[a-z_-])$"));

static LABEL_STRICT: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r"(?i)^([a-z0-9][a-z0-9-]{1,62}|[a-z-])$"));

static ZONE_ID: LazyLock<Regex> = LazyLock::new(|| static_regex(r"(?i)^[0-9a-z]+$"));

/// Which address families and label characters a host check accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostRules {
    /// Accept dotted IPv4 addresses.
    pub ipv4: bool,
    /// Accept IPv6 addresses (bracketed or bare).
    pub ipv6: bool,
    /// Accept `_` inside DNS labels.
    pub underscore: bool,
}

impl Default for HostRules {
    fn default() -> Self {
        Self {
            ipv4: true,
            ipv6: true,
            underscore: true,
        }
    }
}

/// Validate an IPv4 or IPv6 address.
///
/// IPv4 addresses are returned as given; IPv6 addresses are returned wrapped
/// in square brackets so they can be placed in a URL authority.
pub fn is_ipaddr(addr: &str, rules: HostRules) -> Option<String> {
    if rules.ipv4 && IPV4.is_match(addr) {
        return Some(addr.to_owned());
    }

    if rules.ipv6 {
        let bare = addr
            .strip_prefix('[')
            .map_or(addr, |inner| inner.strip_suffix(']').unwrap_or(inner));
        let (address, zone) = bare
            .split_once('%')
            .map_or((bare, None), |(address, zone)| (address, Some(zone)));
        let zone_ok = zone.is_none_or(|zone| ZONE_ID.is_match(zone));
        if zone_ok && address.parse::<Ipv6Addr>().is_ok() {
            return Some(format!("[{bare}]"));
        }
    }

    None
}

/// Validate a hostname, falling back to IP address validation.
///
/// Returns the normalized host (trailing dot removed) when valid.
pub fn is_hostname(hostname: &str, rules: HostRules) -> Option<String> {
    if hostname.is_empty() || hostname.len() > MAX_HOSTNAME_LENGTH {
        return None;
    }

    let hostname = hostname.strip_suffix('.').unwrap_or(hostname);
    let labels: Vec<&str> = hostname.split('.').collect();

    if labels.len() == 4 && NUMERIC_DOTTED.is_match(hostname) {
        return is_ipaddr(
            hostname,
            HostRules {
                ipv6: false,
                ..rules
            },
        );
    }

    let all_labels_valid = labels.iter().all(|label| is_valid_label(label, rules.underscore));
    if all_labels_valid {
        return Some(hostname.to_owned());
    }

    is_ipaddr(hostname, rules)
}

fn is_valid_label(label: &str, underscore: bool) -> bool {
    if underscore {
        LABEL_WITH_UNDERSCORE.is_match(label) && !label.ends_with(['_', '-'])
    } else {
        LABEL_STRICT.is_match(label) && !label.ends_with('-')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_hostnames() {
        let rules = HostRules::default();
        assert_eq!(is_hostname("localhost", rules).as_deref(), Some("localhost"));
        assert_eq!(
            is_hostname("example.com.", rules).as_deref(),
            Some("example.com")
        );
        assert_eq!(is_hostname("my_host", rules).as_deref(), Some("my_host"));
        assert_eq!(is_hostname("a", rules).as_deref(), Some("a"));
    }

    #[test]
    fn rejects_invalid_labels() {
        let rules = HostRules::default();
        assert!(is_hostname("", rules).is_none());
        assert!(is_hostname("-leading", rules).is_none());
        assert!(is_hostname("trailing-", rules).is_none());
        assert!(is_hostname("under_", rules).is_none());
        assert!(is_hostname("1", rules).is_none());
        assert!(is_hostname(&"a".repeat(64), rules).is_none());
        assert!(is_hostname(&format!("{}.com", "a.".repeat(130)), rules).is_none());

        let strict = HostRules {
            underscore: false,
            ..rules
        };
        assert!(is_hostname("my_host", strict).is_none());
    }

    #[test]
    fn validates_ip_addresses() {
        let rules = HostRules::default();
        assert_eq!(is_hostname("127.0.0.1", rules).as_deref(), Some("127.0.0.1"));
        assert!(is_hostname("256.0.0.1", rules).is_none());
        assert_eq!(is_hostname("[::1]", rules).as_deref(), Some("[::1]"));
        assert_eq!(is_ipaddr("fe80::1%eth0", rules).as_deref(), Some("[fe80::1%eth0]"));
        assert_eq!(
            is_ipaddr("2001:db8::ff00:42:8329", rules).as_deref(),
            Some("[2001:db8::ff00:42:8329]")
        );

        let ipv4_only = HostRules {
            ipv6: false,
            ..rules
        };
        assert!(is_ipaddr("::1", ipv4_only).is_none());
    }
}
