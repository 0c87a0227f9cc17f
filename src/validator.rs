//! URL policy: scheme and host checks that keep the fetcher from being used as
//! an SSRF proxy into internal infrastructure.

use crate::constants::{ALLOWED_SCHEMES, BLOCKED_HOSTS, MAX_URL_LENGTH};
use crate::error::{FetchError, RejectionReason};
use crate::models::ValidatedUrl;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use url::{Host, Url};

/// Scheme and host policy applied before any network access
#[derive(Debug, Clone)]
pub struct UrlPolicy {
    allowed_schemes: Vec<String>,
    blocked_hosts: Vec<String>,
    max_url_length: usize,
    /// Exact socket addresses exempt from the resolved-address check
    trusted: Vec<SocketAddr>,
}

impl Default for UrlPolicy {
    fn default() -> Self {
        Self::new(ALLOWED_SCHEMES, BLOCKED_HOSTS, MAX_URL_LENGTH)
    }
}

impl UrlPolicy {
    pub fn new(allowed_schemes: &[&str], blocked_hosts: &[&str], max_url_length: usize) -> Self {
        Self {
            allowed_schemes: allowed_schemes.iter().map(|s| s.to_lowercase()).collect(),
            blocked_hosts: blocked_hosts.iter().map(|h| h.to_lowercase()).collect(),
            max_url_length,
            trusted: Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn trust(mut self, addr: SocketAddr) -> Self {
        self.trusted.push(addr);
        self
    }

    /// Check a candidate URL. Stops at the first failing rule.
    pub fn validate(&self, raw: &str) -> Result<ValidatedUrl, RejectionReason> {
        if raw.trim().is_empty() {
            return Err(RejectionReason::Empty);
        }
        if raw.chars().count() > self.max_url_length {
            return Err(RejectionReason::TooLong {
                max: self.max_url_length,
            });
        }

        let url = match Url::parse(raw.trim()) {
            Ok(url) => url,
            Err(url::ParseError::EmptyHost) => {
                // `ftp://` is a scheme problem before it is a host problem
                if let Some((scheme, _)) = raw.trim().split_once(':') {
                    self.check_scheme(&scheme.to_lowercase())?;
                }
                return Err(RejectionReason::MissingHost);
            }
            Err(e) => return Err(RejectionReason::MalformedUrl(e.to_string())),
        };

        self.check_scheme(url.scheme())?;

        // The WHATWG parser has already folded decimal/hex/octal IPv4 forms
        // into `Host::Ipv4`, so obfuscated literals land in the IP branch.
        let (host, ip) = match url.host() {
            Some(Host::Domain(domain)) => (domain.trim_end_matches('.').to_lowercase(), None),
            Some(Host::Ipv4(v4)) => (v4.to_string(), Some(IpAddr::V4(v4))),
            Some(Host::Ipv6(v6)) => (v6.to_string(), Some(IpAddr::V6(v6))),
            None => return Err(RejectionReason::MissingHost),
        };
        if host.is_empty() {
            return Err(RejectionReason::MissingHost);
        }

        if self.is_blocked_literal(&host) {
            return Err(RejectionReason::BlockedHost(host));
        }
        if let Some(ip) = ip {
            self.check_ip(ip)?;
        }

        Ok(ValidatedUrl::from_checked(url, host))
    }

    /// Resolve the host and refuse it if any address is internal.
    ///
    /// Returns the addresses so the caller can pin them for the connection.
    pub async fn verify_resolved(&self, url: &ValidatedUrl) -> Result<Vec<SocketAddr>, FetchError> {
        let port = url.port().unwrap_or(80);

        if let Ok(ip) = url.host().parse::<IpAddr>() {
            let addr = SocketAddr::new(ip, port);
            if !self.trusted.contains(&addr) {
                self.check_ip(ip).map_err(FetchError::Blocked)?;
            }
            return Ok(vec![addr]);
        }

        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((url.host(), port))
            .await
            .map_err(|e| FetchError::Transport {
                detail: format!("DNS lookup failed for {}: {}", url.host(), e),
            })?
            .collect();

        if addrs.is_empty() {
            return Err(FetchError::Transport {
                detail: format!("DNS lookup for {} returned no addresses", url.host()),
            });
        }

        for addr in &addrs {
            if self.trusted.contains(addr) {
                continue;
            }
            if let Err(reason) = self.check_ip(addr.ip()) {
                tracing::warn!(
                    "{} resolves to disallowed address {}",
                    url.host(),
                    addr.ip()
                );
                return Err(FetchError::Blocked(reason));
            }
        }

        Ok(addrs)
    }

    fn check_scheme(&self, scheme: &str) -> Result<(), RejectionReason> {
        if self.allowed_schemes.iter().any(|s| s == scheme) {
            return Ok(());
        }
        Err(RejectionReason::SchemeNotAllowed {
            scheme: scheme.to_string(),
            allowed: self.allowed_schemes.join(", "),
        })
    }

    fn is_blocked_literal(&self, host: &str) -> bool {
        self.blocked_hosts.iter().any(|b| b.eq_ignore_ascii_case(host))
    }

    /// Address-class check shared by literal hosts and resolved addresses
    fn check_ip(&self, ip: IpAddr) -> Result<(), RejectionReason> {
        let text = ip.to_string();
        if self.is_blocked_literal(&text) {
            return Err(RejectionReason::BlockedHost(text));
        }
        let internal = match ip {
            IpAddr::V4(v4) => is_internal_v4(v4),
            IpAddr::V6(v6) => {
                if let Some(v4) = v6.to_ipv4_mapped() {
                    return self.check_ip(IpAddr::V4(v4));
                }
                is_internal_v6(v6)
            }
        };
        if internal {
            return Err(RejectionReason::PrivateAddress(text));
        }
        Ok(())
    }
}

fn is_internal_v4(ip: Ipv4Addr) -> bool {
    // 10/8, 172.16/12 and 192.168/16
    ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
}

fn is_internal_v6(ip: Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || (first & 0xfe00) == 0xfc00 // unique local
        || (first & 0xffc0) == 0xfe80 // link local
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> UrlPolicy {
        UrlPolicy::default()
    }

    #[test]
    fn test_accepts_public_https() {
        let url = policy().validate("https://example.com/test.txt").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host(), "example.com");
        assert_eq!(url.path(), "/test.txt");
        assert_eq!(url.raw(), "https://example.com/test.txt");
    }

    #[test]
    fn test_rejects_empty_and_long() {
        assert_eq!(policy().validate(""), Err(RejectionReason::Empty));
        assert_eq!(policy().validate("   "), Err(RejectionReason::Empty));

        let long = format!("https://example.com/{}", "a".repeat(2048));
        assert_eq!(policy().validate(&long), Err(RejectionReason::TooLong { max: 2048 }));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!(
            policy().validate("not a url"),
            Err(RejectionReason::MalformedUrl(_))
        ));
    }

    #[test]
    fn test_rejects_other_schemes() {
        for raw in ["ftp://example.com/a.txt", "file:///etc/passwd", "gopher://example.com/"] {
            assert!(
                matches!(policy().validate(raw), Err(RejectionReason::SchemeNotAllowed { .. })),
                "{} should be refused",
                raw
            );
        }
    }

    #[test]
    fn test_rejects_missing_host() {
        assert_eq!(policy().validate("http://"), Err(RejectionReason::MissingHost));
        assert_eq!(policy().validate("HTTPS://"), Err(RejectionReason::MissingHost));
    }

    #[test]
    fn test_hostless_url_reports_scheme_first() {
        assert_eq!(
            policy().validate("ftp://"),
            Err(RejectionReason::SchemeNotAllowed {
                scheme: "ftp".to_string(),
                allowed: "http, https".to_string(),
            })
        );
    }

    #[test]
    fn test_rejects_metadata_endpoint() {
        let result = policy().validate("http://169.254.169.254/latest/meta-data/");
        assert_eq!(
            result,
            Err(RejectionReason::BlockedHost("169.254.169.254".to_string()))
        );
    }

    #[test]
    fn test_rejects_blocked_literals_case_insensitive() {
        for raw in [
            "http://localhost/x",
            "http://LOCALHOST:8080/x",
            "http://localhost./x",
            "http://127.0.0.1/",
            "http://0.0.0.0/",
            "http://[::1]/",
        ] {
            assert!(
                matches!(policy().validate(raw), Err(RejectionReason::BlockedHost(_))),
                "{} should be blocked",
                raw
            );
        }
    }

    #[test]
    fn test_rejects_obfuscated_loopback() {
        for raw in ["http://2130706433/", "http://0x7f000001/", "http://0177.0.0.1/", "http://127.1/"] {
            assert!(
                matches!(policy().validate(raw), Err(RejectionReason::BlockedHost(_))),
                "{} should be blocked",
                raw
            );
        }
    }

    #[test]
    fn test_rejects_private_ranges() {
        assert!(matches!(
            policy().validate("http://10.1.2.3/a.pdf"),
            Err(RejectionReason::PrivateAddress(_))
        ));
        assert!(matches!(
            policy().validate("http://192.168.0.10/"),
            Err(RejectionReason::PrivateAddress(_))
        ));
        for second in 16..=31 {
            let raw = format!("http://172.{}.0.1/", second);
            assert!(
                matches!(policy().validate(&raw), Err(RejectionReason::PrivateAddress(_))),
                "{} should be private",
                raw
            );
        }
    }

    #[test]
    fn test_allows_neighbours_of_private_ranges() {
        assert!(policy().validate("http://172.15.0.1/").is_ok());
        assert!(policy().validate("http://172.32.0.1/").is_ok());
        assert!(policy().validate("http://11.0.0.1/").is_ok());
        assert!(policy().validate("http://10.example.com/").is_ok());
    }

    #[test]
    fn test_rejects_other_internal_classes() {
        for raw in [
            "http://127.0.0.2/",
            "http://169.254.1.1/",
            "http://[fd00::1]/",
            "http://[fe80::1]/",
            "http://[::ffff:10.0.0.1]/",
        ] {
            assert!(
                matches!(policy().validate(raw), Err(RejectionReason::PrivateAddress(_))),
                "{} should be refused",
                raw
            );
        }
        assert!(matches!(
            policy().validate("http://[::ffff:127.0.0.1]/"),
            Err(RejectionReason::BlockedHost(_))
        ));
    }

    #[tokio::test]
    async fn test_verify_resolved_refuses_loopback_literal() {
        let url = ValidatedUrl::unchecked("http://127.0.0.1:8080/file.txt");
        let result = policy().verify_resolved(&url).await;
        assert!(matches!(
            result,
            Err(FetchError::Blocked(RejectionReason::BlockedHost(_)))
        ));
    }

    #[tokio::test]
    async fn test_verify_resolved_passes_public_literal() {
        let url = ValidatedUrl::unchecked("http://93.184.216.34/file.txt");
        let addrs = policy().verify_resolved(&url).await.unwrap();
        assert_eq!(addrs, vec!["93.184.216.34:80".parse::<SocketAddr>().unwrap()]);
    }

    #[tokio::test]
    async fn test_verify_resolved_refuses_localhost_name() {
        let url = ValidatedUrl::unchecked("http://localhost:9/");
        assert!(policy().verify_resolved(&url).await.is_err());
    }

    #[tokio::test]
    async fn test_verify_resolved_name_to_loopback_without_blocklist() {
        let open = UrlPolicy::new(ALLOWED_SCHEMES, &[], MAX_URL_LENGTH);
        let url = open.validate("http://localhost:9/secret.txt").unwrap();
        assert!(matches!(
            open.verify_resolved(&url).await,
            Err(FetchError::Blocked(RejectionReason::PrivateAddress(_)))
        ));
    }

    #[tokio::test]
    async fn test_verify_resolved_trusted_address() {
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        let url = ValidatedUrl::unchecked("http://127.0.0.1:8080/file.txt");
        assert_eq!(policy().trust(addr).verify_resolved(&url).await.unwrap(), vec![addr]);

        let other = ValidatedUrl::unchecked("http://127.0.0.1:8081/file.txt");
        assert!(policy().trust(addr).verify_resolved(&other).await.is_err());
    }
}
