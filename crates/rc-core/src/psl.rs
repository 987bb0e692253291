//! Public Suffix List (PSL) utilities for base-domain extraction
//!
//! The engine never ships suffix data of its own. The collaborator either
//! hands over the text of the Public Suffix List, parsed into a
//! [`SuffixList`], or the engine falls back to [`FallbackSuffixes`], a small
//! heuristic that is right for the common cases.
//!
//! # Examples
//!
//! ```
//! use rc_core::psl::{DomainLookup, FallbackSuffixes};
//!
//! let lookup = FallbackSuffixes;
//! assert_eq!(lookup.base_domain("sub.example.com").as_deref(), Some("example.com"));
//! assert_eq!(lookup.base_domain("mail.example.co.uk").as_deref(), Some("example.co.uk"));
//! ```

use publicsuffix::{List, Psl};
use url::{Host, Url};

/// Error raised when Public Suffix List text cannot be parsed.
#[derive(Debug, thiserror::Error)]
pub enum SuffixListError {
    #[error("invalid public suffix list: {0}")]
    InvalidList(String),
}

// =============================================================================
// Lookup Trait
// =============================================================================

/// Registrable-domain lookup service.
pub trait DomainLookup: Send + Sync {
    /// Base domain (eTLD+1) of a hostname, or `None` when the host has no
    /// registrable part (a bare suffix, a single label, ...).
    fn base_domain(&self, host: &str) -> Option<String>;
}

// =============================================================================
// Full List
// =============================================================================

/// The Public Suffix List, parsed from its published text form.
pub struct SuffixList {
    list: List,
}

impl SuffixList {
    /// Parse PSL text (the `public_suffix_list.dat` format).
    pub fn parse(text: &str) -> Result<Self, SuffixListError> {
        let list = text
            .parse::<List>()
            .map_err(|e| SuffixListError::InvalidList(e.to_string()))?;
        log::debug!("public suffix list loaded ({} bytes)", text.len());
        Ok(Self { list })
    }
}

impl DomainLookup for SuffixList {
    fn base_domain(&self, host: &str) -> Option<String> {
        let host = normalize_host(host);
        if host.is_empty() {
            return None;
        }
        let domain = self.list.domain(host.as_bytes())?;
        std::str::from_utf8(domain.as_bytes()).ok().map(str::to_owned)
    }
}

// =============================================================================
// Fallback Heuristic
// =============================================================================

/// Common two-part TLDs for fallback.
const COMMON_TWO_PART_TLDS: &[&str] = &[
    "co.uk", "co.jp", "co.nz", "co.za", "co.in", "co.kr",
    "com.au", "com.br", "com.cn", "com.mx", "com.tw", "com.hk",
    "net.au", "net.nz",
    "org.uk", "org.au",
    "gov.uk", "gov.au",
    "ac.uk", "ac.jp",
    "ne.jp", "or.jp",
];

/// Heuristic lookup used when no suffix list is loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackSuffixes;

impl DomainLookup for FallbackSuffixes {
    fn base_domain(&self, host: &str) -> Option<String> {
        let host = normalize_host(host);
        let labels: Vec<&str> = host.split('.').collect();
        if labels.len() <= 1 || labels.iter().any(|l| l.is_empty()) {
            return None;
        }
        fallback_etld1(&labels)
    }
}

/// Last two labels, or three when the last two form a known two-part TLD.
fn fallback_etld1(labels: &[&str]) -> Option<String> {
    let n = labels.len();

    let last_two = format!("{}.{}", labels[n - 2], labels[n - 1]);
    if COMMON_TWO_PART_TLDS.contains(&last_two.as_str()) {
        if n < 3 {
            return None;
        }
        return Some(labels[n - 3..].join("."));
    }

    Some(last_two)
}

fn normalize_host(host: &str) -> String {
    host.trim_end_matches('.').to_ascii_lowercase()
}

// =============================================================================
// Domain Helpers
// =============================================================================

/// Effective (registrable) domain of a URL.
///
/// IP literals, hosts without a registrable part and failed lookups fall
/// back to the literal host. URLs without a host yield an empty string.
pub fn effective_domain(url: &Url, lookup: &dyn DomainLookup) -> String {
    match url.host() {
        Some(Host::Domain(domain)) => lookup
            .base_domain(domain)
            .unwrap_or_else(|| domain.to_string()),
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => url.host_str().unwrap_or_default().to_string(),
        None => String::new(),
    }
}

/// Whether two URLs belong to the same site.
///
/// `strict` compares exact hosts, otherwise base domains.
pub fn are_same_domain(a: &Url, b: &Url, strict: bool, lookup: &dyn DomainLookup) -> bool {
    if strict {
        a.host_str() == b.host_str()
    } else {
        effective_domain(a, lookup) == effective_domain(b, lookup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINI_PSL: &str = "\
// ===BEGIN ICANN DOMAINS===
com
org
uk
co.uk
jp
*.kawasaki.jp
!city.kawasaki.jp
// ===END ICANN DOMAINS===
";

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_fallback_etld1_simple() {
        assert_eq!(fallback_etld1(&["example", "com"]).as_deref(), Some("example.com"));
        assert_eq!(fallback_etld1(&["sub", "example", "com"]).as_deref(), Some("example.com"));
    }

    #[test]
    fn test_fallback_etld1_two_part() {
        assert_eq!(fallback_etld1(&["sub", "example", "co", "uk"]).as_deref(), Some("example.co.uk"));
        assert_eq!(fallback_etld1(&["example", "co", "uk"]).as_deref(), Some("example.co.uk"));
        assert_eq!(fallback_etld1(&["co", "uk"]), None);
    }

    #[test]
    fn test_fallback_single_label() {
        assert_eq!(FallbackSuffixes.base_domain("localhost"), None);
        assert_eq!(FallbackSuffixes.base_domain(""), None);
        assert_eq!(FallbackSuffixes.base_domain("WWW.Example.COM."), Some("example.com".into()));
    }

    #[test]
    fn test_suffix_list_lookup() {
        let list = SuffixList::parse(MINI_PSL).unwrap();
        assert_eq!(list.base_domain("mail.example.co.uk").as_deref(), Some("example.co.uk"));
        assert_eq!(list.base_domain("a.b.example.com").as_deref(), Some("example.com"));
        assert_eq!(list.base_domain("co.uk"), None);
    }

    #[test]
    fn test_effective_domain_ip_falls_back_to_host() {
        let lookup = FallbackSuffixes;
        assert_eq!(effective_domain(&url("http://192.168.1.10:8080/x"), &lookup), "192.168.1.10");
        assert_eq!(effective_domain(&url("http://[::1]/"), &lookup), "[::1]");
        assert_eq!(effective_domain(&url("http://localhost/"), &lookup), "localhost");
        assert_eq!(effective_domain(&url("https://a.b.example.com/"), &lookup), "example.com");
    }

    #[test]
    fn test_same_domain() {
        let lookup = FallbackSuffixes;
        let a = url("http://a.example.com/p");
        let b = url("http://b.example.com/q");
        assert!(are_same_domain(&a, &b, false, &lookup));
        assert!(!are_same_domain(&a, &b, true, &lookup));
        assert!(are_same_domain(&a, &url("https://a.example.com:8443/"), true, &lookup));
        assert!(!are_same_domain(&a, &url("http://example.org/"), false, &lookup));
    }
}
