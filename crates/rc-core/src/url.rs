//! URL helpers shared by the resolver and the bindings
//!
//! Parsing is delegated to the `url` crate; these functions only cover the
//! few shapes the engine builds or accepts at its edges.

use ::url::Url;

// =============================================================================
// Parsing
// =============================================================================

/// Parse an absolute URL, tolerating surrounding whitespace.
///
/// Returns `None` for empty input and for anything that is not an
/// absolute URL.
#[inline]
pub fn parse_url(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Url::parse(raw).ok()
}

/// Parse an optional source URL as handed over by a collaborator.
///
/// An empty or unparseable source counts as "no source".
pub fn parse_source(raw: Option<&str>) -> Option<Url> {
    raw.and_then(parse_url)
}

// =============================================================================
// Building
// =============================================================================

/// Host of a URL, `None` for host-less URLs such as `data:` or `about:`.
#[inline]
pub fn host_of(url: &Url) -> Option<&str> {
    url.host_str().filter(|h| !h.is_empty())
}

/// `<scheme>://<host>/`, the shape every host/domain policy produces.
#[inline]
pub fn root_url(scheme: &str, host: &str) -> String {
    let mut out = String::with_capacity(scheme.len() + host.len() + 4);
    out.push_str(scheme);
    out.push_str("://");
    out.push_str(host);
    out.push('/');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        assert!(parse_url("https://example.com/a?b#c").is_some());
        assert!(parse_url("  https://example.com/  ").is_some());
        assert!(parse_url("").is_none());
        assert!(parse_url("   ").is_none());
        assert!(parse_url("example.com/path").is_none());
    }

    #[test]
    fn test_parse_source() {
        assert!(parse_source(None).is_none());
        assert!(parse_source(Some("")).is_none());
        assert!(parse_source(Some("http://a.b/")).is_some());
    }

    #[test]
    fn test_host_of() {
        let url = parse_url("https://Sub.Example.com:8443/x").unwrap();
        assert_eq!(host_of(&url), Some("sub.example.com"));

        let url = parse_url("data:text/plain,hello").unwrap();
        assert_eq!(host_of(&url), None);
    }

    #[test]
    fn test_root_url() {
        assert_eq!(root_url("https", "example.com"), "https://example.com/");
        assert_eq!(root_url("http", "[::1]"), "http://[::1]/");
    }
}
