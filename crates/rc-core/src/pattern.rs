//! Pattern compiler
//!
//! Turns a user-supplied match specification into a matcher over full URL
//! strings. Three forms are understood:
//!
//! - absent or empty: matches everything
//! - `/.../`: the interior is a regular expression, used verbatim
//! - anything else: a wildcard where `*` is any run of characters,
//!   anchored at both ends
//!
//! A wildcard that stops at the authority (`*.tracker.com`,
//! `https://example.com`) names a site rather than a page, so it also
//! covers every path below it. In a site wildcard `*` stays inside the
//! authority, and a spec without a scheme accepts any scheme.
//!
//! ```
//! use rc_core::pattern::Pattern;
//!
//! let p = Pattern::compile(Some("*.example.com")).unwrap();
//! assert!(p.test("http://a.example.com"));
//! assert!(p.test("http://a.example.com/pixel"));
//! assert!(!p.test("http://example.com.evil.org"));
//! assert!(!p.test("https://shop.example.org/go?to=a.example.com/"));
//! ```

use std::fmt;

use regex::Regex;

/// Error raised when a `/.../` specification is not a valid regex.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("invalid regex pattern \"{pattern}\": {source}")]
    InvalidRegex {
        pattern: String,
        source: regex::Error,
    },
}

/// A compiled URL matcher.
#[derive(Clone)]
pub enum Pattern {
    /// No specification supplied
    Any,
    /// Glob-style specification, compiled to an anchored regex
    Wildcard { spec: String, regex: Regex },
    /// `/.../` specification, interior compiled as-is
    Regex { spec: String, regex: Regex },
}

impl Pattern {
    /// Compile a specification. `None` and `""` both mean "match anything".
    pub fn compile(spec: Option<&str>) -> Result<Self, PatternError> {
        let spec = match spec {
            Some(spec) if !spec.is_empty() => spec,
            _ => return Ok(Self::Any),
        };

        if let Some(inner) = regex_body(spec) {
            let regex = build_regex(inner)?;
            return Ok(Self::Regex {
                spec: spec.to_string(),
                regex,
            });
        }

        let regex = build_regex(&wildcard_to_regex(spec))?;
        Ok(Self::Wildcard {
            spec: spec.to_string(),
            regex,
        })
    }

    /// Test a candidate URL. Case-sensitive, never fails.
    #[inline]
    pub fn test(&self, candidate: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Wildcard { regex, .. } | Self::Regex { regex, .. } => regex.is_match(candidate),
        }
    }

    /// The specification this pattern was compiled from.
    pub fn spec(&self) -> Option<&str> {
        match self {
            Self::Any => None,
            Self::Wildcard { spec, .. } | Self::Regex { spec, .. } => Some(spec),
        }
    }

    #[inline]
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self::Any
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("Any"),
            Self::Wildcard { spec, .. } => f.debug_tuple("Wildcard").field(spec).finish(),
            Self::Regex { spec, .. } => f.debug_tuple("Regex").field(spec).finish(),
        }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Any, Self::Any) => true,
            (Self::Wildcard { spec: a, .. }, Self::Wildcard { spec: b, .. }) => a == b,
            (Self::Regex { spec: a, .. }, Self::Regex { spec: b, .. }) => a == b,
            _ => false,
        }
    }
}

/// Interior of a `/.../` specification, if it is one.
fn regex_body(spec: &str) -> Option<&str> {
    if spec.len() >= 2 && spec.starts_with('/') && spec.ends_with('/') {
        Some(&spec[1..spec.len() - 1])
    } else {
        None
    }
}

/// Escape everything except `*`, which becomes `.*`, or `[^/?#]*` in a
/// site wildcard.
fn wildcard_to_regex(spec: &str) -> String {
    let site = is_authority_only(spec);
    let star = if site { "[^/?#]*" } else { ".*" };

    let mut out = String::with_capacity(spec.len() + 32);
    out.push('^');
    if site && !spec.contains("://") {
        out.push_str("[^:/?#]+://");
    }
    for (i, part) in spec.split('*').enumerate() {
        if i > 0 {
            out.push_str(star);
        }
        out.push_str(&regex::escape(part));
    }
    if site {
        out.push_str("(?:[/?#].*)?");
    }
    out.push('$');
    out
}

/// No path separator after the scheme.
#[inline]
fn is_authority_only(spec: &str) -> bool {
    let rest = spec.find("://").map_or(spec, |i| &spec[i + 3..]);
    !rest.contains('/')
}

fn build_regex(source: &str) -> Result<Regex, PatternError> {
    Regex::new(source).map_err(|e| PatternError::InvalidRegex {
        pattern: source.to_string(),
        source: e,
    })
}
