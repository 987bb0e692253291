//! Core type definitions for Referrer Control
//!
//! These types are shared by the resolver, the rule store and the
//! bindings. Policy codes keep their integer encoding because that is
//! what stored rule sets and preferences contain.

use std::fmt;
use std::str::FromStr;

use crate::pattern::Pattern;

// =============================================================================
// Policy Codes
// =============================================================================

/// Built-in referrer policy, selected by integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PolicyCode {
    /// Leave the header untouched
    Skip = 0,
    /// Send an empty referrer
    Remove = 1,
    /// `<source scheme>://<source host>/`
    SourceHost = 2,
    /// `<source scheme>://<source base domain>/`
    SourceDomain = 3,
    /// `<scheme>://<target host>/`
    TargetHost = 4,
    /// `<scheme>://<target base domain>/`
    TargetDomain = 5,
    /// The full target URL
    TargetUrl = 6,
}

impl PolicyCode {
    /// Every policy, in code order.
    pub const ALL: [PolicyCode; 7] = [
        Self::Skip,
        Self::Remove,
        Self::SourceHost,
        Self::SourceDomain,
        Self::TargetHost,
        Self::TargetDomain,
        Self::TargetUrl,
    ];

    /// Look up a policy by its stored integer code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Skip),
            1 => Some(Self::Remove),
            2 => Some(Self::SourceHost),
            3 => Some(Self::SourceDomain),
            4 => Some(Self::TargetHost),
            5 => Some(Self::TargetDomain),
            6 => Some(Self::TargetUrl),
            _ => None,
        }
    }

    /// Integer code used in stored rule sets.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Stable name, as shown in policy menus.
    pub fn name(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Remove => "remove",
            Self::SourceHost => "sourceHost",
            Self::SourceDomain => "sourceDomain",
            Self::TargetHost => "targetHost",
            Self::TargetDomain => "targetDomain",
            Self::TargetUrl => "targetUrl",
        }
    }

    /// Whether the policy needs a source URL to produce a value.
    #[inline]
    pub fn needs_source(self) -> bool {
        matches!(self, Self::SourceHost | Self::SourceDomain)
    }
}

impl TryFrom<i64> for PolicyCode {
    type Error = ();

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_code(value).ok_or(())
    }
}

impl fmt::Display for PolicyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for a policy name that is not one of the seven built-ins.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown policy: {0}")]
pub struct UnknownPolicy(pub String);

impl FromStr for PolicyCode {
    type Err = UnknownPolicy;

    /// Accepts the stored integer, the menu name (`targetHost`) or the
    /// kebab-case form (`target-host`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<i64>() {
            return Self::from_code(code).ok_or_else(|| UnknownPolicy(s.to_string()));
        }

        let folded: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        Self::ALL
            .iter()
            .copied()
            .find(|policy| policy.name().to_ascii_lowercase() == folded)
            .ok_or_else(|| UnknownPolicy(s.to_string()))
    }
}

// =============================================================================
// Rules
// =============================================================================

/// What a matching rule does with the referrer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleAction {
    /// Send this exact string
    Literal(String),
    /// Apply a built-in policy to the real source/target URLs
    Policy(PolicyCode),
}

/// One ordered entry of the rule set.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Matches the previous page's URL
    pub source: Pattern,
    /// Matches the URL being requested
    pub target: Pattern,
    pub action: RuleAction,
    /// Free text, never evaluated
    pub comment: String,
}

impl Rule {
    pub fn new(source: Pattern, target: Pattern, action: RuleAction) -> Self {
        Self {
            source,
            target,
            action,
            comment: String::new(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// True when neither pattern constrains anything.
    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.source.is_any() && self.target.is_any()
    }

    /// Test the rule against a request.
    ///
    /// Without a source URL only the target pattern is evaluated.
    #[inline]
    pub fn matches(&self, source: Option<&str>, target: &str) -> bool {
        match source {
            Some(source) => self.source.test(source) && self.target.test(target),
            None => self.target.test(target),
        }
    }
}

// =============================================================================
// Resolve Options
// =============================================================================

/// Flags that gate rule evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Never invent a referrer when the browser had none
    pub ignore_blank_source: bool,
    /// Leave same-site navigation alone
    pub ignore_same_domains: bool,
    /// Compare exact hosts instead of base domains
    pub strict_same_domains: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            ignore_blank_source: true,
            ignore_same_domains: true,
            strict_same_domains: false,
        }
    }
}
