//! Rule-set JSON parser
//!
//! A rule set is a JSON array of `{source?, target?, value, comment?}`
//! objects. A malformed document fails as a whole; a well-formed entry that
//! cannot be used (unknown policy code, invalid regex) is dropped on its own
//! and parsing continues.

use std::fmt;

use serde::Deserialize;
use serde_json::Number;

use rc_core::pattern::{Pattern, PatternError};
use rc_core::types::{PolicyCode, Rule, RuleAction};

/// Error raised when a rule-set document cannot be read at all.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid rule set: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Wire Form
// =============================================================================

/// One rule as stored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuleEntry {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    pub value: RuleValue,
    #[serde(default)]
    pub comment: Option<String>,
}

/// A stored action: a literal referrer or a policy code.
///
/// Any JSON number is accepted as a code so that an out-of-range or
/// fractional value drops only its own rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Url(String),
    Code(Number),
}

impl RuleValue {
    pub fn code(code: i64) -> Self {
        Self::Code(Number::from(code))
    }
}

/// Policy for a stored code. Integral floats (`4.0`) count as integers.
fn policy_of(code: &Number) -> Option<PolicyCode> {
    if let Some(code) = code.as_i64() {
        return PolicyCode::from_code(code);
    }
    if code.is_u64() {
        return None;
    }
    let code = code.as_f64()?;
    if code.fract() != 0.0 || code.abs() > f64::from(i32::MAX) {
        return None;
    }
    PolicyCode::from_code(code as i64)
}

impl RuleEntry {
    /// Whether both patterns are missing or empty.
    pub fn is_unbounded(&self) -> bool {
        is_blank(&self.source) && is_blank(&self.target)
    }

    /// Compile this entry into a rule.
    pub fn compile(&self) -> Result<Rule, RejectReason> {
        let action = match &self.value {
            RuleValue::Url(url) => RuleAction::Literal(url.clone()),
            RuleValue::Code(code) => {
                RuleAction::Policy(policy_of(code).ok_or_else(|| RejectReason::UnknownPolicy(code.clone()))?)
            }
        };
        let source = Pattern::compile(self.source.as_deref()).map_err(RejectReason::InvalidPattern)?;
        let target = Pattern::compile(self.target.as_deref()).map_err(RejectReason::InvalidPattern)?;

        Ok(Rule::new(source, target, action).with_comment(self.comment.clone().unwrap_or_default()))
    }
}

#[inline]
fn is_blank(spec: &Option<String>) -> bool {
    spec.as_deref().map_or(true, str::is_empty)
}

// =============================================================================
// Rejections
// =============================================================================

/// Why a single entry was dropped.
#[derive(Debug)]
pub enum RejectReason {
    UnknownPolicy(Number),
    InvalidPattern(PatternError),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPolicy(code) => write!(f, "unknown policy code {code}"),
            Self::InvalidPattern(err) => write!(f, "{err}"),
        }
    }
}

/// A dropped entry, by position in the document.
#[derive(Debug)]
pub struct RejectedRule {
    pub index: usize,
    pub reason: RejectReason,
}

/// Result of parsing a document that was well-formed.
#[derive(Debug, Default)]
pub struct ParsedRules {
    pub rules: Vec<Rule>,
    pub rejected: Vec<RejectedRule>,
}

// =============================================================================
// Parsing
// =============================================================================

/// Read the raw entries of a rule-set document. Blank text is an empty set.
pub fn parse_entries(text: &str) -> Result<Vec<RuleEntry>, ParseError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(text)?)
}

/// Compile entries, keeping the ones that can be used.
pub fn compile_entries(entries: &[RuleEntry]) -> ParsedRules {
    let mut parsed = ParsedRules::default();

    for (index, entry) in entries.iter().enumerate() {
        match entry.compile() {
            Ok(rule) => parsed.rules.push(rule),
            Err(reason) => {
                match &reason {
                    RejectReason::UnknownPolicy(_) => log::debug!("rule #{index} dropped: {reason}"),
                    RejectReason::InvalidPattern(_) => log::warn!("rule #{index} dropped: {reason}"),
                }
                parsed.rejected.push(RejectedRule { index, reason });
            }
        }
    }

    parsed
}

/// Parse a rule set and report what was dropped.
pub fn parse_rules_with_report(text: &str) -> Result<ParsedRules, ParseError> {
    let entries = parse_entries(text)?;
    Ok(compile_entries(&entries))
}

/// Parse a rule set.
pub fn parse_rules(text: &str) -> Result<Vec<Rule>, ParseError> {
    parse_rules_with_report(text).map(|parsed| parsed.rules)
}

/// Parse a rule set for the request path: a broken document is logged once
/// and yields no rules.
pub fn compile_rules(text: &str) -> Vec<Rule> {
    match parse_rules(text) {
        Ok(rules) => rules,
        Err(err) => {
            log::warn!("{err}; continuing with an empty rule set");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_is_empty() {
        assert!(parse_rules("").unwrap().is_empty());
        assert!(parse_rules("  \n\t ").unwrap().is_empty());
        assert!(parse_rules("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_actions() {
        let rules = parse_rules(
            r#"[
                {"source": "*.a.com", "target": "*.b.com", "value": 3, "comment": "hi"},
                {"target": "/cdn\\./", "value": "https://fake.example/"}
            ]"#,
        )
        .unwrap();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].source.spec(), Some("*.a.com"));
        assert_eq!(rules[0].action, RuleAction::Policy(PolicyCode::SourceDomain));
        assert_eq!(rules[0].comment, "hi");

        assert!(rules[1].source.is_any());
        assert!(matches!(rules[1].target, Pattern::Regex { .. }));
        assert_eq!(rules[1].action, RuleAction::Literal("https://fake.example/".into()));
        assert_eq!(rules[1].comment, "");
    }

    #[test]
    fn test_unknown_code_drops_only_that_rule() {
        let parsed = parse_rules_with_report(
            r#"[{"target": "a", "value": 99}, {"target": "b", "value": 1}, {"target": "c", "value": -2}]"#,
        )
        .unwrap();
        assert_eq!(parsed.rules.len(), 1);
        assert_eq!(parsed.rules[0].target.spec(), Some("b"));
        assert_eq!(parsed.rejected.len(), 2);
        assert_eq!(parsed.rejected[0].index, 0);
        assert!(matches!(
            &parsed.rejected[1].reason,
            RejectReason::UnknownPolicy(code) if code.as_i64() == Some(-2)
        ));
    }

    #[test]
    fn test_huge_or_fractional_code_drops_only_that_rule() {
        let parsed = parse_rules_with_report(
            r#"[
                {"target": "a", "value": 18446744073709551615},
                {"target": "b", "value": 1},
                {"target": "c", "value": 1.5},
                {"target": "d", "value": 4.0},
                {"target": "e", "value": -1e300}
            ]"#,
        )
        .unwrap();

        let kept: Vec<_> = parsed.rules.iter().map(|r| r.target.spec()).collect();
        assert_eq!(kept, vec![Some("b"), Some("d")]);
        assert_eq!(parsed.rules[1].action, RuleAction::Policy(PolicyCode::TargetHost));

        let dropped: Vec<usize> = parsed.rejected.iter().map(|r| r.index).collect();
        assert_eq!(dropped, vec![0, 2, 4]);
        assert_eq!(
            parsed.rejected[0].reason.to_string(),
            "unknown policy code 18446744073709551615"
        );
    }

    #[test]
    fn test_invalid_regex_drops_rule_with_reason() {
        let parsed = parse_rules_with_report(
            r#"[{"target": "/([a-z/", "value": 1}, {"target": "*.ok.com", "value": 1}]"#,
        )
        .unwrap();
        assert_eq!(parsed.rules.len(), 1);
        assert_eq!(parsed.rejected[0].index, 0);
        let message = parsed.rejected[0].reason.to_string();
        assert!(message.contains("([a-z"), "{message}");
    }

    #[test]
    fn test_malformed_document_fails() {
        assert!(parse_rules("{").is_err());
        assert!(parse_rules(r#"{"rules": []}"#).is_err());
        assert!(parse_rules(r#"[{"target": "x"}]"#).is_err());
        assert!(parse_rules(r#"[{"target": "x", "value": true}]"#).is_err());
        assert!(parse_rules(r#"[1, 2]"#).is_err());
    }

    #[test]
    fn test_compile_rules_falls_back_to_empty() {
        assert!(compile_rules("not json").is_empty());
        assert_eq!(compile_rules(r#"[{"value": 0}]"#).len(), 1);
    }

    #[test]
    fn test_null_and_empty_patterns_are_absent() {
        let rules = parse_rules(r#"[{"source": null, "target": "", "value": 2}]"#).unwrap();
        assert!(rules[0].is_unbounded());
    }

    #[test]
    fn test_entry_is_unbounded() {
        let entries = parse_entries(r#"[{"source": "", "value": 1}, {"target": "x", "value": 1}]"#).unwrap();
        assert!(entries[0].is_unbounded());
        assert!(!entries[1].is_unbounded());
    }
}
