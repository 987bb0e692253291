//! Rule-set serialization
//!
//! Produces the stored rule-set string and the exported rule-file document.
//! Empty `source`, `target` and `comment` fields are left out.

use serde::Serialize;

use rc_core::types::{Rule, RuleAction};

// =============================================================================
// Wire Form
// =============================================================================

#[derive(Serialize)]
struct EntryRef<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<&'a str>,
    value: ValueRef<'a>,
    #[serde(skip_serializing_if = "str::is_empty")]
    comment: &'a str,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ValueRef<'a> {
    Url(&'a str),
    Code(u8),
}

#[derive(Serialize)]
struct RuleFile<'a> {
    title: &'a str,
    date: &'a str,
    rules: Vec<EntryRef<'a>>,
}

impl<'a> From<&'a Rule> for EntryRef<'a> {
    fn from(rule: &'a Rule) -> Self {
        Self {
            source: rule.source.spec(),
            target: rule.target.spec(),
            value: match &rule.action {
                RuleAction::Literal(url) => ValueRef::Url(url),
                RuleAction::Policy(code) => ValueRef::Code(code.code()),
            },
            comment: &rule.comment,
        }
    }
}

fn entries(rules: &[Rule]) -> Vec<EntryRef<'_>> {
    rules.iter().map(EntryRef::from).collect()
}

// =============================================================================
// Output
// =============================================================================

/// Compact rule-set string, the form kept in preferences.
pub fn serialize_rules(rules: &[Rule]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&entries(rules))
}

/// Exported rule file: `{title, date, rules}` indented with four spaces.
pub fn build_rule_file(rules: &[Rule], title: &str, date: &str) -> Result<String, serde_json::Error> {
    let document = RuleFile {
        title,
        date,
        rules: entries(rules),
    };

    let mut buf = Vec::with_capacity(256);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    document.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
