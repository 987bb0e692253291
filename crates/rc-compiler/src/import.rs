//! Rule-file import
//!
//! Accepts a RefControl file, an exported rule file (`{"rules": [...]}`) or
//! a bare rule-set array.

use serde::Deserialize;

use rc_core::types::Rule;

use crate::parser::{compile_entries, RuleEntry};
use crate::refcontrol::{is_refcontrol, parse_refcontrol};

/// Error raised when a file cannot be imported.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("not an available rule file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not an available rule file: no usable rules")]
    NoRules,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RuleFileDoc {
    Exported { rules: Vec<RuleEntry> },
    Bare(Vec<RuleEntry>),
}

/// Read the entries of an import file, whatever its format.
pub fn read_rule_file(text: &str) -> Result<Vec<RuleEntry>, ImportError> {
    if is_refcontrol(text) {
        return Ok(parse_refcontrol(text));
    }

    let doc: RuleFileDoc = serde_json::from_str(text)?;
    let entries = match doc {
        RuleFileDoc::Exported { rules } => rules,
        RuleFileDoc::Bare(rules) => rules,
    };
    Ok(entries)
}

/// Import a rule file into compiled rules.
///
/// Entries with neither source nor target are ignored; a file that leaves
/// no usable rule is an error.
pub fn import_rule_file(text: &str) -> Result<Vec<Rule>, ImportError> {
    let entries: Vec<RuleEntry> = read_rule_file(text)?
        .into_iter()
        .filter(|entry| !entry.is_unbounded())
        .collect();

    let rules = compile_entries(&entries).rules;
    if rules.is_empty() {
        return Err(ImportError::NoRules);
    }

    log::debug!("imported {} rule(s)", rules.len());
    Ok(rules)
}
