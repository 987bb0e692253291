//! RefControl rule-file importer
//!
//! RefControl files start with a `[RefControl]` line followed by
//! `domain=action` lines. A RefControl domain matches itself and every
//! subdomain, so each one becomes a target regex over http and https.

use crate::parser::{RuleEntry, RuleValue};

/// First line of every RefControl file.
pub const REFCONTROL_HEADER: &str = "[RefControl]";

/// RefControl's third-party marker; third-party handling is global here.
const THIRD_PARTY_PREFIX: &str = "@3RDPARTY:";

/// Whether `text` looks like a RefControl file.
pub fn is_refcontrol(text: &str) -> bool {
    text.trim_start().starts_with(REFCONTROL_HEADER)
}

/// Convert a RefControl file into rule entries.
///
/// The header line is skipped, blank lines are ignored and lines without a
/// `=` are dropped with a diagnostic.
pub fn parse_refcontrol(text: &str) -> Vec<RuleEntry> {
    text.trim_start()
        .lines()
        .map(str::trim)
        .skip(1)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let entry = convert_line(line);
            if entry.is_none() {
                log::debug!("RefControl line skipped: {line}");
            }
            entry
        })
        .collect()
}

fn convert_line(line: &str) -> Option<RuleEntry> {
    let (site, action) = line.split_once('=')?;
    let site = site.trim();
    if site.is_empty() {
        return None;
    }

    let action = action.trim();
    let action = action.strip_prefix(THIRD_PARTY_PREFIX).unwrap_or(action);
    let value = match action {
        "@NORMAL" => RuleValue::code(0),
        "@FORGE" => RuleValue::code(4),
        "" => RuleValue::code(1),
        url => RuleValue::Url(url.to_string()),
    };

    Some(RuleEntry {
        source: None,
        target: Some(site_target(site)),
        value,
        comment: Some(format!("RefControl: {line}")),
    })
}

/// `example.com` -> `/^https?://(?:[^/]+\.)*example\.com/.*$/`
fn site_target(site: &str) -> String {
    format!("/^https?://(?:[^/]+\\.)*{}/.*$/", regex::escape(site))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_core::pattern::Pattern;

    const SAMPLE: &str = "[RefControl]
google.com=@NORMAL
example.org=@FORGE

tracker.net=
shop.example.com=@3RDPARTY:https://fake.example/
  spaced.org = @NORMAL  
no-separator-here
";

    #[test]
    fn test_detect() {
        assert!(is_refcontrol(SAMPLE));
        assert!(is_refcontrol("\n  [RefControl]\n"));
        assert!(!is_refcontrol("[]"));
    }

    #[test]
    fn test_actions() {
        let entries = parse_refcontrol(SAMPLE);
        let values: Vec<&RuleValue> = entries.iter().map(|e| &e.value).collect();
        assert_eq!(
            values,
            vec![
                &RuleValue::code(0),
                &RuleValue::code(4),
                &RuleValue::code(1),
                &RuleValue::Url("https://fake.example/".into()),
                &RuleValue::code(0),
            ]
        );
        assert_eq!(entries[0].comment.as_deref(), Some("RefControl: google.com=@NORMAL"));
        assert!(entries.iter().all(|e| e.source.is_none()));
    }

    #[test]
    fn test_target_covers_subdomains() {
        let entries = parse_refcontrol("[RefControl]\ngoogle.com=\n");
        let target = entries[0].target.as_deref().unwrap();
        assert_eq!(target, "/^https?://(?:[^/]+\\.)*google\\.com/.*$/");

        let pattern = Pattern::compile(Some(target)).unwrap();
        assert!(pattern.test("https://google.com/"));
        assert!(pattern.test("http://mail.google.com/inbox"));
        assert!(!pattern.test("https://notgoogle.com/"));
        assert!(!pattern.test("https://googleXcom/"));
        assert!(!pattern.test("ftp://google.com/"));
    }
}
