//! Rule merging
//!
//! Folds an imported rule list into an existing one without duplicating
//! rules that already cover the same source and target.

use rc_core::types::Rule;

/// Counts from one [`merge_rules`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    pub before: usize,
    pub after: usize,
    pub updated: usize,
    pub appended: usize,
}

/// Merge imported rules into an existing set.
///
/// Rules are the same when their source and target specifications are
/// equal; the existing rule then takes the incoming action and comment in
/// place. Anything else is appended in order.
pub fn merge_rules(rules: &mut Vec<Rule>, incoming: Vec<Rule>) -> MergeStats {
    let before = rules.len();
    let mut updated = 0usize;
    let mut appended = 0usize;

    for rule in incoming {
        let same = rules
            .iter_mut()
            .find(|existing| existing.source == rule.source && existing.target == rule.target);

        match same {
            Some(existing) => {
                existing.action = rule.action;
                existing.comment = rule.comment;
                updated += 1;
            }
            None => {
                rules.push(rule);
                appended += 1;
            }
        }
    }

    let after = rules.len();

    MergeStats {
        before,
        after,
        updated,
        appended,
    }
}
