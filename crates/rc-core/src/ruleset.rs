//! Ordered rule-set editing
//!
//! Rules are kept compiled; reordering moves values around and never
//! recompiles a pattern.

use crate::types::{Rule, RuleAction};

/// Error raised by rule-set edits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("a rule needs a source or a target pattern")]
    Unbounded,
    #[error("a custom referrer URL cannot be empty")]
    EmptyLiteral,
    #[error("rule index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Check a rule the way the rule editor does before accepting it.
pub fn validate_rule(rule: &Rule) -> Result<(), RuleError> {
    if rule.is_unbounded() {
        return Err(RuleError::Unbounded);
    }
    if let RuleAction::Literal(url) = &rule.action {
        if url.is_empty() {
            return Err(RuleError::EmptyLiteral);
        }
    }
    Ok(())
}

/// An ordered, editable list of rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn into_rules(self) -> Vec<Rule> {
        self.rules
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    /// Append a validated rule, returning its index.
    pub fn add(&mut self, rule: Rule) -> Result<usize, RuleError> {
        validate_rule(&rule)?;
        self.rules.push(rule);
        Ok(self.rules.len() - 1)
    }

    /// Replace the rule at `index` with a validated one.
    pub fn replace(&mut self, index: usize, rule: Rule) -> Result<Rule, RuleError> {
        self.check_index(index)?;
        validate_rule(&rule)?;
        Ok(std::mem::replace(&mut self.rules[index], rule))
    }

    pub fn remove(&mut self, index: usize) -> Result<Rule, RuleError> {
        self.check_index(index)?;
        Ok(self.rules.remove(index))
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    /// Swap with the previous rule. No-op for the first rule.
    pub fn move_up(&mut self, index: usize) -> Result<usize, RuleError> {
        self.check_index(index)?;
        if index == 0 {
            return Ok(0);
        }
        self.rules.swap(index, index - 1);
        Ok(index - 1)
    }

    /// Swap with the next rule. No-op for the last rule.
    pub fn move_down(&mut self, index: usize) -> Result<usize, RuleError> {
        self.check_index(index)?;
        if index + 1 == self.rules.len() {
            return Ok(index);
        }
        self.rules.swap(index, index + 1);
        Ok(index + 1)
    }

    pub fn move_to_top(&mut self, index: usize) -> Result<usize, RuleError> {
        self.check_index(index)?;
        self.rules[..=index].rotate_right(1);
        Ok(0)
    }

    pub fn move_to_bottom(&mut self, index: usize) -> Result<usize, RuleError> {
        self.check_index(index)?;
        self.rules[index..].rotate_left(1);
        Ok(self.rules.len() - 1)
    }

    #[inline]
    fn check_index(&self, index: usize) -> Result<(), RuleError> {
        if index < self.rules.len() {
            Ok(())
        } else {
            Err(RuleError::IndexOutOfRange {
                index,
                len: self.rules.len(),
            })
        }
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use crate::types::PolicyCode;

    fn lit(target: &str) -> Rule {
        Rule::new(
            Pattern::Any,
            Pattern::compile(Some(target)).unwrap(),
            RuleAction::Literal(format!("https://{target}/")),
        )
    }

    fn targets(set: &RuleSet) -> Vec<&str> {
        set.rules().iter().filter_map(|r| r.target.spec()).collect()
    }

    fn abcd() -> RuleSet {
        RuleSet::from(vec![lit("a"), lit("b"), lit("c"), lit("d")])
    }

    #[test]
    fn test_validation() {
        let mut set = RuleSet::new();
        let unbounded = Rule::new(Pattern::Any, Pattern::Any, RuleAction::Policy(PolicyCode::Remove));
        assert_eq!(set.add(unbounded), Err(RuleError::Unbounded));

        let empty = Rule::new(
            Pattern::compile(Some("x")).unwrap(),
            Pattern::Any,
            RuleAction::Literal(String::new()),
        );
        assert_eq!(set.add(empty), Err(RuleError::EmptyLiteral));

        assert_eq!(set.add(lit("a")), Ok(0));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_replace_and_remove() {
        let mut set = abcd();
        let old = set.replace(1, lit("z")).unwrap();
        assert_eq!(old.target.spec(), Some("b"));
        assert_eq!(targets(&set), vec!["a", "z", "c", "d"]);

        let removed = set.remove(0).unwrap();
        assert_eq!(removed.target.spec(), Some("a"));
        assert_eq!(targets(&set), vec!["z", "c", "d"]);

        assert_eq!(
            set.remove(3),
            Err(RuleError::IndexOutOfRange { index: 3, len: 3 })
        );

        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn test_moves() {
        let mut set = abcd();
        assert_eq!(set.move_up(2), Ok(1));
        assert_eq!(targets(&set), vec!["a", "c", "b", "d"]);

        assert_eq!(set.move_down(1), Ok(2));
        assert_eq!(targets(&set), vec!["a", "b", "c", "d"]);

        assert_eq!(set.move_to_top(3), Ok(0));
        assert_eq!(targets(&set), vec!["d", "a", "b", "c"]);

        assert_eq!(set.move_to_bottom(0), Ok(3));
        assert_eq!(targets(&set), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_moves_at_boundaries() {
        let mut set = abcd();
        assert_eq!(set.move_up(0), Ok(0));
        assert_eq!(set.move_down(3), Ok(3));
        assert_eq!(set.move_to_top(0), Ok(0));
        assert_eq!(set.move_to_bottom(3), Ok(3));
        assert_eq!(targets(&set), vec!["a", "b", "c", "d"]);
        assert!(set.move_up(4).is_err());
    }
}
