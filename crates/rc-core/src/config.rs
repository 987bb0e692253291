//! Resolved configuration snapshots
//!
//! A [`Config`] is immutable once built. Reloads build a fresh one and
//! publish it through [`SharedConfig`]; calls already holding the old
//! snapshot finish on it.

use std::sync::{Arc, PoisonError, RwLock};

use crate::types::{PolicyCode, ResolveOptions, Rule};

/// Everything the resolver needs besides the two URLs.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Master switch; when off the header is never touched
    pub activated: bool,
    pub ignore_blank_source: bool,
    pub ignore_same_domains: bool,
    pub strict_same_domains: bool,
    /// Applied when no rule matches
    pub default_policy: PolicyCode,
    /// Ordered, first match wins
    pub rules: Vec<Rule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            activated: true,
            ignore_blank_source: true,
            ignore_same_domains: true,
            strict_same_domains: false,
            default_policy: PolicyCode::Remove,
            rules: Vec::new(),
        }
    }
}

impl Config {
    /// The evaluation flags of this snapshot.
    #[inline]
    pub fn options(&self) -> ResolveOptions {
        ResolveOptions {
            ignore_blank_source: self.ignore_blank_source,
            ignore_same_domains: self.ignore_same_domains,
            strict_same_domains: self.strict_same_domains,
        }
    }

    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = rules;
        self
    }
}

// =============================================================================
// Publication
// =============================================================================

/// Atomically swappable configuration.
///
/// Readers take a cheap `Arc` clone and never hold the lock while
/// resolving.
#[derive(Debug, Default)]
pub struct SharedConfig {
    current: RwLock<Arc<Config>>,
}

impl SharedConfig {
    pub fn new(config: Config) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
        }
    }

    /// Current snapshot.
    pub fn load(&self) -> Arc<Config> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Publish a new snapshot, returning the previous one.
    pub fn store(&self, config: Config) -> Arc<Config> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(config))
    }

    /// Build a new snapshot from the current one and publish it.
    pub fn update<F>(&self, f: F) -> Arc<Config>
    where
        F: FnOnce(&Config) -> Config,
    {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let next = Arc::new(f(&guard));
        *guard = Arc::clone(&next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.activated);
        assert_eq!(config.default_policy, PolicyCode::Remove);
        assert_eq!(config.options(), ResolveOptions::default());
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_swap_keeps_old_snapshot_alive() {
        let shared = SharedConfig::new(Config::default());
        let before = shared.load();

        let previous = shared.store(Config {
            default_policy: PolicyCode::TargetHost,
            ..Config::default()
        });

        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(before.default_policy, PolicyCode::Remove);
        assert_eq!(shared.load().default_policy, PolicyCode::TargetHost);
    }

    #[test]
    fn test_update() {
        let shared = SharedConfig::default();
        shared.update(|c| Config {
            activated: false,
            ..c.clone()
        });
        assert!(!shared.load().activated);
        assert!(shared.load().ignore_blank_source);
    }
}
