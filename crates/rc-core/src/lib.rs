//! Referrer Control Core Library
//!
//! This crate provides the referrer decision engine: given the URL of the
//! page a request comes from, the URL it goes to, an ordered rule set and a
//! default policy, decide what the Referer header should carry.
//!
//! # Architecture
//!
//! Patterns are compiled once when a rule set is loaded. Resolution is then
//! a pure function over a [`Config`] snapshot; reloads publish a new
//! snapshot through [`SharedConfig`] without disturbing calls in flight.
//!
//! # Modules
//!
//! - `pattern`: wildcard / regex / match-anything URL matchers
//! - `types`: policy codes, rules and resolution flags
//! - `resolver`: the decision engine
//! - `psl`: registrable-domain lookup (Public Suffix List or heuristic)
//! - `config`: configuration snapshots and atomic publication
//! - `ruleset`: ordered rule-set editing
//! - `url`: URL helpers

pub mod config;
pub mod pattern;
pub mod psl;
pub mod resolver;
pub mod ruleset;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use config::{Config, SharedConfig};
pub use pattern::{Pattern, PatternError};
pub use psl::{DomainLookup, FallbackSuffixes, SuffixList, SuffixListError};
pub use resolver::{Decision, DecisionReason, Resolver};
pub use ruleset::{RuleError, RuleSet};
pub use types::{PolicyCode, ResolveOptions, Rule, RuleAction, UnknownPolicy};
