//! Referrer Control Rule Compiler
//!
//! This crate turns stored rule sets, rule files and preferences into the
//! compiled form the decision engine evaluates, and writes them back out.

pub mod builder;
pub mod import;
pub mod optimizer;
pub mod parser;
pub mod refcontrol;
pub mod settings;

pub use builder::{build_rule_file, serialize_rules};
pub use import::{import_rule_file, ImportError};
pub use optimizer::{merge_rules, MergeStats};
pub use parser::{compile_rules, parse_rules, parse_rules_with_report, ParseError, ParsedRules};
pub use settings::{load_config, RulesReport, Settings, SettingsError};
