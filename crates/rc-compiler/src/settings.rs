//! Stored preferences
//!
//! The preference form keeps the rule set as a JSON string under
//! `customRules` and the default policy as a bare integer. Missing keys
//! take the defaults of [`Config`].

use serde::{Deserialize, Serialize};

use rc_core::config::Config;
use rc_core::types::PolicyCode;

use crate::parser::{parse_rules_with_report, ParseError, RejectedRule};

/// What was lost while loading the rule set of a preference document.
#[derive(Debug, Default)]
pub struct RulesReport {
    /// Set when the rule set was unreadable and replaced by an empty one
    pub broken: Option<ParseError>,
    pub rejected: Vec<RejectedRule>,
}

/// Error raised when the preference document itself cannot be read.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid settings: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub activated: bool,
    pub ignore_blank_source: bool,
    pub ignore_same_domains: bool,
    pub strict_same_domains: bool,
    pub default_policy: i64,
    pub custom_rules: String,
}

impl Default for Settings {
    fn default() -> Self {
        let config = Config::default();
        Self {
            activated: config.activated,
            ignore_blank_source: config.ignore_blank_source,
            ignore_same_domains: config.ignore_same_domains,
            strict_same_domains: config.strict_same_domains,
            default_policy: i64::from(config.default_policy.code()),
            custom_rules: "[]".to_string(),
        }
    }
}

impl Settings {
    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(text)?)
    }

    /// Default policy, with unknown codes treated as skip.
    pub fn default_policy(&self) -> PolicyCode {
        PolicyCode::from_code(self.default_policy).unwrap_or_else(|| {
            log::warn!("unknown default policy {}, using skip", self.default_policy);
            PolicyCode::Skip
        })
    }

    /// Every setting except the rule set.
    pub fn base_config(&self) -> Config {
        Config {
            activated: self.activated,
            ignore_blank_source: self.ignore_blank_source,
            ignore_same_domains: self.ignore_same_domains,
            strict_same_domains: self.strict_same_domains,
            default_policy: self.default_policy(),
            rules: Vec::new(),
        }
    }

    /// Build the configuration snapshot these preferences describe.
    ///
    /// A broken rule set is logged and replaced by an empty one.
    pub fn to_config(&self) -> Config {
        self.to_config_with_report().0
    }

    /// [`Settings::to_config`], also returning what was dropped.
    pub fn to_config_with_report(&self) -> (Config, RulesReport) {
        let mut report = RulesReport::default();
        let rules = match parse_rules_with_report(&self.custom_rules) {
            Ok(parsed) => {
                report.rejected = parsed.rejected;
                parsed.rules
            }
            Err(err) => {
                log::warn!("{err}; continuing with an empty rule set");
                report.broken = Some(err);
                Vec::new()
            }
        };
        (self.base_config().with_rules(rules), report)
    }
}

/// Parse preferences straight into a configuration snapshot.
pub fn load_config(text: &str) -> Result<Config, SettingsError> {
    Settings::from_json(text).map(|settings| settings.to_config())
}
