//! Referrer Decision Engine
//!
//! Every outgoing request goes through here. Resolution is a pure
//! function of the two URLs, the rules, the default policy and the flags:
//! no I/O, no locks, no shared state.
//!
//! The result is tri-state:
//! - `None`: leave the header untouched
//! - `Some("")`: send a blank referrer
//! - `Some(value)`: send `value`

use url::Url;

use crate::config::Config;
use crate::psl::{self, DomainLookup};
use crate::types::{PolicyCode, ResolveOptions, Rule, RuleAction};
use crate::url::{host_of, root_url};

// =============================================================================
// Decisions
// =============================================================================

/// Why the resolver produced its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    /// The configuration is switched off
    Deactivated,
    /// No source and blank sources are ignored
    BlankSource,
    /// Source and target are the same site
    SameDomain,
    /// The rule at this index matched
    Rule(usize),
    /// No rule matched
    DefaultPolicy,
}

/// Value plus the reason behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub value: Option<String>,
    pub reason: DecisionReason,
}

impl Decision {
    #[inline]
    fn untouched(reason: DecisionReason) -> Self {
        Self {
            value: None,
            reason,
        }
    }

    /// Index of the rule that decided, if any.
    pub fn rule_index(&self) -> Option<usize> {
        match self.reason {
            DecisionReason::Rule(index) => Some(index),
            _ => None,
        }
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Referrer resolver bound to a registrable-domain lookup.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    domains: &'a dyn DomainLookup,
}

impl<'a> Resolver<'a> {
    pub fn new(domains: &'a dyn DomainLookup) -> Self {
        Self { domains }
    }

    /// Decide the referrer for one request.
    pub fn resolve(
        &self,
        source: Option<&Url>,
        target: &Url,
        rules: &[Rule],
        default_policy: PolicyCode,
        options: ResolveOptions,
    ) -> Option<String> {
        self.decide(source, target, rules, default_policy, options).value
    }

    /// Decide using a configuration snapshot, honouring its master switch.
    pub fn resolve_config(&self, config: &Config, source: Option<&Url>, target: &Url) -> Decision {
        if !config.activated {
            return Decision::untouched(DecisionReason::Deactivated);
        }
        self.decide(
            source,
            target,
            &config.rules,
            config.default_policy,
            config.options(),
        )
    }

    /// Like [`Resolver::resolve`], also reporting what decided.
    pub fn decide(
        &self,
        source: Option<&Url>,
        target: &Url,
        rules: &[Rule],
        default_policy: PolicyCode,
        options: ResolveOptions,
    ) -> Decision {
        let decision = self.decide_inner(source, target, rules, default_policy, options);
        log::debug!(
            "referrer: {} -> {} = {:?} ({:?})",
            source.map(Url::as_str).unwrap_or("<none>"),
            target.as_str(),
            decision.value,
            decision.reason
        );
        decision
    }

    fn decide_inner(
        &self,
        source: Option<&Url>,
        target: &Url,
        rules: &[Rule],
        default_policy: PolicyCode,
        options: ResolveOptions,
    ) -> Decision {
        // 1: never invent a referrer the browser did not have
        if source.is_none() && options.ignore_blank_source {
            return Decision::untouched(DecisionReason::BlankSource);
        }

        // 2: same-site navigation
        if let Some(src) = source {
            if options.ignore_same_domains
                && self.are_same_domain(src, target, options.strict_same_domains)
            {
                return Decision::untouched(DecisionReason::SameDomain);
            }
        }

        // 3: first matching rule wins
        if let Some((index, rule)) = find_rule(rules, source, target) {
            let value = match &rule.action {
                RuleAction::Literal(url) => Some(url.clone()),
                RuleAction::Policy(code) => self.apply_policy(source, target, *code),
            };
            return Decision {
                value,
                reason: DecisionReason::Rule(index),
            };
        }

        // 4: fallback
        Decision {
            value: self.apply_policy(source, target, default_policy),
            reason: DecisionReason::DefaultPolicy,
        }
    }

    /// Compute a built-in policy's value.
    ///
    /// Host-based policies on a URL without a host leave the header alone.
    pub fn apply_policy(&self, source: Option<&Url>, target: &Url, code: PolicyCode) -> Option<String> {
        let src = match source {
            Some(src) => src,
            None if code.needs_source() => return Some(String::new()),
            None => target,
        };
        let scheme = src.scheme();

        match code {
            PolicyCode::Skip => None,
            PolicyCode::Remove => Some(String::new()),
            PolicyCode::SourceHost => host_of(src).map(|host| root_url(scheme, host)),
            PolicyCode::SourceDomain => self.domain_root(scheme, src),
            PolicyCode::TargetHost => host_of(target).map(|host| root_url(scheme, host)),
            PolicyCode::TargetDomain => self.domain_root(scheme, target),
            PolicyCode::TargetUrl => Some(target.as_str().to_string()),
        }
    }

    /// Policy by raw integer code; unknown codes leave the header alone.
    pub fn apply_policy_code(&self, source: Option<&Url>, target: &Url, code: i64) -> Option<String> {
        match PolicyCode::from_code(code) {
            Some(policy) => self.apply_policy(source, target, policy),
            None => {
                log::debug!("unknown policy code {code}, leaving referrer untouched");
                None
            }
        }
    }

    /// Registrable domain of a URL, see [`psl::effective_domain`].
    #[inline]
    pub fn effective_domain(&self, url: &Url) -> String {
        psl::effective_domain(url, self.domains)
    }

    /// Same-site test, see [`psl::are_same_domain`].
    #[inline]
    pub fn are_same_domain(&self, a: &Url, b: &Url, strict: bool) -> bool {
        psl::are_same_domain(a, b, strict, self.domains)
    }

    fn domain_root(&self, scheme: &str, url: &Url) -> Option<String> {
        host_of(url)?;
        Some(root_url(scheme, &self.effective_domain(url)))
    }
}

/// First rule matching the request, with its index.
pub fn find_rule<'r>(rules: &'r [Rule], source: Option<&Url>, target: &Url) -> Option<(usize, &'r Rule)> {
    let source = source.map(Url::as_str);
    let target = target.as_str();
    rules
        .iter()
        .enumerate()
        .find(|(_, rule)| rule.matches(source, target))
}
