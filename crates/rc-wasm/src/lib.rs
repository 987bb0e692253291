//! WebAssembly bindings for Referrer Control

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use wasm_bindgen::prelude::*;

use rc_compiler::parser::{compile_entries, parse_entries};
use rc_compiler::{import_rule_file as import_rules, serialize_rules, Settings};
use rc_core::{
    psl, url::parse_source, url::parse_url, Config, DomainLookup, FallbackSuffixes, PolicyCode,
    Resolver, SharedConfig, SuffixList,
};

static CONFIG: OnceLock<SharedConfig> = OnceLock::new();
static SUFFIX_LIST: RwLock<Option<Arc<SuffixList>>> = RwLock::new(None);

fn shared_config() -> &'static SharedConfig {
    CONFIG.get_or_init(SharedConfig::default)
}

/// Run `f` with the loaded suffix list, or the heuristic when none is loaded.
fn with_lookup<R>(f: impl FnOnce(&dyn DomainLookup) -> R) -> R {
    let list = SUFFIX_LIST
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    match list {
        Some(list) => f(list.as_ref()),
        None => f(&FallbackSuffixes),
    }
}

fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

// =============================================================================
// Configuration
// =============================================================================

/// Replace the whole configuration from a preferences document.
#[wasm_bindgen]
pub fn configure(settings_json: &str) -> Result<(), JsValue> {
    let settings = Settings::from_json(settings_json).map_err(|e| {
        let message = e.to_string();
        warn(&message);
        JsValue::from_str(&message)
    })?;

    if PolicyCode::from_code(settings.default_policy).is_none() {
        warn(&format!("unknown default policy {}, using skip", settings.default_policy));
    }

    let (config, report) = settings.to_config_with_report();
    if let Some(err) = &report.broken {
        warn(&format!("{err}; continuing with an empty rule set"));
    }
    for rejected in &report.rejected {
        warn(&format!("rule #{} dropped: {}", rejected.index, rejected.reason));
    }

    log::debug!("configured with {} rule(s)", config.rules.len());
    shared_config().store(config);
    Ok(())
}

/// Replace the rule set, keeping the other settings.
///
/// A malformed document leaves an empty rule set and is reported once.
#[wasm_bindgen]
pub fn update_rules(rules_json: &str) -> Result<JsValue, JsValue> {
    let entries = match parse_entries(rules_json) {
        Ok(entries) => entries,
        Err(e) => {
            let message = format!("{e}; continuing with an empty rule set");
            warn(&message);
            shared_config().update(|c| Config {
                rules: Vec::new(),
                ..c.clone()
            });
            return Err(JsValue::from_str(&message));
        }
    };

    let parsed = compile_entries(&entries);
    let rejected = js_sys::Array::new();
    for entry in &parsed.rejected {
        let message = format!("rule #{} dropped: {}", entry.index, entry.reason);
        warn(&message);
        rejected.push(&JsValue::from_str(&message));
    }

    let kept = parsed.rules.len();
    shared_config().update(|c| Config {
        rules: parsed.rules,
        ..c.clone()
    });

    let result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&result, &"kept".into(), &JsValue::from(kept as u32));
    let _ = js_sys::Reflect::set(&result, &"rejected".into(), &rejected);
    Ok(result.into())
}

#[wasm_bindgen]
pub fn set_activated(activated: bool) {
    shared_config().update(|c| Config {
        activated,
        ..c.clone()
    });
}

#[wasm_bindgen]
pub fn set_default_policy(code: i32) -> Result<(), JsValue> {
    let policy = PolicyCode::from_code(i64::from(code))
        .ok_or_else(|| JsValue::from_str(&format!("unknown policy code {code}")))?;
    shared_config().update(|c| Config {
        default_policy: policy,
        ..c.clone()
    });
    Ok(())
}

/// Load the Public Suffix List text; until then a heuristic is used.
#[wasm_bindgen]
pub fn load_public_suffix_list(text: &str) -> Result<(), JsValue> {
    let list = SuffixList::parse(text).map_err(|e| {
        let message = e.to_string();
        warn(&message);
        JsValue::from_str(&message)
    })?;
    *SUFFIX_LIST.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(list));
    Ok(())
}

#[wasm_bindgen]
pub fn get_config_info() -> JsValue {
    let config = shared_config().load();
    let has_list = SUFFIX_LIST
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some();

    let result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&result, &"activated".into(), &JsValue::from(config.activated));
    let _ = js_sys::Reflect::set(&result, &"defaultPolicy".into(), &JsValue::from(config.default_policy.code()));
    let _ = js_sys::Reflect::set(&result, &"rules".into(), &JsValue::from(config.rules.len() as u32));
    let _ = js_sys::Reflect::set(&result, &"publicSuffixList".into(), &JsValue::from(has_list));
    result.into()
}

// =============================================================================
// Resolution
// =============================================================================

/// Decide the referrer for one request.
///
/// Returns `undefined` to leave the header untouched, `""` to blank it, or
/// the value to send. An unparseable target is left untouched.
#[wasm_bindgen]
pub fn resolve_referrer(source: Option<String>, target: &str) -> Option<String> {
    let target = parse_url(target)?;
    let source = parse_source(source.as_deref());
    let config = shared_config().load();

    with_lookup(|lookup| {
        Resolver::new(lookup)
            .resolve_config(&config, source.as_ref(), &target)
            .value
    })
}

#[wasm_bindgen]
pub fn effective_domain(url: &str) -> Option<String> {
    let url = parse_url(url)?;
    Some(with_lookup(|lookup| psl::effective_domain(&url, lookup)))
}

#[wasm_bindgen]
pub fn is_same_domain(url1: &str, url2: &str, strict: bool) -> bool {
    match (parse_url(url1), parse_url(url2)) {
        (Some(a), Some(b)) => with_lookup(|lookup| psl::are_same_domain(&a, &b, strict, lookup)),
        _ => false,
    }
}

// =============================================================================
// Rule Files
// =============================================================================

/// Convert an import file (RefControl, exported or bare) into a rule-set
/// string.
#[wasm_bindgen]
pub fn import_rule_file(text: &str) -> Result<String, JsValue> {
    let rules = import_rules(text).map_err(|e| JsValue::from_str(&e.to_string()))?;
    serialize_rules(&rules).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Policy names in code order, for menus.
#[wasm_bindgen]
pub fn policy_names() -> JsValue {
    let names = js_sys::Array::new();
    for policy in PolicyCode::ALL {
        names.push(&JsValue::from_str(policy.name()));
    }
    names.into()
}
