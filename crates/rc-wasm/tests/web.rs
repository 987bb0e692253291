//! Browser-side checks, run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

use rc_wasm::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_configure_and_resolve() {
    configure(r#"{"defaultPolicy": 4, "customRules": "[{\"target\": \"*.tracker.com\", \"value\": 0}]"}"#).unwrap();

    let source = Some("https://shop.example.com/cart".to_string());
    assert_eq!(resolve_referrer(source.clone(), "https://ads.tracker.com/pixel"), None);
    assert_eq!(
        resolve_referrer(source, "https://cdn.other.net/lib.js").as_deref(),
        Some("https://cdn.other.net/")
    );

    // Blank sources are ignored by default
    assert_eq!(resolve_referrer(None, "https://cdn.other.net/lib.js"), None);
}

#[wasm_bindgen_test]
fn test_deactivated() {
    configure("{}").unwrap();
    set_activated(false);
    assert_eq!(
        resolve_referrer(Some("https://a.com/".into()), "https://b.org/"),
        None
    );
    set_activated(true);
    assert_eq!(
        resolve_referrer(Some("https://a.com/".into()), "https://b.org/").as_deref(),
        Some("")
    );
}

#[wasm_bindgen_test]
fn test_domains() {
    assert_eq!(effective_domain("https://a.b.example.co.uk/").as_deref(), Some("example.co.uk"));
    assert!(is_same_domain("http://a.example.com/", "http://b.example.com/", false));
    assert!(!is_same_domain("http://a.example.com/", "http://b.example.com/", true));
}

#[wasm_bindgen_test]
fn test_import_refcontrol() {
    let rules = import_rule_file("[RefControl]\nexample.com=@NORMAL\n").unwrap();
    assert!(rules.contains("RefControl: example.com=@NORMAL"));
    assert!(set_default_policy(7).is_err());
}
