//! WebAssembly bindings for FocusGate
//!
//! The extension host calls these once per navigation. List arguments are
//! JS arrays whose entries may be strings or `{pattern}` / `{url}` objects.

use wasm_bindgen::prelude::*;
use fg_core::{
    lint,
    pattern::PatternKind,
    types::{RuleMatch, Verdict},
    url::is_internal_url,
    CompiledPolicy, Diagnostic, Mode, Policy,
};

#[wasm_bindgen]
pub fn decide(
    url: &str,
    allow_patterns: JsValue,
    deny_patterns: JsValue,
    allow_keywords: JsValue,
    deny_keywords: JsValue,
    mode: &str,
    is_enabled: bool,
) -> JsValue {
    let verdict = fg_core::decide(
        url,
        &entries_from_js(&allow_patterns),
        &entries_from_js(&deny_patterns),
        &entries_from_js(&allow_keywords),
        &entries_from_js(&deny_keywords),
        mode,
        is_enabled,
    );
    verdict_to_js(&verdict)
}

#[wasm_bindgen]
pub fn should_block(url: &str, policy: JsValue) -> bool {
    fg_core::decide_policy(url, &policy_from_js(&policy)).blocked
}

#[wasm_bindgen]
pub fn explain(url: &str, policy: JsValue) -> JsValue {
    explanation_to_js(&CompiledPolicy::compile(&policy_from_js(&policy)), url)
}

#[wasm_bindgen]
pub fn lint_policy(policy: JsValue) -> JsValue {
    let diagnostics = lint(&policy_from_js(&policy));
    let out = js_sys::Array::new();
    for d in &diagnostics {
        out.push(&diagnostic_to_js(d));
    }
    out.into()
}

#[wasm_bindgen(js_name = parse_pattern)]
pub fn parse_pattern_js(pattern: &str) -> JsValue {
    let parsed = match fg_core::parse_pattern(pattern) {
        Ok(parsed) => parsed,
        Err(_) => return JsValue::NULL,
    };

    let result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&result, &"raw".into(), &JsValue::from_str(&parsed.raw));
    let _ = js_sys::Reflect::set(&result, &"isRawRegex".into(), &JsValue::from(parsed.is_raw_regex()));
    let _ = js_sys::Reflect::set(
        &result,
        &"specificity".into(),
        &JsValue::from(fg_core::calculate_specificity(&parsed)),
    );
    if let Some(d) = &parsed.degradation {
        let _ = js_sys::Reflect::set(&result, &"warning".into(), &JsValue::from_str(&d.to_string()));
    }

    if let PatternKind::Url(p) = &parsed.kind {
        let protocol = p.protocol.as_deref().map_or(JsValue::NULL, JsValue::from_str);
        let resource = p.resource_segment.as_deref().map_or(JsValue::NULL, JsValue::from_str);
        let _ = js_sys::Reflect::set(&result, &"protocol".into(), &protocol);
        let _ = js_sys::Reflect::set(&result, &"hostname".into(), &JsValue::from_str(&p.hostname));
        let _ = js_sys::Reflect::set(&result, &"isWildcardSubdomain".into(), &JsValue::from(p.is_wildcard_subdomain));
        let _ = js_sys::Reflect::set(&result, &"baseDomain".into(), &JsValue::from_str(&p.base_domain));
        let _ = js_sys::Reflect::set(&result, &"path".into(), &JsValue::from_str(&p.path));
        let _ = js_sys::Reflect::set(&result, &"hasWildcardSuffix".into(), &JsValue::from(p.has_wildcard_suffix));
        let _ = js_sys::Reflect::set(&result, &"isExactAnchor".into(), &JsValue::from(p.is_exact_anchor));
        let _ = js_sys::Reflect::set(&result, &"resourceSegment".into(), &resource);
    }

    result.into()
}

#[wasm_bindgen(js_name = calculate_specificity)]
pub fn calculate_specificity_js(pattern: &str) -> Option<u32> {
    fg_core::parse_pattern(pattern)
        .ok()
        .map(|parsed| fg_core::calculate_specificity(&parsed))
}

#[wasm_bindgen(js_name = is_internal_url)]
pub fn is_internal_url_js(url: &str) -> bool {
    is_internal_url(url)
}

/// A policy compiled once and evaluated for many navigations.
#[wasm_bindgen]
pub struct PolicyHandle {
    compiled: CompiledPolicy,
}

#[wasm_bindgen]
impl PolicyHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(policy: JsValue) -> PolicyHandle {
        PolicyHandle {
            compiled: CompiledPolicy::compile(&policy_from_js(&policy)),
        }
    }

    pub fn evaluate(&self, url: &str) -> JsValue {
        verdict_to_js(&self.compiled.evaluate(url))
    }

    pub fn explain(&self, url: &str) -> JsValue {
        explanation_to_js(&self.compiled, url)
    }

    #[wasm_bindgen(getter)]
    pub fn mode(&self) -> String {
        self.compiled.mode.to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn enabled(&self) -> bool {
        self.compiled.enabled
    }
}

// =============================================================================
// JS -> Rust
// =============================================================================

/// Normalize a JS array of strings / `{pattern}` / `{url}` objects.
fn entries_from_js(value: &JsValue) -> Vec<String> {
    if value.is_undefined() || value.is_null() {
        return Vec::new();
    }
    js_sys::Array::from(value)
        .iter()
        .filter_map(|entry| entry_to_string(&entry))
        .collect()
}

fn entry_to_string(entry: &JsValue) -> Option<String> {
    if let Some(text) = entry.as_string() {
        return Some(text);
    }
    if !entry.is_object() {
        return None;
    }
    ["pattern", "url"].iter().find_map(|key| {
        js_sys::Reflect::get(entry, &JsValue::from_str(key))
            .ok()
            .and_then(|value| value.as_string())
    })
}

fn get_field(object: &JsValue, names: &[&str]) -> JsValue {
    for name in names {
        if let Ok(value) = js_sys::Reflect::get(object, &JsValue::from_str(name)) {
            if !value.is_undefined() {
                return value;
            }
        }
    }
    JsValue::UNDEFINED
}

fn policy_from_js(value: &JsValue) -> Policy {
    if !value.is_object() {
        return Policy::default();
    }

    let enabled = get_field(value, &["enabled", "isEnabled"])
        .as_bool()
        .unwrap_or(true);
    let mode = get_field(value, &["mode"])
        .as_string()
        .map_or(Mode::default(), |m| Mode::from_name_or_default(&m));

    let mut policy = Policy::new(mode)
        .with_allow(entries_from_js(&get_field(value, &["allow", "allowPatterns", "allowList"])))
        .with_deny(entries_from_js(&get_field(value, &["deny", "denyPatterns", "denyList"])))
        .with_allow_keywords(entries_from_js(&get_field(value, &["allowKeywords"])))
        .with_deny_keywords(entries_from_js(&get_field(value, &["denyKeywords"])));
    policy.enabled = enabled;
    policy
}

// =============================================================================
// Rust -> JS
// =============================================================================

fn verdict_to_js(verdict: &Verdict) -> JsValue {
    let result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&result, &"blocked".into(), &JsValue::from(verdict.blocked));
    let _ = js_sys::Reflect::set(&result, &"reason".into(), &JsValue::from_str(&verdict.reason.to_string()));

    if let Some(pattern) = &verdict.matched_pattern {
        let _ = js_sys::Reflect::set(&result, &"matchedPattern".into(), &JsValue::from_str(pattern));
    }
    if let Some(specificity) = verdict.specificity {
        let _ = js_sys::Reflect::set(&result, &"specificity".into(), &JsValue::from(specificity));
    }

    result.into()
}

fn rule_match_to_js(m: &RuleMatch) -> JsValue {
    let result = js_sys::Object::new();
    let list = m.list.as_str();
    let source = m.source.as_str();
    let _ = js_sys::Reflect::set(&result, &"list".into(), &JsValue::from_str(list));
    let _ = js_sys::Reflect::set(&result, &"source".into(), &JsValue::from_str(source));
    let _ = js_sys::Reflect::set(&result, &"literal".into(), &JsValue::from_str(&m.literal));
    let _ = js_sys::Reflect::set(&result, &"specificity".into(), &JsValue::from(m.specificity));
    result.into()
}

fn explanation_to_js(compiled: &CompiledPolicy, url: &str) -> JsValue {
    let explanation = compiled.explain(url);
    let result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&result, &"verdict".into(), &verdict_to_js(&explanation.verdict));

    let matches = js_sys::Array::new();
    for m in &explanation.matches {
        matches.push(&rule_match_to_js(m));
    }
    let _ = js_sys::Reflect::set(&result, &"matches".into(), &matches);
    if let Some(warning) = &explanation.warning {
        let _ = js_sys::Reflect::set(&result, &"warning".into(), &JsValue::from_str(warning));
    }

    result.into()
}

fn diagnostic_to_js(d: &Diagnostic) -> JsValue {
    let result = js_sys::Object::new();
    let list = d.list.as_str();
    let source = d.source.as_str();
    let _ = js_sys::Reflect::set(&result, &"list".into(), &JsValue::from_str(list));
    let _ = js_sys::Reflect::set(&result, &"source".into(), &JsValue::from_str(source));
    let _ = js_sys::Reflect::set(&result, &"index".into(), &JsValue::from(d.index as u32));
    let _ = js_sys::Reflect::set(&result, &"entry".into(), &JsValue::from_str(&d.entry));
    let _ = js_sys::Reflect::set(&result, &"message".into(), &JsValue::from_str(&d.message));
    result.into()
}
