//! Subscription plan features as extra capabilities.

use serde_json::Value;

/// Prefix for plan-derived capability names
pub const PLAN_PREFIX: &str = "COMPANY_SUBSCRIPTION_";

/// `leadExport` -> `LEAD_EXPORT`: underscore at each lower-to-upper boundary, then uppercase
pub fn feature_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev_lower = false;
    for c in key.chars() {
        if prev_lower && c.is_ascii_uppercase() {
            out.push('_');
        }
        prev_lower = c.is_ascii_lowercase();
        out.push(c);
    }
    out.to_uppercase()
}

/// Capability names for every plan feature set to `true`
pub fn plan_capabilities(plan: &Value) -> Vec<String> {
    plan_capabilities_with_prefix(plan, PLAN_PREFIX)
}

pub fn plan_capabilities_with_prefix(plan: &Value, prefix: &str) -> Vec<String> {
    let Some(features) = plan.as_object() else { return Vec::new() };
    features
        .iter()
        .filter(|(_, v)| v.as_bool() == Some(true))
        .map(|(k, _)| format!("{prefix}{}", feature_key(k)))
        .collect()
}
