//! Conversion between the internal selection state and the flat format the
//! remote configuration endpoint expects.

use std::collections::BTreeMap;

use crate::selection::{SelectionKey, SelectionState};

/// Flat mapping componentKey -> (productId -> quantity), as sent over the
/// wire. `BTreeMap` keeps the canonical form stable across runs.
pub type ApiSelections = BTreeMap<String, BTreeMap<String, u64>>;

/// Cross-cutting form fields carried alongside component selections; never
/// sent to the configuration endpoint.
pub const RESERVED_FORM_FIELDS: &[&str] = &["BundleConfiguration", "ConfiguredBundleId"];

/// Rewrites internal selection keys into the child-only wire format: a
/// `parent:child` key contributes only the child id, a simple key passes
/// through unchanged. Reserved form fields are dropped entirely.
pub fn to_api_format(state: &SelectionState) -> ApiSelections {
    let mut api = ApiSelections::new();
    for (component_key, options) in state.iter() {
        if RESERVED_FORM_FIELDS.contains(&component_key.as_str()) {
            continue;
        }
        let entry = api.entry(component_key.clone()).or_default();
        for (key, quantity) in options {
            entry.insert(key.api_id().to_string(), *quantity);
        }
    }
    api
}

/// Stable serialized form used for equality checks and duplicate suppression.
pub fn canonical_form(selections: &ApiSelections) -> String {
    serde_json::to_string(selections).unwrap_or_default()
}

/// Exact equality against the server's last confirmed default configuration:
/// same component keys, same option ids, same quantities. No default means no
/// match.
pub fn matches_default(selections: &ApiSelections, default: Option<&ApiSelections>) -> bool {
    default.map_or(false, |default| default == selections)
}

/// Normalizes a server-supplied `selected_options` mapping, whose quantities
/// may arrive in a wide (64-bit) integer representation. Values that are not
/// non-negative integers are dropped with a warning.
pub fn normalize_selected_options(
    raw: &BTreeMap<String, BTreeMap<String, serde_json::Number>>,
) -> ApiSelections {
    let mut normalized = ApiSelections::new();
    for (component_key, options) in raw {
        let entry = normalized.entry(component_key.clone()).or_default();
        for (option_id, quantity) in options {
            match quantity.as_u64() {
                Some(quantity) => {
                    entry.insert(option_id.clone(), quantity);
                }
                None => {
                    tracing::warn!(
                        component = %component_key,
                        option = %option_id,
                        value = %quantity,
                        "dropping non-integer quantity from server configuration"
                    );
                }
            }
        }
    }
    normalized
}

/// Lifts a flat server configuration back into a selection state. Server
/// configurations only carry plain option ids, so every key is simple.
pub fn state_from_flat(config: &ApiSelections) -> SelectionState {
    let mut state = SelectionState::new();
    for (component_key, options) in config {
        for (option_id, quantity) in options {
            state.set(component_key, SelectionKey::simple(option_id), *quantity);
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_id_dropped_in_api_format() {
        let mut state = SelectionState::new();
        state.set("c1", SelectionKey::simple("opt1"), 2);
        state.set("c1", SelectionKey::variant("parentA", "childB"), 1);
        let api = to_api_format(&state);
        assert_eq!(api["c1"]["opt1"], 2);
        assert_eq!(api["c1"]["childB"], 1);
        assert!(!api["c1"].contains_key("parentA"));
    }

    #[test]
    fn test_reserved_form_fields_stripped() {
        let mut state = SelectionState::new();
        state.set("c1", SelectionKey::simple("o1"), 1);
        state.set("BundleConfiguration", SelectionKey::simple("x"), 1);
        state.set("ConfiguredBundleId", SelectionKey::simple("y"), 1);
        let api = to_api_format(&state);
        assert_eq!(api.len(), 1);
        assert!(api.contains_key("c1"));
    }

    #[test]
    fn test_canonical_form_is_stable() {
        let mut a = ApiSelections::new();
        a.entry("c2".into()).or_default().insert("o3".into(), 1);
        a.entry("c1".into()).or_default().insert("o1".into(), 2);
        let mut b = ApiSelections::new();
        b.entry("c1".into()).or_default().insert("o1".into(), 2);
        b.entry("c2".into()).or_default().insert("o3".into(), 1);
        assert_eq!(canonical_form(&a), canonical_form(&b));
    }

    #[test]
    fn test_matches_default_requires_exact_equality() {
        let mut current = ApiSelections::new();
        current.entry("c1".into()).or_default().insert("o1".into(), 1);

        assert!(!matches_default(&current, None));
        assert!(matches_default(&current, Some(&current.clone())));

        let mut different_qty = current.clone();
        different_qty.get_mut("c1").unwrap().insert("o1".into(), 2);
        assert!(!matches_default(&current, Some(&different_qty)));

        let mut extra_component = current.clone();
        extra_component.entry("c2".into()).or_default().insert("o2".into(), 1);
        assert!(!matches_default(&current, Some(&extra_component)));
    }

    #[test]
    fn test_normalize_wide_integers() {
        let mut raw: BTreeMap<String, BTreeMap<String, serde_json::Number>> = BTreeMap::new();
        let inner = raw.entry("c1".into()).or_default();
        inner.insert("o1".into(), serde_json::Number::from(999_999_999_999_999_u64));
        inner.insert("o2".into(), serde_json::Number::from(-3));
        let normalized = normalize_selected_options(&raw);
        assert_eq!(normalized["c1"].get("o1"), Some(&999_999_999_999_999));
        assert!(!normalized["c1"].contains_key("o2"));
    }

    #[test]
    fn test_state_from_flat_round_trip() {
        let mut flat = ApiSelections::new();
        flat.entry("c1".into()).or_default().insert("o1".into(), 2);
        let state = state_from_flat(&flat);
        assert_eq!(to_api_format(&state), flat);
    }
}
