//! Business-rule validation of a selection against component constraints.
//!
//! Validation never fails as an error: violations are first-class return
//! values rendered near the affected component.

use crate::catalog::Component;
use crate::selection::SelectionState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Checks every component's min/max selection constraints and every selected
/// option's quantity bounds. Pure: identical inputs produce identical output.
///
/// Errors follow component declaration order, with component-level messages
/// before option-level ones.
pub fn validate(components: &[Component], state: &SelectionState) -> ValidationResult {
    let mut errors = Vec::new();

    for component in components {
        let selections = state.component(&component.key);
        let selected_count: u64 = selections
            .map(|options| options.values().sum())
            .unwrap_or(0);
        let name = component.display_name();

        if let Some(min) = component.min {
            if selected_count < min {
                if min == 1 {
                    errors.push(format!("Please select one option for {name}"));
                } else if component.max == Some(min) && selected_count == 0 {
                    errors.push(format!("Please select exactly {min} options for {name}"));
                } else {
                    let remaining = min - selected_count;
                    if remaining == 1 {
                        errors.push(format!(
                            "Please select 1 more option for {name} (minimum: {min})"
                        ));
                    } else {
                        errors.push(format!(
                            "Please select {remaining} more options for {name} (minimum: {min})"
                        ));
                    }
                }
            }
        }

        if let Some(max) = component.max {
            if selected_count > max {
                let excess = selected_count - max;
                if excess == 1 {
                    errors.push(format!(
                        "Please remove 1 option from {name} (maximum: {max})"
                    ));
                } else {
                    errors.push(format!(
                        "Please remove {excess} options from {name} (maximum: {max})"
                    ));
                }
            }
        }

        let Some(selections) = selections else {
            continue;
        };
        for option in &component.options {
            for (key, quantity) in selections {
                if key.option_id() != option.id {
                    continue;
                }
                if let Some(min) = option.min {
                    if *quantity < min {
                        errors.push(format!(
                            "{} requires at least {min} (currently: {quantity})",
                            option.id
                        ));
                    }
                }
                if let Some(max) = option.max {
                    if *quantity > max {
                        errors.push(format!(
                            "{} allows maximum {max} (currently: {quantity})",
                            option.id
                        ));
                    }
                }
            }
        }
    }

    ValidationResult { is_valid: errors.is_empty(), errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ComponentOption;
    use crate::selection::SelectionKey;

    fn option(id: &str, min: Option<u64>, max: Option<u64>) -> ComponentOption {
        ComponentOption {
            id: id.to_string(),
            quantity: None,
            min,
            max,
            is_default: false,
            sort_order: None,
        }
    }

    fn component(
        key: &str,
        min: Option<u64>,
        max: Option<u64>,
        options: Vec<ComponentOption>,
    ) -> Component {
        Component {
            key: key.to_string(),
            name: Some(key.to_uppercase()),
            min,
            max,
            sort_order: None,
            options,
        }
    }

    #[test]
    fn test_single_required_component_message() {
        let components = vec![component("meal", Some(1), Some(1), vec![])];
        let result = validate(&components, &SelectionState::new());
        assert!(!result.is_valid);
        assert_eq!(result.errors, ["Please select one option for MEAL"]);
    }

    #[test]
    fn test_exact_bounds_shortfall_and_excess() {
        let components = vec![component("sides", Some(2), Some(2), vec![])];

        let mut one = SelectionState::new();
        one.set("sides", SelectionKey::simple("o1"), 1);
        let result = validate(&components, &one);
        assert_eq!(
            result.errors,
            ["Please select 1 more option for SIDES (minimum: 2)"]
        );

        let mut two = SelectionState::new();
        two.set("sides", SelectionKey::simple("o1"), 2);
        assert!(validate(&components, &two).is_valid);

        let mut three = SelectionState::new();
        three.set("sides", SelectionKey::simple("o1"), 3);
        let result = validate(&components, &three);
        assert_eq!(
            result.errors,
            ["Please remove 1 option from SIDES (maximum: 2)"]
        );
    }

    #[test]
    fn test_empty_exact_component_message() {
        let components = vec![component("sides", Some(2), Some(2), vec![])];
        let result = validate(&components, &SelectionState::new());
        assert_eq!(result.errors, ["Please select exactly 2 options for SIDES"]);
    }

    #[test]
    fn test_plural_shortfall_includes_minimum() {
        let components = vec![component("sides", Some(3), None, vec![])];
        let result = validate(&components, &SelectionState::new());
        assert_eq!(
            result.errors,
            ["Please select 3 more options for SIDES (minimum: 3)"]
        );
    }

    #[test]
    fn test_option_quantity_bounds() {
        let components = vec![component(
            "c1",
            None,
            None,
            vec![option("o1", Some(2), Some(4))],
        )];

        let mut low = SelectionState::new();
        low.set("c1", SelectionKey::simple("o1"), 1);
        let result = validate(&components, &low);
        assert_eq!(result.errors, ["o1 requires at least 2 (currently: 1)"]);

        let mut high = SelectionState::new();
        high.set("c1", SelectionKey::simple("o1"), 5);
        let result = validate(&components, &high);
        assert_eq!(result.errors, ["o1 allows maximum 4 (currently: 5)"]);
    }

    #[test]
    fn test_variant_quantity_counts_against_parent_option() {
        let components = vec![component(
            "c1",
            None,
            None,
            vec![option("parentA", None, Some(1))],
        )];
        let mut state = SelectionState::new();
        state.set("c1", SelectionKey::variant("parentA", "childB"), 2);
        let result = validate(&components, &state);
        assert_eq!(result.errors, ["parentA allows maximum 1 (currently: 2)"]);
    }

    #[test]
    fn test_errors_follow_declaration_order() {
        let components = vec![
            component("first", Some(1), Some(1), vec![option("o1", Some(2), None)]),
            component("second", Some(1), Some(1), vec![]),
        ];
        let mut state = SelectionState::new();
        // Satisfies the count for "first" but violates o1's own minimum.
        state.set("first", SelectionKey::simple("o1"), 1);
        let result = validate(&components, &state);
        assert_eq!(
            result.errors,
            [
                "o1 requires at least 2 (currently: 1)",
                "Please select one option for SECOND",
            ]
        );
    }

    #[test]
    fn test_validation_is_deterministic() {
        let components = vec![component("c1", Some(2), Some(2), vec![])];
        let mut state = SelectionState::new();
        state.set("c1", SelectionKey::simple("o1"), 1);
        assert_eq!(validate(&components, &state), validate(&components, &state));
    }
}
