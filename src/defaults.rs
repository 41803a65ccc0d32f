//! Initial selection resolution.
//!
//! The priority between an explicit preset, the server's last-known
//! configuration and an empty base is decided by the session; this module
//! only fills required components that are still empty.

use crate::catalog::Component;
use crate::selection::{SelectionKey, SelectionState};

/// Returns the base selection with every required-but-empty component
/// auto-filled: the option flagged as default wins, otherwise the first
/// option in declaration order, at that option's default quantity.
///
/// A required component with no options is left empty; the validator reports
/// it. The function is pure, so resolving twice yields the same state.
pub fn resolve_defaults(components: &[Component], existing: Option<&SelectionState>) -> SelectionState {
    let mut state = existing.cloned().unwrap_or_default();

    for component in components {
        let has_selection = state
            .component(&component.key)
            .map_or(false, |options| !options.is_empty());
        if has_selection || !component.is_required() {
            continue;
        }
        let chosen = component
            .options
            .iter()
            .find(|option| option.is_default)
            .or_else(|| component.options.first());
        if let Some(option) = chosen {
            state.set(
                &component.key,
                SelectionKey::simple(&option.id),
                option.default_quantity(),
            );
        }
    }

    state
}
