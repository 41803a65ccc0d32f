//! Resolution of per-axis variation choices to a concrete child product.

use std::collections::HashMap;

use serde_json::Value;

use crate::products::{ChildProduct, ParentProductInfo};

/// Maps a set of per-axis choices (axis id -> choice name, e.g.
/// `Size -> "Small"`) to the child product they identify.
///
/// Returns `None` until every axis declared on the parent has a choice; a
/// partial selection never matches. Children that are unreachable through the
/// variation matrix are skipped. The first matching child in declaration
/// order wins.
pub fn find_matching_variant<'a>(
    axis_selections: &HashMap<String, String>,
    parent: &'a ParentProductInfo,
) -> Option<&'a ChildProduct> {
    if parent.children.is_empty() || axis_selections.is_empty() {
        return None;
    }
    if axis_selections.len() != parent.variations.len() {
        return None;
    }

    parent.children.iter().find(|child| {
        let Some(path) = choice_path_for_child(
            &parent.variation_matrix,
            &child.id,
            parent.variations.len(),
        ) else {
            return false;
        };
        axis_selections.iter().all(|(axis_id, chosen_name)| {
            let axis = parent.variations.iter().find(|axis| &axis.id == axis_id);
            let choice = axis.and_then(|axis| {
                axis.choices.iter().find(|choice| &choice.name == chosen_name)
            });
            choice.map_or(false, |choice| path.contains(&choice.id))
        })
    })
}

/// Depth-first search for the child id as a leaf of the variation matrix,
/// returning the sequence of choice ids leading to it. Recursion is bounded
/// by the declared number of axes so malformed matrices cannot run away.
fn choice_path_for_child(matrix: &Value, child_id: &str, max_depth: usize) -> Option<Vec<String>> {
    fn walk(entry: &Value, child_id: &str, remaining: usize, path: &mut Vec<String>) -> bool {
        match entry {
            Value::String(leaf) => leaf == child_id,
            Value::Object(map) if remaining > 0 => {
                for (choice_id, nested) in map {
                    path.push(choice_id.clone());
                    if walk(nested, child_id, remaining - 1, path) {
                        return true;
                    }
                    path.pop();
                }
                false
            }
            _ => false,
        }
    }

    let mut path = Vec::with_capacity(max_depth);
    if walk(matrix, child_id, max_depth, &mut path) {
        Some(path)
    } else {
        None
    }
}
