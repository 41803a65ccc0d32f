//! Selection state for one bundle product instance.
//!
//! A selection maps a component key to the chosen items in that component,
//! each with a positive quantity. Absence encodes "not selected"; a quantity
//! of zero is never stored.

use std::collections::BTreeMap;
use std::fmt;

use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::catalog::Component;

/// Query parameter name a preset selection is carried in.
pub const BUNDLE_CONFIG_PARAM: &str = "bundle_config";

/// One chosen item inside a component: either a plain option, or a concrete
/// child variant of a parent-product option.
///
/// The wire form is `"<optionId>"` or `"<parentId>:<childId>"`. Ids containing
/// `:` are rejected at the catalog ingestion boundary, so parsing the wire
/// form is unambiguous.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SelectionKey {
    Simple(String),
    Variant { parent: String, child: String },
}

impl SelectionKey {
    pub fn simple(id: impl Into<String>) -> Self {
        Self::Simple(id.into())
    }

    pub fn variant(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::Variant {
            parent: parent.into(),
            child: child.into(),
        }
    }

    /// Parses the wire form. Never fails: anything without a separator is a
    /// simple key.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((parent, child)) => Self::Variant {
                parent: parent.to_string(),
                child: child.to_string(),
            },
            None => Self::Simple(raw.to_string()),
        }
    }

    /// The id the remote configuration endpoint expects: the child id for a
    /// variant, the option id otherwise.
    pub fn api_id(&self) -> &str {
        match self {
            Self::Simple(id) => id,
            Self::Variant { child, .. } => child,
        }
    }

    /// The id of the component option this key belongs to (the parent id for
    /// a variant). Used to look up per-option quantity bounds.
    pub fn option_id(&self) -> &str {
        match self {
            Self::Simple(id) => id,
            Self::Variant { parent, .. } => parent,
        }
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(id) => write!(f, "{id}"),
            Self::Variant { parent, child } => write!(f, "{parent}:{child}"),
        }
    }
}

impl Serialize for SelectionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SelectionKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Mapping componentKey -> (selectionKey -> quantity).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionState {
    components: BTreeMap<String, BTreeMap<SelectionKey, u64>>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn component(&self, key: &str) -> Option<&BTreeMap<SelectionKey, u64>> {
        self.components.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeMap<SelectionKey, u64>)> {
        self.components.iter()
    }

    pub fn quantity(&self, component_key: &str, key: &SelectionKey) -> u64 {
        self.components
            .get(component_key)
            .and_then(|options| options.get(key))
            .copied()
            .unwrap_or(0)
    }

    /// Sets a single entry. A zero quantity removes the entry, and an emptied
    /// component disappears from the state.
    pub fn set(&mut self, component_key: &str, key: SelectionKey, quantity: u64) {
        if quantity > 0 {
            self.components
                .entry(component_key.to_string())
                .or_default()
                .insert(key, quantity);
            return;
        }
        if let Some(options) = self.components.get_mut(component_key) {
            options.remove(&key);
            if options.is_empty() {
                self.components.remove(component_key);
            }
        }
    }

    /// Applies a selection-change event, the sole mutator used by the UI
    /// layer. For a single-select component (`max == 1`), selecting a new
    /// item with a positive quantity clears every other item in that
    /// component.
    pub fn apply(
        &mut self,
        component: Option<&Component>,
        component_key: &str,
        option_id: &str,
        quantity: u64,
        child_id: Option<&str>,
    ) {
        let key = match child_id {
            Some(child) => SelectionKey::variant(option_id, child),
            None => SelectionKey::simple(option_id),
        };
        let single_select = component.and_then(|c| c.max) == Some(1);
        if single_select && quantity > 0 {
            self.components
                .insert(component_key.to_string(), BTreeMap::from([(key, quantity)]));
            return;
        }
        self.set(component_key, key, quantity);
    }

    /// Encodes the state as base64 JSON, suitable for a URL query parameter.
    pub fn encode_preset(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(json)
    }

    /// Decodes a preset produced by [`encode_preset`](Self::encode_preset).
    /// Malformed input is an error the caller treats as "no preset".
    pub fn decode_preset(raw: &str) -> Result<Self, PresetError> {
        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(raw.as_bytes())?;
        Ok(serde_json::from_slice(&decoded)?)
    }
}

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("invalid base64 in preset: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("invalid preset JSON: {0}")]
    Json(#[from] serde_json::Error),
}
