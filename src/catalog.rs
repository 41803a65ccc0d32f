//! Ingestion boundary for vendor bundle products.
//!
//! The raw DTOs mirror the vendor JSON shape; everything past this module
//! works with the normalized [`BundleCatalog`] types. Validation and
//! wide-integer normalization happen here, once, instead of being scattered
//! through the core.

use std::collections::BTreeMap;

use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::api::{self, ApiSelections};
use crate::error::{BundleError, Result};
use crate::pricing::PricingType;

/// Product type marker the vendor uses for composite products.
const BUNDLE_PRODUCT_TYPE: &str = "bundle";

// ---------------------------------------------------------------------------
// Raw vendor shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RawBundleProduct {
    pub id: String,
    #[serde(default)]
    pub attributes: RawAttributes,
    #[serde(default)]
    pub meta: RawMeta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAttributes {
    pub sku: Option<String>,
    #[serde(default)]
    pub components: BTreeMap<String, RawComponent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMeta {
    #[serde(default)]
    pub product_types: Vec<String>,
    pub bundle_configuration: Option<RawBundleConfiguration>,
    pub display_price: Option<RawDisplayPrice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawBundleConfiguration {
    #[serde(default)]
    pub selected_options: BTreeMap<String, BTreeMap<String, serde_json::Number>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDisplayPrice {
    pub without_tax: Option<RawFormattedPrice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFormattedPrice {
    pub formatted: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "component_bounds"))]
pub struct RawComponent {
    pub name: Option<String>,
    #[serde(default)]
    #[validate]
    pub options: Vec<RawComponentOption>,
    #[validate(range(min = 0))]
    pub min: Option<i64>,
    #[validate(range(min = 0))]
    pub max: Option<i64>,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "option_bounds"))]
pub struct RawComponentOption {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[validate(range(min = 0))]
    pub quantity: Option<i64>,
    #[validate(range(min = 0))]
    pub min: Option<i64>,
    #[validate(range(min = 0))]
    pub max: Option<i64>,
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub default: Option<bool>,
}

fn component_bounds(component: &RawComponent) -> std::result::Result<(), ValidationError> {
    if let (Some(min), Some(max)) = (component.min, component.max) {
        if min > max {
            return Err(ValidationError::new("min_greater_than_max"));
        }
    }
    Ok(())
}

fn option_bounds(option: &RawComponentOption) -> std::result::Result<(), ValidationError> {
    if let (Some(min), Some(max)) = (option.min, option.max) {
        if min > max {
            return Err(ValidationError::new("min_greater_than_max"));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Normalized catalog
// ---------------------------------------------------------------------------

/// A configurable slot in a composite product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub key: String,
    pub name: Option<String>,
    /// Unset means optional (effective 0).
    pub min: Option<u64>,
    /// Unset means unbounded.
    pub max: Option<u64>,
    pub sort_order: Option<i64>,
    pub options: Vec<ComponentOption>,
}

impl Component {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }

    pub fn is_required(&self) -> bool {
        self.min.map_or(false, |min| min > 0)
    }
}

/// One selectable item within a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentOption {
    pub id: String,
    pub quantity: Option<u64>,
    pub min: Option<u64>,
    pub max: Option<u64>,
    pub is_default: bool,
    pub sort_order: Option<i64>,
}

impl ComponentOption {
    /// Quantity used when this option is auto-selected. Unset or zero falls
    /// back to 1.
    pub fn default_quantity(&self) -> u64 {
        self.quantity.filter(|quantity| *quantity > 0).unwrap_or(1)
    }
}

/// Read-only snapshot of a bundle product, fetched once and not mutated by
/// the core.
#[derive(Debug, Clone)]
pub struct BundleCatalog {
    pub product_id: String,
    /// Components in display order (`sort_order` ascending, unset last).
    pub components: Vec<Component>,
    /// The server's last-confirmed configuration, wide ints normalized.
    pub default_configuration: Option<ApiSelections>,
    pub pricing: PricingType,
    pub display_price: Option<String>,
}

impl BundleCatalog {
    /// Builds a catalog from a raw vendor product. Fails when the product is
    /// not a bundle or a component violates its declared constraints.
    pub fn from_product(raw: &RawBundleProduct) -> Result<Self> {
        if raw.meta.product_types.first().map(String::as_str) != Some(BUNDLE_PRODUCT_TYPE) {
            return Err(BundleError::NotABundle);
        }

        let mut components = Vec::with_capacity(raw.attributes.components.len());
        for (key, raw_component) in &raw.attributes.components {
            components.push(normalize_component(key, raw_component)?);
        }
        sort_by_order(&mut components, |component| component.sort_order);

        let default_configuration = raw
            .meta
            .bundle_configuration
            .as_ref()
            .map(|config| api::normalize_selected_options(&config.selected_options));

        let pricing = if raw.attributes.sku.is_some() {
            PricingType::Fixed
        } else {
            PricingType::Cumulative
        };

        Ok(Self {
            product_id: raw.id.clone(),
            components,
            default_configuration,
            pricing,
            display_price: formatted_price(&raw.meta),
        })
    }

    /// Convenience entry point for an untyped vendor payload.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        if value.is_null() {
            return Err(BundleError::MissingProductData);
        }
        let raw: RawBundleProduct = serde_json::from_value(value.clone())
            .map_err(|err| BundleError::MalformedProduct(err.to_string()))?;
        Self::from_product(&raw)
    }

    pub fn component(&self, key: &str) -> Option<&Component> {
        self.components.iter().find(|component| component.key == key)
    }
}

pub(crate) fn formatted_price(meta: &RawMeta) -> Option<String> {
    meta.display_price
        .as_ref()
        .and_then(|price| price.without_tax.as_ref())
        .and_then(|price| price.formatted.clone())
}

fn normalize_component(key: &str, raw: &RawComponent) -> Result<Component> {
    raw.validate().map_err(|err| BundleError::InvalidComponent {
        key: key.to_string(),
        reason: err.to_string(),
    })?;

    let mut options = Vec::with_capacity(raw.options.len());
    for raw_option in &raw.options {
        let Some(id) = raw_option.id.clone() else {
            continue;
        };
        if id.contains(':') {
            return Err(BundleError::ReservedSeparator(id));
        }
        options.push(ComponentOption {
            id,
            quantity: raw_option.quantity.map(|quantity| quantity as u64),
            min: raw_option.min.map(|min| min as u64),
            max: raw_option.max.map(|max| max as u64),
            is_default: raw_option.default.unwrap_or(false),
            sort_order: raw_option.sort_order,
        });
    }
    sort_by_order(&mut options, |option| option.sort_order);

    Ok(Component {
        key: key.to_string(),
        name: raw.name.clone(),
        min: raw.min.map(|min| min as u64),
        max: raw.max.map(|max| max as u64),
        sort_order: raw.sort_order,
        options,
    })
}

/// Stable sort by `sort_order`: explicit orders ascending, unset last.
pub fn sort_by_order<T>(items: &mut [T], order: impl Fn(&T) -> Option<i64>) {
    items.sort_by_key(|item| order(item).unwrap_or(i64::MAX));
}
