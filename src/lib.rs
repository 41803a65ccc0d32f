//! Bundle configuration engine for composite commerce products.
//!
//! Resolves a bundle product's configurable components (each with min/max
//! selection constraints, optional parent/variation products and per-option
//! quantity bounds) into a selection state, validates it, converts it to the
//! remote API format, and reconciles local changes with the vendor's
//! configuration endpoint.
//!
//! ## Features
//! - Catalog ingestion and normalization of vendor bundle products
//! - Default selection resolution (preset, server configuration, per-component default)
//! - Variation-axis resolution to concrete child products
//! - Min/max selection and quantity validation with user-facing messages
//! - Debounced, duplicate-suppressing configuration reconciliation
//! - Shareable-link encoding of a selection state

pub mod api;
pub mod catalog;
pub mod defaults;
pub mod error;
pub mod pricing;
pub mod products;
pub mod reconciler;
pub mod selection;
pub mod session;
pub mod validation;
pub mod variation;

pub use api::{to_api_format, ApiSelections, RESERVED_FORM_FIELDS};
pub use catalog::{BundleCatalog, Component, ComponentOption};
pub use defaults::resolve_defaults;
pub use error::{BundleError, Result};
pub use pricing::{format_price_display, price_info, BundlePriceInfo, PricingType};
pub use products::{
    ChildProduct, ConfiguredBundle, OptionProduct, ParentProductInfo, ProductSource,
    VariationAxis, VariationChoice, PRODUCT_BATCH_SIZE,
};
pub use reconciler::{ConfigureBundle, Reconciler, ReconcilerStatus, DEFAULT_DEBOUNCE};
pub use selection::{PresetError, SelectionKey, SelectionState, BUNDLE_CONFIG_PARAM};
pub use session::BundleSession;
pub use validation::{validate, ValidationResult};
pub use variation::find_matching_variant;
