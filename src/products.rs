//! External product collaborators, consumed through narrow traits so the
//! core is testable without a live vendor client.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;

use crate::api::{self, ApiSelections};
use crate::catalog::{self, Component, RawBundleProduct};
use crate::error::Result;

/// Upper bound on ids per product-lookup request.
pub const PRODUCT_BATCH_SIZE: usize = 100;

/// Display data for one option product.
#[derive(Debug, Clone, Default)]
pub struct OptionProduct {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub price: Option<String>,
    pub image: Option<String>,
    /// True when the product itself offers child variants.
    pub is_parent: bool,
}

/// Metadata for an option whose underlying product has variants.
#[derive(Debug, Clone, Default)]
pub struct ParentProductInfo {
    pub id: String,
    pub is_parent: bool,
    pub children: Vec<ChildProduct>,
    pub variations: Vec<VariationAxis>,
    /// Nested mapping keyed by successive variation-choice ids; each leaf is
    /// a child product id. Depth equals the number of variation axes.
    pub variation_matrix: serde_json::Value,
}

#[derive(Debug, Clone, Default)]
pub struct ChildProduct {
    pub id: String,
    pub name: Option<String>,
    pub sku: Option<String>,
    pub price: Option<String>,
    /// Not purchasable in this bundle context.
    pub excluded: bool,
}

/// One dimension of variant choice (e.g. "Size").
#[derive(Debug, Clone, Default)]
pub struct VariationAxis {
    pub id: String,
    pub name: String,
    pub choices: Vec<VariationChoice>,
}

#[derive(Debug, Clone, Default)]
pub struct VariationChoice {
    pub id: String,
    pub name: String,
}

/// Result of the remote configure call: the server-confirmed selection echo
/// plus the configured display price.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredBundle {
    pub id: String,
    pub selected_options: ApiSelections,
    pub display_price: Option<String>,
}

impl ConfiguredBundle {
    pub fn from_product(raw: &RawBundleProduct) -> Self {
        let selected_options = raw
            .meta
            .bundle_configuration
            .as_ref()
            .map(|config| api::normalize_selected_options(&config.selected_options))
            .unwrap_or_default();
        Self {
            id: raw.id.clone(),
            selected_options,
            display_price: catalog::formatted_price(&raw.meta),
        }
    }
}

/// Read access to the vendor product catalog.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Batch product lookup; invoked with at most [`PRODUCT_BATCH_SIZE`] ids
    /// per call.
    async fn fetch_products(&self, ids: &[String]) -> Result<Vec<OptionProduct>>;

    /// Per-parent lookup including children and variation metadata.
    async fn fetch_parent_and_children(&self, id: &str) -> Result<ParentProductInfo>;
}

/// Collects the unique option product ids across all components.
pub fn option_product_ids(components: &[Component]) -> Vec<String> {
    let ids: BTreeSet<&str> = components
        .iter()
        .flat_map(|component| component.options.iter().map(|option| option.id.as_str()))
        .collect();
    ids.into_iter().map(str::to_string).collect()
}

/// Fetches display data for every option product, chunking requests at
/// [`PRODUCT_BATCH_SIZE`] ids.
pub async fn fetch_option_products(
    source: &dyn ProductSource,
    components: &[Component],
) -> Result<HashMap<String, OptionProduct>> {
    let ids = option_product_ids(components);
    let mut products = HashMap::with_capacity(ids.len());
    for chunk in ids.chunks(PRODUCT_BATCH_SIZE) {
        for product in source.fetch_products(chunk).await? {
            products.insert(product.id.clone(), product);
        }
    }
    Ok(products)
}

/// Resolves parent metadata for every option product that has variants.
/// A failed per-parent lookup is logged and left out of the result, so
/// callers see "cannot resolve yet" rather than an error.
pub async fn load_parent_products(
    source: &dyn ProductSource,
    components: &[Component],
) -> Result<HashMap<String, ParentProductInfo>> {
    let products = fetch_option_products(source, components).await?;
    let mut parents = HashMap::new();
    for (id, product) in &products {
        if !product.is_parent {
            continue;
        }
        match source.fetch_parent_and_children(id).await {
            Ok(info) => {
                parents.insert(id.clone(), info);
            }
            Err(err) => {
                tracing::warn!(product = %id, error = %err, "failed to fetch children for parent product");
            }
        }
    }
    Ok(parents)
}
