//! Bundle price display helpers.

use crate::catalog::BundleCatalog;
use crate::products::ConfiguredBundle;

/// A bundle with its own SKU carries a fixed price; otherwise the price
/// accumulates from the selected components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingType {
    Fixed,
    Cumulative,
}

#[derive(Debug, Clone)]
pub struct BundlePriceInfo {
    pub current_price: Option<String>,
    pub pricing: PricingType,
}

/// Current display price, preferring the configured-bundle response over the
/// base product so the summary tracks the user's selection.
pub fn price_info(catalog: &BundleCatalog, configured: Option<&ConfiguredBundle>) -> BundlePriceInfo {
    let current_price = configured
        .and_then(|configured| configured.display_price.clone())
        .or_else(|| catalog.display_price.clone());
    BundlePriceInfo {
        current_price,
        pricing: catalog.pricing,
    }
}

pub fn format_price_display(price: Option<&str>, is_configuring: bool, pricing: PricingType) -> String {
    if is_configuring {
        return "Calculating price...".to_string();
    }
    match price {
        Some(price) => price.to_string(),
        None => match pricing {
            PricingType::Fixed => "Price not available".to_string(),
            PricingType::Cumulative => "Starting from base price".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(display_price: Option<&str>, pricing: PricingType) -> BundleCatalog {
        BundleCatalog {
            product_id: "b1".into(),
            components: vec![],
            default_configuration: None,
            pricing,
            display_price: display_price.map(str::to_string),
        }
    }

    #[test]
    fn test_configured_price_wins() {
        let catalog = catalog(Some("$10.00"), PricingType::Fixed);
        let configured = ConfiguredBundle {
            display_price: Some("$14.50".into()),
            ..ConfiguredBundle::default()
        };
        assert_eq!(
            price_info(&catalog, Some(&configured)).current_price.as_deref(),
            Some("$14.50")
        );
        assert_eq!(price_info(&catalog, None).current_price.as_deref(), Some("$10.00"));
    }

    #[test]
    fn test_format_price_display() {
        assert_eq!(format_price_display(Some("$9.99"), false, PricingType::Fixed), "$9.99");
        assert_eq!(
            format_price_display(Some("$9.99"), true, PricingType::Fixed),
            "Calculating price..."
        );
        assert_eq!(
            format_price_display(None, false, PricingType::Fixed),
            "Price not available"
        );
        assert_eq!(
            format_price_display(None, false, PricingType::Cumulative),
            "Starting from base price"
        );
    }
}
