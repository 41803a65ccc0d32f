//! Crate-wide error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Product is not a bundle")]
    NotABundle,

    #[error("Product data not available")]
    MissingProductData,

    #[error("Malformed product payload: {0}")]
    MalformedProduct(String),

    #[error("Invalid component {key}: {reason}")]
    InvalidComponent { key: String, reason: String },

    #[error("Id '{0}' contains the reserved ':' separator")]
    ReservedSeparator(String),

    #[error("Product lookup failed: {0}")]
    Source(String),

    #[error("Bundle configuration failed: {0}")]
    Configure(String),
}

pub type Result<T> = std::result::Result<T, BundleError>;
