//! Garment mockup images drawn behind the design.

use std::collections::BTreeMap;

use design_core::ProductType;
use serde::{Deserialize, Serialize};

const TEE: &str = "https://images.unsplash.com/photo-1521572163474-6864f9cf17ab?ixlib=rb-4.0.3&auto=format&fit=crop&w=400&h=500";
const HOODIE: &str = "https://images.unsplash.com/photo-1556821840-3a63f95609a7?ixlib=rb-4.0.3&auto=format&fit=crop&w=400&h=500";

/// Mockup image URL per product type.
///
/// Only the product type picks the mockup; color and placement do not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MockupCatalog {
    urls: BTreeMap<ProductType, String>,
}

impl Default for MockupCatalog {
    fn default() -> Self {
        Self {
            urls: BTreeMap::from([
                (ProductType::Tshirt, TEE.to_string()),
                (ProductType::Hoodie, HOODIE.to_string()),
                (ProductType::Tank, TEE.to_string()),
                (ProductType::Longsleeve, TEE.to_string()),
            ]),
        }
    }
}

impl MockupCatalog {
    /// A catalog with no mockups; nothing is drawn behind the design.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            urls: BTreeMap::new(),
        }
    }

    /// Set the mockup for a product type.
    #[must_use]
    pub fn with(mut self, product: ProductType, url: impl Into<String>) -> Self {
        self.urls.insert(product, url.into());
        self
    }

    /// Mockup for `product`, falling back to the T-shirt mockup.
    #[must_use]
    pub fn url_for(&self, product: ProductType) -> Option<&str> {
        self.urls
            .get(&product)
            .or_else(|| self.urls.get(&ProductType::Tshirt))
            .map(String::as_str)
    }
}
