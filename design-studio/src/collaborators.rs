//! External collaborators the studio hands work to, and the records it
//! sends them.
//!
//! Each collaborator is optional from the studio's point of view: a missing
//! background remover means uploads are used as-is, and save / add-to-cart
//! simply fail without a repository or cart. Calls are never retried.

use std::cell::RefCell;

use async_trait::async_trait;
use design_core::{GarmentColor, GarmentSize, Placement, ProductType, Scene};
use serde::{Deserialize, Serialize};

use crate::error::{StudioError, StudioResult};

/// Reply from a background-removal service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalOutcome {
    /// Whether the service produced an image.
    pub success: bool,
    /// Base64 PNG with the background removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    /// Service-side failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RemovalOutcome {
    /// A successful reply carrying base64 PNG data.
    #[must_use]
    pub fn removed(image_data: impl Into<String>) -> Self {
        Self {
            success: true,
            image_data: Some(image_data.into()),
            error: None,
        }
    }

    /// A failed reply.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            image_data: None,
            error: Some(error.into()),
        }
    }

    /// The processed image, or why there is none.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::BackgroundRemoval`] unless the reply is a
    /// success with image data.
    pub fn into_image_data(self) -> StudioResult<String> {
        match (self.success, self.image_data) {
            (true, Some(data)) if !data.is_empty() => Ok(data),
            (true, _) => Err(StudioError::BackgroundRemoval(
                "service returned no image data".to_string(),
            )),
            (false, _) => Err(StudioError::BackgroundRemoval(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            )),
        }
    }
}

/// Strips the background from an uploaded image.
#[async_trait(?Send)]
pub trait BackgroundRemover {
    /// Process `image` (encoded bytes of type `mime`).
    ///
    /// # Errors
    ///
    /// Returns an error if the service could not be reached. A reachable
    /// service that declines reports it through [`RemovalOutcome`].
    async fn remove_background(&self, image: &[u8], mime: &str) -> StudioResult<RemovalOutcome>;
}

/// What gets persisted on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignRecord {
    /// Design name entered by the user.
    pub name: String,
    /// The scene, in its `{"elements": [...]}` wire form.
    pub design_data: Scene,
    /// Garment type.
    pub product_type: ProductType,
    /// Garment color.
    pub color: GarmentColor,
    /// Garment size.
    pub size: GarmentSize,
    /// Print placement.
    pub placement: Placement,
    /// Price as a two-decimal string, e.g. `"28.99"`.
    pub price: String,
}

/// A stored design as reported back by persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedDesign {
    /// Opaque record id.
    pub id: String,
    /// Name as stored.
    pub name: String,
}

/// Stores designs.
#[async_trait(?Send)]
pub trait DesignRepository {
    /// Persist a design.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Persistence`] if the design was not stored.
    async fn save_design(&self, record: &DesignRecord) -> StudioResult<SavedDesign>;
}

/// Garment options of a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartVariant {
    /// Garment color.
    pub color: GarmentColor,
    /// Garment size.
    pub size: GarmentSize,
    /// Print placement.
    pub placement: Placement,
}

/// A custom product added to the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// `custom-<unique>`.
    pub id: String,
    /// Design name, or `Custom <productType>`.
    pub name: String,
    /// Price in dollars.
    pub price: f64,
    /// Garment options.
    pub variant: CartVariant,
}

/// Accepts cart line items.
#[async_trait(?Send)]
pub trait CartService {
    /// Add a line to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Cart`] if the item was not added.
    async fn add_item(&self, item: CartLineItem) -> StudioResult<()>;
}

/// Repository that keeps saved designs in memory.
#[derive(Debug, Default)]
pub struct InMemoryDesignRepository {
    designs: RefCell<Vec<(String, DesignRecord)>>,
}

impl InMemoryDesignRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Saved designs, oldest first.
    #[must_use]
    pub fn designs(&self) -> Vec<(String, DesignRecord)> {
        self.designs.borrow().clone()
    }
}

#[async_trait(?Send)]
impl DesignRepository for InMemoryDesignRepository {
    async fn save_design(&self, record: &DesignRecord) -> StudioResult<SavedDesign> {
        let mut designs = self.designs.borrow_mut();
        let id = format!("design-{}", designs.len() + 1);
        designs.push((id.clone(), record.clone()));
        Ok(SavedDesign {
            id,
            name: record.name.clone(),
        })
    }
}

/// Cart that keeps line items in memory.
#[derive(Debug, Default)]
pub struct InMemoryCart {
    items: RefCell<Vec<CartLineItem>>,
}

impl InMemoryCart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Items added so far.
    #[must_use]
    pub fn items(&self) -> Vec<CartLineItem> {
        self.items.borrow().clone()
    }
}

#[async_trait(?Send)]
impl CartService for InMemoryCart {
    async fn add_item(&self, item: CartLineItem) -> StudioResult<()> {
        self.items.borrow_mut().push(item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use design_core::{ElementKind, Transform};

    #[test]
    fn removal_outcome_wire_form() {
        let outcome: RemovalOutcome =
            serde_json::from_str(r#"{"success":true,"imageData":"iVBOR"}"#).expect("parse");
        assert_eq!(outcome.into_image_data().expect("data"), "iVBOR");

        let failed: RemovalOutcome =
            serde_json::from_str(r#"{"success":false,"error":"quota"}"#).expect("parse");
        assert!(matches!(
            failed.into_image_data(),
            Err(StudioError::BackgroundRemoval(reason)) if reason == "quota"
        ));
    }

    #[test]
    fn success_without_data_is_a_failure() {
        let outcome = RemovalOutcome {
            success: true,
            ..RemovalOutcome::default()
        };
        assert!(outcome.into_image_data().is_err());
    }

    #[test]
    fn design_record_serializes_camel_case() {
        let mut scene = Scene::new();
        scene
            .add_element(
                ElementKind::Text {
                    content: "Hi".to_string(),
                },
                Transform::new(150.0, 150.0, 200.0, 50.0),
            )
            .expect("text");
        let record = DesignRecord {
            name: "Summer".to_string(),
            design_data: scene,
            product_type: ProductType::Longsleeve,
            color: GarmentColor::Navy,
            size: GarmentSize::Xl,
            placement: Placement::LeftSleeve,
            price: "31.99".to_string(),
        };

        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["productType"], "longsleeve");
        assert_eq!(value["size"], "XL");
        assert_eq!(value["placement"], "left-sleeve");
        assert_eq!(value["price"], "31.99");
        assert_eq!(value["designData"]["elements"][0]["type"], "text");

        let back: DesignRecord = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, record);
    }

    #[test]
    fn cart_item_price_is_a_number() {
        let item = CartLineItem {
            id: "custom-1".to_string(),
            name: "Custom tshirt".to_string(),
            price: 26.99,
            variant: CartVariant {
                color: GarmentColor::Black,
                size: GarmentSize::M,
                placement: Placement::Front,
            },
        };
        let value = serde_json::to_value(&item).expect("serialize");
        assert_eq!(value["price"], 26.99);
        assert_eq!(value["variant"]["size"], "M");
    }
}
