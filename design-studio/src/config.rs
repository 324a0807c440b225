//! Studio configuration.

use std::path::Path;

use design_core::{PriceList, Transform};
use design_renderer::{MockupCatalog, RendererConfig};
use serde::{Deserialize, Serialize};

use crate::error::{StudioError, StudioResult};

/// Everything the studio needs besides its collaborators.
///
/// Every field has a default, so a config file only lists what it changes:
///
/// ```json
/// { "prices": { "element_surcharge_cents": 250 }, "renderer": { "scale": 2.0 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Canvas size, colors and styling.
    pub renderer: RendererConfig,
    /// Base prices and element surcharge.
    pub prices: PriceList,
    /// Mockup image per product type.
    pub mockups: MockupCatalog,
    /// Box given to newly added images.
    pub default_image_box: Transform,
    /// Box given to newly added text.
    pub default_text_box: Transform,
    /// Content of newly added text.
    pub default_text: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            renderer: RendererConfig::default(),
            prices: PriceList::default(),
            mockups: MockupCatalog::default(),
            default_image_box: Transform::new(100.0, 100.0, 200.0, 200.0),
            default_text_box: Transform::new(150.0, 150.0, 200.0, 50.0),
            default_text: "Your Text Here".to_string(),
        }
    }
}

impl StudioConfig {
    /// Parse a config from JSON and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is invalid.
    pub fn from_json_str(json: &str) -> StudioResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or as
    /// [`Self::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> StudioResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        tracing::debug!("Loaded studio config from {}", path.display());
        Self::from_json_str(&contents)
    }

    /// Check the renderer settings and default boxes.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Config`] describing the first problem.
    pub fn validate(&self) -> StudioResult<()> {
        self.renderer
            .validate()
            .map_err(|e| StudioError::Config(e.to_string()))?;
        self.default_image_box
            .validate()
            .map_err(|e| StudioError::Config(format!("default_image_box: {e}")))?;
        self.default_text_box
            .validate()
            .map_err(|e| StudioError::Config(format!("default_text_box: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use design_core::ProductType;

    use super::*;

    #[test]
    fn defaults_match_storefront() {
        let config = StudioConfig::default();
        assert_eq!(config.default_image_box, Transform::new(100.0, 100.0, 200.0, 200.0));
        assert_eq!(config.default_text_box, Transform::new(150.0, 150.0, 200.0, 50.0));
        assert_eq!(config.default_text, "Your Text Here");
        assert_eq!(config.prices.base(ProductType::Hoodie).cents(), 4999);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = StudioConfig::from_json_str(
            r#"{"prices":{"element_surcharge_cents":250,"base_cents":{"tank":2199}},"default_text":"Hello"}"#,
        )
        .expect("parse");
        assert_eq!(config.prices.element_surcharge_cents, 250);
        assert_eq!(config.prices.base(ProductType::Tshirt).cents(), 2499);
        assert_eq!(config.prices.base(ProductType::Tank).cents(), 2199);
        assert_eq!(config.default_text, "Hello");
        assert_eq!(config.renderer, RendererConfig::default());
    }

    #[test]
    fn rejects_degenerate_default_box() {
        let json = r#"{"default_image_box":{"x":0,"y":0,"width":0,"height":10,"rotation":0}}"#;
        assert!(matches!(
            StudioConfig::from_json_str(json),
            Err(StudioError::Config(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("studio.json");
        std::fs::write(&path, r#"{"renderer":{"scale":2.0}}"#).expect("write");

        let config = StudioConfig::from_json_file(&path).expect("load");
        assert!((config.renderer.scale - 2.0).abs() < f32::EPSILON);

        let missing = StudioConfig::from_json_file(dir.path().join("nope.json"));
        assert!(matches!(missing, Err(StudioError::Io(_))));
    }
}
