//! Design files: a saved design record, or a bare scene.

use std::path::Path;

use design_core::{CanvasError, Scene};
use design_studio::{DesignRecord, Studio};
use thiserror::Error;

/// Errors reading a design file.
#[derive(Debug, Error)]
pub enum DesignFileError {
    /// File could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was read.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
    /// File is not JSON.
    #[error("failed to parse design JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// JSON is neither a design record nor a valid scene.
    #[error("invalid design: {0}")]
    Invalid(#[from] CanvasError),
}

/// What a design file holds.
#[derive(Debug, Clone, PartialEq)]
pub enum DesignFile {
    /// `{"name": ..., "designData": {...}, "productType": ..., ...}`
    Record(DesignRecord),
    /// `{"elements": [...]}`
    Scene(Scene),
}

impl DesignFile {
    /// Parse a design record or scene.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the design is invalid.
    pub fn parse(json: &str) -> Result<Self, DesignFileError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.get("designData").is_some() {
            Ok(Self::Record(serde_json::from_value(value)?))
        } else {
            Ok(Self::Scene(Scene::from_json(json)?))
        }
    }

    /// Read and parse a design file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or as [`Self::parse`].
    pub async fn read(path: &Path) -> Result<Self, DesignFileError> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| DesignFileError::Io {
                path: path.display().to_string(),
                source,
            })?;
        Self::parse(&json)
    }

    /// The design's scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        match self {
            Self::Record(record) => &record.design_data,
            Self::Scene(scene) => scene,
        }
    }

    /// Load the design into a studio, including the product options and
    /// name of a record.
    pub fn apply_to(self, studio: &Studio) {
        match self {
            Self::Record(record) => {
                studio.set_product_type(record.product_type);
                studio.set_color(record.color);
                studio.set_placement(record.placement);
                studio.set_size(record.size);
                studio.set_design_name(record.name);
                studio.load_scene(record.design_data);
            }
            Self::Scene(scene) => studio.load_scene(scene),
        }
    }
}
