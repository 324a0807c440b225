//! Error types for the design studio.

use design_core::CanvasError;
use design_renderer::RenderError;
use thiserror::Error;

/// Result type for studio operations.
pub type StudioResult<T> = Result<T, StudioError>;

/// Errors surfaced by the studio controller.
#[derive(Debug, Error)]
pub enum StudioError {
    /// Upload is not an image.
    #[error("Invalid upload: expected an image, got {0:?}")]
    InvalidUpload(String),

    /// Save was attempted without a design name.
    #[error("Please enter a design name")]
    MissingName,

    /// Add-to-cart was attempted with nothing on the canvas.
    #[error("Please add some design elements first")]
    EmptyDesign,

    /// An image is already being processed.
    #[error("Studio is busy processing an upload")]
    Busy,

    /// Scene model rejected the change.
    #[error(transparent)]
    Canvas(#[from] CanvasError),

    /// Renderer could not be built or failed to draw.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Background removal collaborator failed.
    #[error("Background removal failed: {0}")]
    BackgroundRemoval(String),

    /// Persistence collaborator rejected or failed the save.
    #[error("Failed to save design: {0}")]
    Persistence(String),

    /// Cart collaborator rejected or failed the line item.
    #[error("Failed to add to cart: {0}")]
    Cart(String),

    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
