//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// An image or mockup could not be fetched or decoded.
    ///
    /// Scene rendering never returns this; a failed asset becomes a
    /// placeholder. Loaders and the image helpers do.
    #[error("Failed to load asset: {0}")]
    AssetLoad(String),

    /// Invalid renderer configuration (e.g. a zero-sized canvas).
    #[error("Invalid renderer configuration: {0}")]
    Config(String),

    /// SVG composition could not be parsed back for rasterization.
    #[error("SVG parsing failed: {0}")]
    Svg(String),

    /// Rasterization or PNG encoding failed.
    #[error("Rasterization failed: {0}")]
    Raster(String),
}
