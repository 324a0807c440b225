//! # Design Renderer
//!
//! Draws a design scene over a garment mockup.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────┐
//! │ Scene        │   │ Composer     │   │ usvg / resvg │   │ Pixmap   │
//! │ + Selection  │──▶│ (SVG string) │──▶│ rasterizer   │──▶│ / PNG    │
//! │ + Product    │   └──────────────┘   └──────────────┘   └──────────┘
//! └──────────────┘          ▲
//!                    ┌──────┴───────┐
//!                    │ AssetCache   │ ◀── AssetLoader (async, per image)
//!                    └──────────────┘
//! ```
//!
//! Images that are still loading are skipped and appear on a later redraw;
//! images that failed become a placeholder. Neither stops the rest of the
//! scene from drawing.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assets;
pub mod error;
pub mod image;
pub mod mockup;
pub mod raster;
pub mod svg;
pub mod text;

pub use assets::{
    AssetCache, AssetLoader, AssetSource, AssetState, CacheStats, CompletedLoad, DataUriSource,
    LoadedAsset, PendingLoads,
};
pub use error::{RenderError, RenderResult};
pub use crate::image::TextureData;
pub use mockup::MockupCatalog;
pub use svg::{ComposedFrame, FrameInput, FrameStats};
pub use text::{AverageGlyphMetrics, TextLayout, TextMeasure};

use design_core::{CanvasSize, ElementKind};
use serde::{Deserialize, Serialize};

/// Dashed outline and corner handles around the selected element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionStyle {
    /// Outline and handle color.
    pub color: String,
    /// Outline width.
    pub stroke_width: f64,
    /// Dash and gap length.
    pub dash: f64,
    /// How far the outline sits outside the element box.
    pub margin: f64,
    /// Side of the square corner handles.
    pub handle_size: f64,
}

impl Default for SelectionStyle {
    fn default() -> Self {
        Self {
            color: "#2563eb".to_string(),
            stroke_width: 2.0,
            dash: 5.0,
            margin: 2.0,
            handle_size: 8.0,
        }
    }
}

/// Box drawn in place of an image that failed to load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderStyle {
    /// Box fill.
    pub fill: String,
    /// Box outline.
    pub stroke: String,
    /// Centered caption.
    pub label: String,
    /// Caption color.
    pub label_color: String,
    /// Caption size.
    pub font_size: f64,
}

impl Default for PlaceholderStyle {
    fn default() -> Self {
        Self {
            fill: "#f0f0f0".to_string(),
            stroke: "#cccccc".to_string(),
            label: "Image".to_string(),
            label_color: "#999999".to_string(),
            font_size: 14.0,
        }
    }
}

/// Smallest checkerboard tile, in canvas units.
pub const MIN_TILE_SIZE: f64 = 1.0;

/// Configuration for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Logical canvas size.
    pub canvas: CanvasSize,
    /// Output pixels per canvas unit (e.g. 2.0 for retina).
    pub scale: f32,
    /// Checkerboard tile side in canvas units, at least [`MIN_TILE_SIZE`].
    pub tile_size: f64,
    /// Checkerboard base color.
    pub background_color: String,
    /// Checkerboard tile color, on tiles where `col + row` is even.
    pub tile_color: String,
    /// Text element color.
    pub text_color: String,
    /// Font family for text elements and placeholder captions.
    pub font_family: String,
    /// Cap on text font size and line height.
    pub max_font_size: f64,
    /// Selection decoration.
    pub selection: SelectionStyle,
    /// Failed-image placeholder.
    pub placeholder: PlaceholderStyle,
    /// Load the host's fonts for rasterizing text.
    pub load_system_fonts: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasSize::default(),
            scale: 1.0,
            tile_size: 20.0,
            background_color: "#f0f0f0".to_string(),
            tile_color: "#e0e0e0".to_string(),
            text_color: "#000000".to_string(),
            font_family: "Arial, sans-serif".to_string(),
            max_font_size: 32.0,
            selection: SelectionStyle::default(),
            placeholder: PlaceholderStyle::default(),
            load_system_fonts: true,
        }
    }
}

impl RendererConfig {
    /// Check sizes are positive.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Config`] naming the first bad value.
    pub fn validate(&self) -> RenderResult<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.canvas.width) || !positive(self.canvas.height) {
            return Err(RenderError::Config(format!(
                "canvas must be positive, got {}x{}",
                self.canvas.width, self.canvas.height
            )));
        }
        if !positive(f64::from(self.scale)) {
            return Err(RenderError::Config(format!("scale must be positive, got {}", self.scale)));
        }
        if !(self.tile_size.is_finite() && self.tile_size >= MIN_TILE_SIZE) {
            return Err(RenderError::Config(format!(
                "tile_size must be at least {MIN_TILE_SIZE}, got {}",
                self.tile_size
            )));
        }
        if !positive(self.max_font_size) {
            return Err(RenderError::Config(format!(
                "max_font_size must be positive, got {}",
                self.max_font_size
            )));
        }
        Ok(())
    }
}

/// A rasterized frame.
pub struct RenderedFrame {
    /// Pixels.
    pub pixmap: tiny_skia::Pixmap,
    /// What was drawn.
    pub stats: FrameStats,
}

impl RenderedFrame {
    /// Encode the frame as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn to_png(&self) -> RenderResult<Vec<u8>> {
        raster::encode_png(&self.pixmap)
    }
}

impl std::fmt::Debug for RenderedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderedFrame")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("stats", &self.stats)
            .finish()
    }
}

/// The main renderer interface.
pub struct Renderer {
    config: RendererConfig,
    mockups: MockupCatalog,
    measure: Box<dyn TextMeasure>,
    svg_options: usvg::Options<'static>,
    frame_count: u64,
}

impl Renderer {
    /// Create a new renderer with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: RendererConfig) -> RenderResult<Self> {
        config.validate()?;
        let svg_options = raster::svg_options(config.load_system_fonts);
        Ok(Self {
            config,
            mockups: MockupCatalog::default(),
            measure: Box::new(AverageGlyphMetrics::default()),
            svg_options,
            frame_count: 0,
        })
    }

    /// Replace the mockup catalog.
    #[must_use]
    pub fn with_mockups(mut self, mockups: MockupCatalog) -> Self {
        self.mockups = mockups;
        self
    }

    /// Replace the text measurement used for word wrapping.
    #[must_use]
    pub fn with_text_measure(mut self, measure: impl TextMeasure + 'static) -> Self {
        self.measure = Box::new(measure);
        self
    }

    /// Get the renderer configuration.
    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Get the mockup catalog.
    #[must_use]
    pub fn mockups(&self) -> &MockupCatalog {
        &self.mockups
    }

    /// Number of frames rasterized so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Every asset source a frame draws: the mockup, then each image element.
    #[must_use]
    pub fn asset_sources(&self, input: &FrameInput<'_>) -> Vec<String> {
        let mockup = self
            .mockups
            .url_for(input.product.product_type)
            .map(str::to_string);
        let images = input.scene.elements().iter().filter_map(|e| match &e.kind {
            ElementKind::Image { src } => Some(src.clone()),
            ElementKind::Text { .. } => None,
        });
        mockup.into_iter().chain(images).collect()
    }

    /// Ask the loader for every asset the frame needs, starting loads for
    /// ones it has not seen.
    pub fn request_assets(&self, input: &FrameInput<'_>, loader: &mut AssetLoader) {
        for source in self.asset_sources(input) {
            loader.request(&source);
        }
    }

    /// Compose the frame as SVG using whatever assets are ready.
    #[must_use]
    pub fn compose(&self, input: &FrameInput<'_>, assets: &AssetCache) -> ComposedFrame {
        svg::Composer {
            config: &self.config,
            assets,
            measure: self.measure.as_ref(),
            mockup_url: self.mockups.url_for(input.product.product_type),
        }
        .compose(input)
    }

    /// Compose and rasterize a frame.
    ///
    /// # Errors
    ///
    /// Returns an error if rasterization fails. Asset failures never do.
    pub fn render(
        &mut self,
        input: &FrameInput<'_>,
        assets: &AssetCache,
    ) -> RenderResult<RenderedFrame> {
        let ComposedFrame { svg, stats } = self.compose(input, assets);
        let pixmap = raster::rasterize_svg(&svg, &self.svg_options)?;
        self.frame_count += 1;
        tracing::trace!(
            "Frame {} rendered at {}x{}",
            self.frame_count,
            pixmap.width(),
            pixmap.height()
        );
        Ok(RenderedFrame { pixmap, stats })
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("config", &self.config)
            .field("mockups", &self.mockups)
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}
