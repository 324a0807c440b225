//! SVG to pixels through usvg/resvg/tiny-skia.

use crate::error::{RenderError, RenderResult};

/// Parser options with the host's system fonts loaded, or none at all.
#[must_use]
pub fn svg_options(load_system_fonts: bool) -> usvg::Options<'static> {
    let mut options = usvg::Options::default();
    if load_system_fonts {
        options.fontdb_mut().load_system_fonts();
        tracing::debug!("Loaded {} font faces", options.fontdb.len());
    }
    options
}

/// Rasterize an SVG string to a tiny-skia Pixmap sized by the SVG's
/// `width`/`height` attributes.
///
/// # Errors
///
/// Returns an error if the SVG does not parse or the pixmap cannot be
/// allocated.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rasterize_svg(svg: &str, options: &usvg::Options<'_>) -> RenderResult<tiny_skia::Pixmap> {
    let tree = usvg::Tree::from_str(svg, options).map_err(|e| RenderError::Svg(e.to_string()))?;

    let px_w = tree.size().width().ceil() as u32;
    let px_h = tree.size().height().ceil() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
        .ok_or_else(|| RenderError::Raster("Failed to create pixmap".to_string()))?;

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    Ok(pixmap)
}

/// Encode a pixmap as PNG.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn encode_png(pixmap: &tiny_skia::Pixmap) -> RenderResult<Vec<u8>> {
    pixmap
        .encode_png()
        .map_err(|e| RenderError::Raster(format!("PNG encoding failed: {e}")))
}
