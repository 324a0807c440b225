//! Scene composition into an SVG document.
//!
//! Draw order: checkerboard, garment mockup, elements in scene order, then
//! the selection decoration on top. The SVG is rasterized by
//! [`crate::Renderer`] or written out as-is.

use std::fmt::Write;

use design_core::{Element, ElementKind, ProductContext, Rotation, Scene, Selection};

use crate::assets::{AssetCache, AssetState};
use crate::text::{TextLayout, TextMeasure};
use crate::RendererConfig;

/// Everything one frame depends on.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    /// Elements to draw.
    pub scene: &'a Scene,
    /// Element to decorate, if any.
    pub selection: &'a Selection,
    /// Product settings; picks the mockup.
    pub product: ProductContext,
}

/// What went into a composed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Whether the mockup image was drawn.
    pub mockup_drawn: bool,
    /// Image elements drawn from loaded pixels.
    pub images_drawn: usize,
    /// Image elements drawn as placeholders after a failed load.
    pub placeholders: usize,
    /// Image elements skipped because their load is still running.
    pub images_pending: usize,
    /// Text lines drawn across all text elements.
    pub text_lines: usize,
    /// Whether a selection decoration was drawn.
    pub selection_drawn: bool,
}

impl FrameStats {
    /// Whether a later redraw would look different once loads finish.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.images_pending == 0
    }
}

/// An SVG document and its summary.
#[derive(Debug, Clone)]
pub struct ComposedFrame {
    /// The SVG markup.
    pub svg: String,
    /// Summary of what was drawn.
    pub stats: FrameStats,
}

pub(crate) struct Composer<'a> {
    pub config: &'a RendererConfig,
    pub assets: &'a AssetCache,
    pub measure: &'a dyn TextMeasure,
    pub mockup_url: Option<&'a str>,
}

impl Composer<'_> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn compose(&self, input: &FrameInput<'_>) -> ComposedFrame {
        let canvas = self.config.canvas;
        let scale = f64::from(self.config.scale);
        let out_w = (canvas.width * scale).round().max(1.0) as u32;
        let out_h = (canvas.height * scale).round().max(1.0) as u32;

        let mut svg = String::with_capacity(8192);
        let mut stats = FrameStats::default();
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {} {}\">",
            canvas.width, canvas.height,
        );

        self.checkerboard(&mut svg);
        stats.mockup_drawn = self.mockup(&mut svg);

        for element in input.scene.elements() {
            self.element(&mut svg, element, &mut stats);
        }

        if let Some(selected) = input
            .selection
            .current()
            .and_then(|id| input.scene.get_element(id))
        {
            self.selection(&mut svg, selected);
            stats.selection_drawn = true;
        }

        svg.push_str("</svg>");
        tracing::trace!("Composed frame: {stats:?}");
        ComposedFrame { svg, stats }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn checkerboard(&self, svg: &mut String) {
        let canvas = self.config.canvas;
        let tile = self.config.tile_size;
        let _ = write!(
            svg,
            "<rect width=\"{}\" height=\"{}\" fill=\"{}\"/>",
            canvas.width,
            canvas.height,
            escape_xml(&self.config.background_color),
        );
        let cols = (canvas.width / tile).ceil() as u32;
        let rows = (canvas.height / tile).ceil() as u32;
        let tile_fill = escape_xml(&self.config.tile_color);
        let _ = write!(svg, "<g fill=\"{tile_fill}\">");
        for col in 0..cols {
            for row in 0..rows {
                if (col + row) % 2 == 0 {
                    let _ = write!(
                        svg,
                        "<rect x=\"{}\" y=\"{}\" width=\"{tile}\" height=\"{tile}\"/>",
                        f64::from(col) * tile,
                        f64::from(row) * tile,
                    );
                }
            }
        }
        svg.push_str("</g>");
    }

    fn mockup(&self, svg: &mut String) -> bool {
        let Some(url) = self.mockup_url else {
            return false;
        };
        match self.assets.get(url) {
            Some(AssetState::Ready(asset)) => {
                let canvas = self.config.canvas;
                let _ = write!(
                    svg,
                    "<image x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\" href=\"{}\"/>",
                    canvas.width,
                    canvas.height,
                    escape_xml(&asset.png_data_uri),
                );
                true
            }
            Some(AssetState::Failed(_) | AssetState::Loading) | None => false,
        }
    }

    fn element(&self, svg: &mut String, element: &Element, stats: &mut FrameStats) {
        let tf = &element.transform;
        let open = open_rotation(svg, element);

        match &element.kind {
            ElementKind::Image { src } => match self.assets.get(src) {
                Some(AssetState::Ready(asset)) => {
                    let _ = write!(
                        svg,
                        "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\" href=\"{}\"/>",
                        tf.x,
                        tf.y,
                        tf.width,
                        tf.height,
                        escape_xml(&asset.png_data_uri),
                    );
                    stats.images_drawn += 1;
                }
                Some(AssetState::Failed(_)) => {
                    self.placeholder(svg, element);
                    stats.placeholders += 1;
                }
                Some(AssetState::Loading) | None => {
                    tracing::trace!("Image {} still loading, skipped", element.id);
                    stats.images_pending += 1;
                }
            },

            ElementKind::Text { content } => {
                let layout = TextLayout::new(content, tf, self.config.max_font_size, self.measure);
                let ascent = self.measure.ascent(layout.font_size);
                let family = escape_xml(&self.config.font_family);
                let fill = escape_xml(&self.config.text_color);
                for (index, line) in layout.lines.iter().enumerate() {
                    let baseline = layout.line_top(tf.y, index) + ascent;
                    let _ = write!(
                        svg,
                        "<text x=\"{}\" y=\"{baseline}\" font-size=\"{}\" font-family=\"{family}\" fill=\"{fill}\" xml:space=\"preserve\">{}</text>",
                        tf.x,
                        layout.font_size,
                        escape_xml(line),
                    );
                }
                stats.text_lines += layout.lines.len();
            }
        }

        if open {
            svg.push_str("</g>");
        }
    }

    fn placeholder(&self, svg: &mut String, element: &Element) {
        let tf = &element.transform;
        let style = &self.config.placeholder;
        let _ = write!(
            svg,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
            tf.x,
            tf.y,
            tf.width,
            tf.height,
            escape_xml(&style.fill),
            escape_xml(&style.stroke),
        );
        let center = tf.center();
        let _ = write!(
            svg,
            "<text x=\"{}\" y=\"{}\" font-size=\"{}\" fill=\"{}\" text-anchor=\"middle\" font-family=\"{}\">{}</text>",
            center.x,
            center.y,
            style.font_size,
            escape_xml(&style.label_color),
            escape_xml(&self.config.font_family),
            escape_xml(&style.label),
        );
    }

    fn selection(&self, svg: &mut String, element: &Element) {
        let style = &self.config.selection;
        let color = escape_xml(&style.color);
        let outline = element.transform.bounds().inflate(style.margin);
        let open = open_rotation(svg, element);

        let _ = write!(
            svg,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"{}\" stroke-dasharray=\"{} {}\"/>",
            outline.x,
            outline.y,
            outline.width,
            outline.height,
            style.stroke_width,
            style.dash,
            style.dash,
        );

        let half = style.handle_size / 2.0;
        let _ = write!(svg, "<g fill=\"{color}\">");
        for corner in element.transform.bounds().corners() {
            let _ = write!(
                svg,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/>",
                corner.x - half,
                corner.y - half,
                style.handle_size,
                style.handle_size,
            );
        }
        svg.push_str("</g>");

        if open {
            svg.push_str("</g>");
        }
    }
}

/// Open a `<g>` rotating about the element center. Returns whether a group
/// was opened.
fn open_rotation(svg: &mut String, element: &Element) -> bool {
    let tf = &element.transform;
    if !tf.rotation.is_finite() {
        tracing::warn!("Element {} has non-finite rotation, drawn unrotated", element.id);
        return false;
    }
    let rotation = Rotation {
        degrees: tf.normalized_rotation(),
        ..Rotation::of(tf)
    };
    if rotation.is_identity() {
        return false;
    }
    let [a, b, c, d, e, f] = rotation.matrix();
    let _ = write!(svg, "<g transform=\"matrix({a} {b} {c} {d} {e} {f})\">");
    true
}

/// Escape special XML characters.
pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
