//! Text measurement and word wrapping for text elements.

use design_core::Transform;

/// Measures rendered text width.
pub trait TextMeasure {
    /// Advance width of `text` at `font_size`, in canvas units.
    fn measure(&self, text: &str, font_size: f64) -> f64;

    /// Distance from the top of a line to its alphabetic baseline.
    fn ascent(&self, font_size: f64) -> f64 {
        font_size * 0.9
    }
}

/// Per-character advance estimates close to Arial.
///
/// Deterministic and font-free, so wrapping is identical on every host
/// regardless of installed fonts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageGlyphMetrics {
    /// Advance of narrow glyphs (`i`, `l`, `.`, space, ...) in ems.
    pub narrow: f64,
    /// Advance of ordinary lowercase glyphs and digits in ems.
    pub regular: f64,
    /// Advance of uppercase glyphs in ems.
    pub capital: f64,
    /// Advance of wide glyphs (`m`, `w`, `M`, `W`, `@`) in ems.
    pub wide: f64,
    /// Ascent in ems.
    pub ascent: f64,
}

impl Default for AverageGlyphMetrics {
    fn default() -> Self {
        Self {
            narrow: 0.28,
            regular: 0.55,
            capital: 0.67,
            wide: 0.85,
            ascent: 0.9,
        }
    }
}

impl AverageGlyphMetrics {
    fn advance(&self, c: char) -> f64 {
        match c {
            ' ' | 'i' | 'j' | 'l' | 'I' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' | 'f' | 't'
            | 'r' => self.narrow,
            'm' | 'w' | 'M' | 'W' | '@' => self.wide,
            c if c.is_uppercase() => self.capital,
            _ => self.regular,
        }
    }
}

impl TextMeasure for AverageGlyphMetrics {
    fn measure(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|c| self.advance(c)).sum::<f64>() * font_size
    }

    fn ascent(&self, font_size: f64) -> f64 {
        font_size * self.ascent
    }
}

/// Greedy word wrap.
///
/// Words are split on single spaces. Each word is appended to the current
/// line while the measured candidate fits `max_width`; on overflow with a
/// non-empty line, the line is emitted and the word starts the next one.
/// An over-long word sits on a line of its own. Empty content yields no
/// lines.
#[must_use]
pub fn wrap_words(
    text: &str,
    max_width: f64,
    font_size: f64,
    measure: &dyn TextMeasure,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split(' ') {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if measure.measure(&candidate, font_size) > max_width && !current.is_empty() {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Lines of a text element positioned inside its box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    /// Font size: `min(height, max_font_size)`.
    pub font_size: f64,
    /// Line advance: `min(height / lines, max_font_size)`.
    pub line_height: f64,
    /// Wrapped lines, top to bottom.
    pub lines: Vec<String>,
}

impl TextLayout {
    /// Lay out `content` inside `transform`'s box.
    #[must_use]
    pub fn new(
        content: &str,
        transform: &Transform,
        max_font_size: f64,
        measure: &dyn TextMeasure,
    ) -> Self {
        let font_size = transform.height.min(max_font_size);
        let lines = wrap_words(content, transform.width, font_size, measure);
        #[allow(clippy::cast_precision_loss)]
        let line_height = if lines.is_empty() {
            max_font_size
        } else {
            (transform.height / lines.len() as f64).min(max_font_size)
        };
        Self {
            font_size,
            line_height,
            lines,
        }
    }

    /// Top edge of line `index` given the box top.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn line_top(&self, box_top: f64, index: usize) -> f64 {
        box_top + index as f64 * self.line_height
    }
}
