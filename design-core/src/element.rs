//! Canvas elements - the placeable units of a design.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Point, Rect};
use crate::{CanvasError, CanvasResult};

/// Unique, stable identifier for an element.
///
/// Ids are opaque strings so that designs persisted by older clients
/// (e.g. `img-1718000000000`) load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Generate a fresh id with a kind prefix, e.g. `text-6f1c...`.
    #[must_use]
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{prefix}-{}", Uuid::new_v4().simple()))
    }

    /// View the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The type of content an element contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    /// A raster image.
    Image {
        /// Image URL or `data:` URI carrying the encoded bytes.
        src: String,
    },

    /// A block of text, word-wrapped to the element width.
    Text {
        /// The literal string to render.
        content: String,
    },
}

impl ElementKind {
    /// Wire name of the variant (`"image"` / `"text"`).
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Image { .. } => "image",
            Self::Text { .. } => "text",
        }
    }

    /// The content string: image source or text.
    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::Image { src } => src,
            Self::Text { content } => content,
        }
    }

    fn set_content(&mut self, value: String) {
        match self {
            Self::Image { src } => *src = value,
            Self::Text { content } => *content = value,
        }
    }
}

/// Position, size and rotation of an element in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// X position of the top-left corner.
    pub x: f64,
    /// Y position of the top-left corner.
    pub y: f64,
    /// Box width; always positive.
    pub width: f64,
    /// Box height; always positive.
    pub height: f64,
    /// Rotation in degrees about the box center.
    pub rotation: f64,
}

impl Transform {
    /// Create a transform with no rotation.
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
        }
    }

    /// Set the rotation in degrees.
    #[must_use]
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    /// The unrotated bounding box.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Center of the box, the pivot for rotation.
    #[must_use]
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Rotation folded into `[0, 360)`.
    #[must_use]
    pub fn normalized_rotation(&self) -> f64 {
        let folded = self.rotation.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs
        if folded >= 360.0 {
            0.0
        } else {
            folded
        }
    }

    /// Check the transform invariants: position and rotation finite, width
    /// and height finite and positive.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidElement`] if any field is not finite or
    /// either dimension is not positive.
    pub fn validate(&self) -> CanvasResult<()> {
        for (field, value) in [("x", self.x), ("y", self.y), ("rotation", self.rotation)] {
            if !value.is_finite() {
                return Err(CanvasError::InvalidElement(format!(
                    "{field} must be finite, got {value}"
                )));
            }
        }
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(CanvasError::InvalidElement(format!(
                "width must be positive, got {}",
                self.width
            )));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(CanvasError::InvalidElement(format!(
                "height must be positive, got {}",
                self.height
            )));
        }
        Ok(())
    }
}

/// A canvas element with content and transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ElementRecord", try_from = "ElementRecord")]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// Element content.
    pub kind: ElementKind,
    /// Position, size and rotation.
    pub transform: Transform,
}

impl Element {
    /// Check if a point (in canvas coordinates) is within the unrotated box.
    ///
    /// Rotation is ignored on purpose: rotated elements are picked by their
    /// axis-aligned box.
    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        self.transform.bounds().contains(point)
    }

    /// Apply a patch, validating the resulting size first.
    ///
    /// The element is left untouched if the patch is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidElement`] if the patched width or height
    /// would not be positive.
    pub fn apply(&mut self, patch: ElementPatch) -> CanvasResult<()> {
        let mut transform = self.transform;
        if let Some(x) = patch.x {
            transform.x = x;
        }
        if let Some(y) = patch.y {
            transform.y = y;
        }
        if let Some(width) = patch.width {
            transform.width = width;
        }
        if let Some(height) = patch.height {
            transform.height = height;
        }
        if let Some(rotation) = patch.rotation {
            transform.rotation = rotation;
        }
        transform.validate()?;

        self.transform = transform;
        if let Some(content) = patch.content {
            self.kind.set_content(content);
        }
        Ok(())
    }
}

/// Partial update of an element; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementPatch {
    /// New image source or text.
    pub content: Option<String>,
    /// New x position.
    pub x: Option<f64>,
    /// New y position.
    pub y: Option<f64>,
    /// New width.
    pub width: Option<f64>,
    /// New height.
    pub height: Option<f64>,
    /// New rotation in degrees.
    pub rotation: Option<f64>,
}

impl ElementPatch {
    /// A patch that only moves the element.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// A patch that only replaces the content.
    #[must_use]
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }
}

/// Wire kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ElementType {
    Image,
    Text,
}

/// Flat wire representation shared with the storefront:
/// `{id, type, content, x, y, width, height, rotation}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ElementRecord {
    id: ElementId,
    #[serde(rename = "type")]
    kind: ElementType,
    content: String,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    #[serde(default)]
    rotation: f64,
}

impl From<Element> for ElementRecord {
    fn from(element: Element) -> Self {
        let t = element.transform;
        let (kind, content) = match element.kind {
            ElementKind::Image { src } => (ElementType::Image, src),
            ElementKind::Text { content } => (ElementType::Text, content),
        };
        Self {
            id: element.id,
            kind,
            content,
            x: t.x,
            y: t.y,
            width: t.width,
            height: t.height,
            rotation: t.rotation,
        }
    }
}

impl TryFrom<ElementRecord> for Element {
    type Error = CanvasError;

    fn try_from(record: ElementRecord) -> CanvasResult<Self> {
        let transform = Transform {
            x: record.x,
            y: record.y,
            width: record.width,
            height: record.height,
            rotation: record.rotation,
        };
        transform.validate()?;
        let kind = match record.kind {
            ElementType::Image => ElementKind::Image {
                src: record.content,
            },
            ElementType::Text => ElementKind::Text {
                content: record.content,
            },
        };
        Ok(Self {
            id: record.id,
            kind,
            transform,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(content: &str) -> Element {
        Element {
            id: ElementId::from("text-1"),
            kind: ElementKind::Text {
                content: content.to_string(),
            },
            transform: Transform::new(150.0, 150.0, 200.0, 50.0),
        }
    }

    #[test]
    fn generated_ids_are_prefixed_and_unique() {
        let a = ElementId::generate("img");
        let b = ElementId::generate("img");
        assert!(a.as_str().starts_with("img-"));
        assert_ne!(a, b);
    }

    #[test]
    fn wire_format_is_flat() {
        let json = serde_json::to_value(text("Hi")).expect("serialize");
        assert_eq!(json["id"], "text-1");
        assert_eq!(json["type"], "text");
        assert_eq!(json["content"], "Hi");
        assert_eq!(json["x"], 150.0);
        assert_eq!(json["width"], 200.0);
        assert_eq!(json["rotation"], 0.0);
    }

    #[test]
    fn deserialize_rejects_zero_width() {
        let json = r#"{"id":"a","type":"image","content":"x.png","x":0,"y":0,"width":0,"height":10,"rotation":0}"#;
        let result: Result<Element, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn deserialize_defaults_missing_rotation() {
        let json = r#"{"id":"a","type":"image","content":"x.png","x":1,"y":2,"width":3,"height":4}"#;
        let element: Element = serde_json::from_str(json).expect("parse");
        assert_eq!(element.transform.rotation, 0.0);
        assert_eq!(
            element.kind,
            ElementKind::Image {
                src: "x.png".to_string()
            }
        );
    }

    #[test]
    fn patch_merges_only_given_fields() {
        let mut element = text("Hi");
        element
            .apply(ElementPatch {
                x: Some(10.0),
                rotation: Some(45.0),
                ..ElementPatch::default()
            })
            .expect("apply");
        assert_eq!(element.transform.x, 10.0);
        assert_eq!(element.transform.y, 150.0);
        assert_eq!(element.transform.rotation, 45.0);
        assert_eq!(element.kind.content(), "Hi");
    }

    #[test]
    fn rejected_patch_leaves_element_untouched() {
        let mut element = text("Hi");
        let before = element.clone();
        let result = element.apply(ElementPatch {
            content: Some("changed".to_string()),
            height: Some(-1.0),
            ..ElementPatch::default()
        });
        assert!(matches!(result, Err(CanvasError::InvalidElement(_))));
        assert_eq!(element, before);
    }

    #[test]
    fn non_finite_position_or_rotation_is_rejected() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let patches = [
                ElementPatch {
                    x: Some(value),
                    ..ElementPatch::default()
                },
                ElementPatch {
                    y: Some(value),
                    ..ElementPatch::default()
                },
                ElementPatch {
                    rotation: Some(value),
                    ..ElementPatch::default()
                },
            ];
            for patch in patches {
                let mut element = text("Hi");
                let before = element.clone();
                assert!(matches!(
                    element.apply(patch),
                    Err(CanvasError::InvalidElement(_))
                ));
                assert_eq!(element, before);
            }
            assert!(Transform::new(value, 0.0, 1.0, 1.0).validate().is_err());
            assert!(Transform::new(0.0, value, 1.0, 1.0).validate().is_err());
            assert!(Transform::new(0.0, 0.0, 1.0, 1.0)
                .with_rotation(value)
                .validate()
                .is_err());
        }
    }

    #[test]
    fn content_patch_replaces_image_source() {
        let mut element = Element {
            id: ElementId::from("img-1"),
            kind: ElementKind::Image {
                src: "a.png".to_string(),
            },
            transform: Transform::new(0.0, 0.0, 10.0, 10.0),
        };
        element.apply(ElementPatch::content("b.png")).expect("apply");
        assert_eq!(element.kind.content(), "b.png");
        assert_eq!(element.kind.type_name(), "image");
    }

    #[test]
    fn rotation_normalization() {
        let t = Transform::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(t.with_rotation(370.0).normalized_rotation(), 10.0);
        assert_eq!(t.with_rotation(-90.0).normalized_rotation(), 270.0);
        assert_eq!(t.with_rotation(720.0).normalized_rotation(), 0.0);
    }

    #[test]
    fn contains_point_is_edge_inclusive() {
        let element = text("Hi");
        assert!(element.contains_point(Point::new(150.0, 150.0)));
        assert!(element.contains_point(Point::new(350.0, 200.0)));
        assert!(!element.contains_point(Point::new(350.1, 200.0)));
    }
}
