//! Ordered scene of design elements.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{CanvasError, CanvasResult, Element, ElementId, ElementKind, ElementPatch, Transform};

/// A design: the ordered list of elements placed on the canvas.
///
/// Insertion order is z-order. The scene is the unit of persistence and
/// serializes as `{"elements": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scene {
    elements: Vec<Element>,
}

impl Scene {
    /// Create a new empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from already-identified elements, validating ids and sizes.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::DuplicateElement`] if two elements share an id,
    /// or [`CanvasError::InvalidElement`] if any transform is invalid.
    pub fn from_elements(elements: Vec<Element>) -> CanvasResult<Self> {
        let mut seen = HashSet::with_capacity(elements.len());
        for element in &elements {
            element.transform.validate()?;
            if !seen.insert(&element.id) {
                return Err(CanvasError::DuplicateElement(element.id.to_string()));
            }
        }
        Ok(Self { elements })
    }

    /// Append an element with a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidElement`] if the transform is invalid
    /// (see [`Transform::validate`]); the scene is unchanged in that case.
    pub fn add_element(
        &mut self,
        kind: ElementKind,
        transform: Transform,
    ) -> CanvasResult<ElementId> {
        transform.validate()?;
        let mut id = ElementId::generate(kind.type_name());
        while self.contains(&id) {
            id = ElementId::generate(kind.type_name());
        }
        tracing::debug!("Adding {} element {id}", kind.type_name());
        self.elements.push(Element {
            id: id.clone(),
            kind,
            transform,
        });
        Ok(id)
    }

    /// Merge a patch into an element.
    ///
    /// No clamping happens here; callers that move elements interactively
    /// clamp before patching.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ElementNotFound`] if the id is absent, or
    /// [`CanvasError::InvalidElement`] if the patched transform would be
    /// invalid.
    pub fn update_element(&mut self, id: &ElementId, patch: ElementPatch) -> CanvasResult<()> {
        let element = self
            .get_element_mut(id)
            .ok_or_else(|| CanvasError::ElementNotFound(id.to_string()))?;
        element.apply(patch)
    }

    /// Remove an element from the scene, preserving the order of the rest.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn remove_element(&mut self, id: &ElementId) -> CanvasResult<Element> {
        let index = self
            .index_of(id)
            .ok_or_else(|| CanvasError::ElementNotFound(id.to_string()))?;
        Ok(self.elements.remove(index))
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get_element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| &e.id == id)
    }

    /// Get a mutable reference to an element by ID.
    pub fn get_element_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| &e.id == id)
    }

    /// Position of an element in z-order.
    #[must_use]
    pub fn index_of(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| &e.id == id)
    }

    /// Whether an element with this id exists.
    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.index_of(id).is_some()
    }

    /// Elements bottom to top.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Get the number of elements in the scene.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Check if the scene is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Human label for the element count, e.g. `"1 element"`, `"3 elements"`.
    #[must_use]
    pub fn count_label(&self) -> String {
        match self.elements.len() {
            1 => "1 element".to_string(),
            n => format!("{n} elements"),
        }
    }

    /// Serialize the scene to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        serde_json::to_string(self).map_err(CanvasError::Serialization)
    }

    /// Deserialize a scene from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, an element is invalid,
    /// or two elements share an id.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        let wire: SceneRecord = serde_json::from_str(json)?;
        Self::from_elements(wire.elements)
    }
}

#[derive(Deserialize)]
struct SceneRecord {
    #[serde(default)]
    elements: Vec<Element>,
}

impl<'de> Deserialize<'de> for Scene {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let wire = SceneRecord::deserialize(deserializer)?;
        Self::from_elements(wire.elements).map_err(serde::de::Error::custom)
    }
}
