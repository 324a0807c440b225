//! The single active element, a view-only concern.

use crate::ElementId;

/// At most one selected element id. Never persisted with the scene.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(Option<ElementId>);

impl Selection {
    /// An empty selection.
    #[must_use]
    pub fn none() -> Self {
        Self(None)
    }

    /// Select `id`, replacing any previous selection.
    pub fn select(&mut self, id: ElementId) {
        self.0 = Some(id);
    }

    /// Clear the selection. Returns `true` if something was selected.
    pub fn clear(&mut self) -> bool {
        self.0.take().is_some()
    }

    /// Clear the selection only if it names `id`.
    ///
    /// Used when an element is deleted: removing a non-selected element
    /// must leave the selection alone.
    pub fn forget(&mut self, id: &ElementId) -> bool {
        if self.is_selected(id) {
            self.0 = None;
            true
        } else {
            false
        }
    }

    /// Currently selected id.
    #[must_use]
    pub fn current(&self) -> Option<&ElementId> {
        self.0.as_ref()
    }

    /// Whether `id` is the selected element.
    #[must_use]
    pub fn is_selected(&self, id: &ElementId) -> bool {
        self.0.as_ref() == Some(id)
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}
