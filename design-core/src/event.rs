//! Input events for canvas interaction.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// A keyboard key, as far as the editor cares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Key {
    /// The Delete key.
    Delete,
    /// The Backspace key.
    Backspace,
    /// The Escape key.
    Escape,
    /// Any other key, by its browser key name.
    Other(String),
}

impl Key {
    /// Parse a browser `KeyboardEvent.key` name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "Delete" => Self::Delete,
            "Backspace" => Self::Backspace,
            "Escape" => Self::Escape,
            other => Self::Other(other.to_string()),
        }
    }

    /// Browser key name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Delete => "Delete",
            Self::Backspace => "Backspace",
            Self::Escape => "Escape",
            Self::Other(name) => name,
        }
    }

    /// Whether this key deletes the selected element.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete | Self::Backspace)
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::from_name(&value)
    }
}

impl From<Key> for String {
    fn from(value: Key) -> Self {
        value.name().to_string()
    }
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    pub shift: bool,
    /// Control key pressed.
    pub ctrl: bool,
    /// Alt/Option key pressed.
    pub alt: bool,
    /// Meta/Command key pressed.
    pub meta: bool,
}

/// A key press delivered by the global input surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// The key.
    pub key: Key,
    /// Active modifier keys.
    #[serde(default)]
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    /// A key press without modifiers.
    #[must_use]
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::default(),
        }
    }
}

/// Pointer and keyboard input the editor reacts to.
///
/// Pointer positions are in whatever space the receiver expects: the
/// editor takes display space and maps it, the interaction state machine
/// takes canvas space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum InputEvent {
    /// Primary button pressed.
    PointerDown(Point),
    /// Pointer moved.
    PointerMove(Point),
    /// Primary button released.
    PointerUp,
    /// Pointer left the drawing surface.
    PointerLeave,
    /// Keyboard key pressed.
    Key(KeyEvent),
}
