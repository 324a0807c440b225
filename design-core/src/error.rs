//! Error types for canvas operations.

use thiserror::Error;

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in canvas operations.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Element has a non-finite position or rotation, or a non-positive size.
    #[error("Invalid element: {0}")]
    InvalidElement(String),

    /// Display rectangle cannot map pointers (zero or non-finite size).
    #[error("Invalid display rectangle: {0}")]
    InvalidDisplay(String),

    /// Element not found in scene.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Two elements in a deserialized scene share an id.
    #[error("Duplicate element id: {0}")]
    DuplicateElement(String),

    /// A product option string did not name a known value.
    #[error("Unknown {field}: {value}")]
    UnknownOption {
        /// Which product option was being parsed.
        field: &'static str,
        /// The rejected input.
        value: String,
    },

    /// Scene serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
