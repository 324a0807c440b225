//! # Design Core
//!
//! Scene model and interaction logic for the apparel design canvas.
//! Everything here is plain data and pure functions; drawing lives in
//! `design-renderer` and the studio workflow in `design-studio`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 design-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Scene Model      │  Interaction            │
//! │  - Elements       │  - Drag state machine   │
//! │  - Transforms     │  - Delete key           │
//! │  - JSON wire form │  - Scoped key handlers  │
//! ├─────────────────────────────────────────────┤
//! │  Geometry         │  Product                │
//! │  - Pointer map    │  - Garment options      │
//! │  - Hit testing    │  - Price list           │
//! │  - Drag clamping  │                         │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod element;
pub mod error;
pub mod event;
pub mod geometry;
pub mod interaction;
pub mod keyboard;
pub mod product;
pub mod scene;
pub mod selection;

pub use element::{Element, ElementId, ElementKind, ElementPatch, Transform};
pub use error::{CanvasError, CanvasResult};
pub use event::{InputEvent, Key, KeyEvent, KeyModifiers};
pub use geometry::{
    apply_drag, hit_test, hit_test_id, map_pointer, CanvasSize, DisplayRect, Point, Rect, Rotation,
};
pub use interaction::{DragState, Interaction, Response};
pub use keyboard::{KeySubscription, KeyboardHub};
pub use product::{
    GarmentColor, GarmentSize, Placement, Price, PriceList, ProductContext, ProductType,
};
pub use scene::Scene;
pub use selection::Selection;

/// Design core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
