//! # Design Studio
//!
//! The custom apparel design studio: a shared design, a canvas editor mounted
//! on it, and the product, pricing and checkout workflow around it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Studio                             │
//! │  product type / color / size / placement · design name      │
//! │  add image (background removal) · add text · edit · price   │
//! ├──────────────────────────────┬──────────────────────────────┤
//! │ Rc<RefCell<DesignState>>     │ collaborators (optional)     │
//! │  Scene · Selection ·         │  BackgroundRemover           │
//! │  ProductContext · Interaction│  DesignRepository            │
//! │            ▲                 │  CartService                 │
//! │            │                 └──────────────────────────────┘
//! │  CanvasEditor (mounted)                                     │
//! │   KeySubscription · AssetLoader · Renderer · last frame     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything runs on one thread. The only suspending work is background
//! removal, collaborator calls and image loads; none of them hold a borrow
//! of the design while suspended.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod collaborators;
pub mod config;
pub mod editor;
pub mod error;
pub mod studio;

pub use collaborators::{
    BackgroundRemover, CartLineItem, CartService, CartVariant, DesignRecord, DesignRepository,
    InMemoryCart, InMemoryDesignRepository, RemovalOutcome, SavedDesign,
};
pub use config::StudioConfig;
pub use editor::{CanvasEditor, DesignState};
pub use error::{StudioError, StudioResult};
pub use studio::{ImageUpload, Notice, Studio};
