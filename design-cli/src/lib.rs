//! # Design Studio CLI
//!
//! Command-line host for the design studio.
//!
//! ## Usage
//!
//! ```bash
//! # Render a saved design to PNG (or SVG by extension)
//! design-studio render design.json -o preview.png
//!
//! # Price a design as another product
//! design-studio price design.json --product hoodie
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `DesignFile` - Saved design record or bare scene
//! - `HostAssetSource` - Images from data URIs, HTTP(S) and local files
//! - `commands` - Runs a studio with a mounted editor and writes the frame

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assets;
pub mod commands;
pub mod design_file;

pub use assets::HostAssetSource;
pub use design_file::{DesignFile, DesignFileError};

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use design_core::{GarmentColor, GarmentSize, Placement, ProductType};

/// Command-line arguments for design-studio.
#[derive(Debug, Clone, Parser)]
#[command(name = "design-studio")]
#[command(about = "Render and price custom apparel designs")]
#[command(version)]
pub struct CliArgs {
    /// Studio configuration file (JSON)
    #[arg(long, global = true, env = "DESIGN_STUDIO_CONFIG")]
    pub config: Option<PathBuf>,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Render a design to PNG or SVG
    Render(RenderArgs),
    /// Print the price of a design
    Price(PriceArgs),
}

/// Product options that override those stored in a design record.
#[derive(Debug, Clone, Default, Args)]
pub struct ProductArgs {
    /// Garment type (tshirt, hoodie, tank, longsleeve)
    #[arg(long)]
    pub product: Option<ProductType>,

    /// Garment color (black, white, navy, gray, red, blue, green)
    #[arg(long)]
    pub color: Option<GarmentColor>,

    /// Garment size (XS, S, M, L, XL, XXL)
    #[arg(long)]
    pub size: Option<GarmentSize>,

    /// Print placement (front, back, left-sleeve, right-sleeve)
    #[arg(long)]
    pub placement: Option<Placement>,
}

/// Arguments for `render`.
#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// Design record or scene JSON
    pub design: PathBuf,

    /// Output file; `.svg` writes SVG, anything else PNG
    #[arg(short, long, default_value = "design.png")]
    pub output: PathBuf,

    /// Output pixels per canvas unit
    #[arg(long)]
    pub scale: Option<f32>,

    /// Do not load system fonts (text is not drawn)
    #[arg(long)]
    pub no_system_fonts: bool,

    /// Draw without the garment mockup
    #[arg(long)]
    pub no_mockup: bool,

    /// Product overrides
    #[command(flatten)]
    pub product: ProductArgs,
}

/// Arguments for `price`.
#[derive(Debug, Clone, Args)]
pub struct PriceArgs {
    /// Design record or scene JSON
    pub design: PathBuf,

    /// Print the cart line item as JSON instead of the price
    #[arg(long)]
    pub json: bool,

    /// Product overrides
    #[command(flatten)]
    pub product: ProductArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render_with_overrides() {
        let args = CliArgs::try_parse_from([
            "design-studio",
            "render",
            "design.json",
            "-o",
            "out.svg",
            "--product",
            "hoodie",
            "--placement",
            "left-sleeve",
            "--size",
            "XL",
        ])
        .expect("parse");

        let Command::Render(render) = args.command else {
            panic!("expected render");
        };
        assert_eq!(render.output, PathBuf::from("out.svg"));
        assert_eq!(render.product.product, Some(ProductType::Hoodie));
        assert_eq!(render.product.placement, Some(Placement::LeftSleeve));
        assert_eq!(render.product.size, Some(GarmentSize::Xl));
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let result =
            CliArgs::try_parse_from(["design-studio", "price", "d.json", "--color", "mauve"]);
        assert!(result.is_err());
    }
}
