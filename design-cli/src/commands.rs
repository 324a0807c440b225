//! Subcommand implementations.

use std::path::Path;
use std::rc::Rc;

use anyhow::Context;
use design_core::KeyboardHub;
use design_renderer::{FrameStats, MockupCatalog};
use design_studio::{Studio, StudioConfig};

use crate::{CliArgs, Command, DesignFile, HostAssetSource, PriceArgs, ProductArgs, RenderArgs};

/// Run a parsed command line. Returns what to print on stdout.
///
/// # Errors
///
/// Returns an error if the config or design cannot be loaded, or the
/// output cannot be written.
pub async fn run(args: CliArgs) -> anyhow::Result<String> {
    let config = load_config(args.config.as_deref())?;
    match args.command {
        Command::Render(render_args) => {
            let stats = render(config, &render_args).await?;
            Ok(format!(
                "Wrote {} ({} images, {} placeholders, {} text lines)",
                render_args.output.display(),
                stats.images_drawn,
                stats.placeholders,
                stats.text_lines
            ))
        }
        Command::Price(price_args) => price(config, &price_args).await,
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<StudioConfig> {
    match path {
        Some(path) => StudioConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(StudioConfig::default()),
    }
}

async fn open_design(
    config: StudioConfig,
    path: &Path,
    product: &ProductArgs,
) -> anyhow::Result<Studio> {
    let design = DesignFile::read(path).await?;
    let studio = Studio::new(config)?;
    design.apply_to(&studio);

    if let Some(product_type) = product.product {
        studio.set_product_type(product_type);
    }
    if let Some(color) = product.color {
        studio.set_color(color);
    }
    if let Some(size) = product.size {
        studio.set_size(size);
    }
    if let Some(placement) = product.placement {
        studio.set_placement(placement);
    }
    Ok(studio)
}

/// Render a design file, waiting for every image to load or fail first.
///
/// # Errors
///
/// Returns an error if the design cannot be loaded, the frame cannot be
/// drawn, or the output cannot be written.
pub async fn render(mut config: StudioConfig, args: &RenderArgs) -> anyhow::Result<FrameStats> {
    if let Some(scale) = args.scale {
        config.renderer.scale = scale;
    }
    if args.no_system_fonts {
        config.renderer.load_system_fonts = false;
    }
    if args.no_mockup {
        config.mockups = MockupCatalog::empty();
    }

    let studio = open_design(config, &args.design, &args.product).await?;
    let base_dir = args
        .design
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let source = HostAssetSource::new(base_dir)?;

    // Nothing dispatches keys in a one-shot render.
    let keys = KeyboardHub::new();
    studio.mount_editor(&keys, Rc::new(source))?;
    let loaded = studio.settle_assets().await;
    tracing::debug!("{loaded} assets settled");

    let svg_output = args
        .output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
    let (bytes, stats) = {
        let editor = studio.editor().context("editor not mounted")?;
        let stats = editor.redraw()?;
        let bytes = if svg_output {
            editor.compose_svg().into_bytes()
        } else {
            editor.frame_png()?.context("no frame drawn")?
        };
        (bytes, stats)
    };

    tokio::fs::write(&args.output, bytes)
        .await
        .with_context(|| format!("writing {}", args.output.display()))?;
    tracing::info!(
        "Rendered {} to {}",
        args.design.display(),
        args.output.display()
    );
    Ok(stats)
}

/// Price a design file.
///
/// # Errors
///
/// Returns an error if the design cannot be loaded.
pub async fn price(config: StudioConfig, args: &PriceArgs) -> anyhow::Result<String> {
    let studio = open_design(config, &args.design, &args.product).await?;
    if args.json {
        return Ok(serde_json::to_string_pretty(&studio.cart_line_item())?);
    }
    let product = studio.product().product_type;
    Ok(format!(
        "{} with {}: {}",
        product.label(),
        studio.scene().count_label(),
        studio.compute_price()
    ))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use design_core::ProductType;

    use super::*;

    /// 1x1 red PNG as a data URI.
    fn red_pixel_uri() -> String {
        design_renderer::TextureData {
            width: 1,
            height: 1,
            data: vec![255, 0, 0, 255],
            format: design_renderer::image::ImageFormat::Png,
        }
        .to_png_data_uri()
        .expect("encode")
    }

    fn write_design(dir: &Path) -> PathBuf {
        let scene = format!(
            r#"{{"elements":[
                {{"id":"img-1","type":"image","content":"{}","x":100,"y":100,"width":200,"height":200,"rotation":0}},
                {{"id":"img-2","type":"image","content":"missing.png","x":0,"y":0,"width":50,"height":50,"rotation":0}}
            ]}}"#,
            red_pixel_uri()
        );
        let path = dir.join("design.json");
        std::fs::write(&path, scene).expect("write design");
        path
    }

    fn render_args(design: PathBuf, output: PathBuf) -> RenderArgs {
        RenderArgs {
            design,
            output,
            scale: None,
            no_system_fonts: true,
            no_mockup: true,
            product: ProductArgs::default(),
        }
    }

    #[tokio::test]
    async fn test_render_png_with_missing_asset() {
        let dir = tempfile::tempdir().expect("tempdir");
        let design = write_design(dir.path());
        let output = dir.path().join("out.png");

        let stats = render(StudioConfig::default(), &render_args(design, output.clone()))
            .await
            .expect("render");
        assert_eq!(stats.images_drawn, 1);
        assert_eq!(stats.placeholders, 1);

        let png = std::fs::read(output).expect("output");
        assert_eq!(&png[0..4], &[137, 80, 78, 71]);
    }

    #[tokio::test]
    async fn test_render_svg_by_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let design = write_design(dir.path());
        let output = dir.path().join("out.svg");

        render(StudioConfig::default(), &render_args(design, output.clone()))
            .await
            .expect("render");
        let svg = std::fs::read_to_string(output).expect("output");
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<image"));
    }

    #[tokio::test]
    async fn test_price_with_override() {
        let dir = tempfile::tempdir().expect("tempdir");
        let design = write_design(dir.path());
        let args = PriceArgs {
            design,
            json: false,
            product: ProductArgs {
                product: Some(ProductType::Hoodie),
                ..ProductArgs::default()
            },
        };

        let line = price(StudioConfig::default(), &args).await.expect("price");
        assert_eq!(line, "Hoodie with 2 elements: $53.99");
    }

    #[tokio::test]
    async fn test_price_json_is_cart_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        let args = PriceArgs {
            design: write_design(dir.path()),
            json: true,
            product: ProductArgs::default(),
        };

        let json = price(StudioConfig::default(), &args).await.expect("price");
        let value: serde_json::Value = serde_json::from_str(&json).expect("json");
        assert_eq!(value["name"], "Custom tshirt");
        assert_eq!(value["price"], 28.99);
    }
}
