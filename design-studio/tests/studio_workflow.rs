//! Integration tests for the design studio workflow (design-studio).
//!
//! Drives a studio with a mounted editor the way a storefront page would:
//! uploads, pointer drags, the Delete key, asset loading, save and cart.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use design_core::{
    DisplayRect, ElementPatch, GarmentColor, Key, KeyEvent, KeyboardHub, Placement, Point,
    ProductType, Response, Scene,
};
use design_renderer::{
    AssetSource, DataUriSource, MockupCatalog, RenderError, RenderResult, RendererConfig,
    TextureData,
};
use design_studio::{
    CartService, DesignRepository, ImageUpload, InMemoryCart, InMemoryDesignRepository, Notice,
    Studio, StudioConfig, StudioError,
};
use futures::channel::oneshot;
use futures::executor::block_on;

fn config() -> StudioConfig {
    StudioConfig {
        renderer: RendererConfig {
            load_system_fonts: false,
            ..RendererConfig::default()
        },
        mockups: MockupCatalog::empty(),
        ..StudioConfig::default()
    }
}

/// 2x2 opaque green PNG.
fn green_png() -> Vec<u8> {
    TextureData {
        width: 2,
        height: 2,
        data: [0u8, 255, 0, 255].repeat(4),
        format: design_renderer::image::ImageFormat::Png,
    }
    .to_png()
    .expect("encode")
}

fn mounted(studio: &Studio, hub: &KeyboardHub) {
    studio
        .mount_editor(hub, Rc::new(DataUriSource))
        .expect("mount");
}

fn pixel(studio: &Studio, x: u32, y: u32) -> (u8, u8, u8) {
    studio
        .editor()
        .expect("mounted")
        .with_frame(|frame| {
            let px = frame.pixmap.pixel(x, y).expect("in bounds");
            (px.red(), px.green(), px.blue())
        })
        .expect("frame drawn")
}

// ==========================================================================
// Editing
// ==========================================================================

#[test]
fn test_upload_drag_and_delete() {
    let studio = Studio::new(config()).expect("studio");
    let hub = KeyboardHub::new();
    mounted(&studio, &hub);

    let id = block_on(studio.add_image_element(ImageUpload::File {
        bytes: green_png(),
        mime: "image/png".to_string(),
    }))
    .expect("upload");
    block_on(studio.settle_assets());
    assert_eq!(pixel(&studio, 200, 200), (0, 255, 0));

    {
        let editor = studio.editor().expect("mounted");
        assert!(matches!(editor.pointer_down(Point::new(150.0, 150.0)), Response::Selected(_)));
        editor.pointer_move(Point::new(200.0, 120.0));
        editor.pointer_up();
    }
    let moved = studio.selected_element().expect("still selected");
    assert_eq!(moved.id, id);
    assert_eq!((moved.transform.x, moved.transform.y), (150.0, 70.0));
    // The image followed the drag.
    assert_eq!(pixel(&studio, 340, 260), (0, 255, 0));

    assert!(hub.dispatch(&KeyEvent::new(Key::Delete)));
    assert!(studio.scene().is_empty());
    assert!(studio.editor().expect("mounted").shows_empty_hint());
    assert_ne!(pixel(&studio, 200, 200), (0, 255, 0));
}

#[test]
fn test_drag_clamps_at_canvas_edge() {
    let studio = Studio::new(config()).expect("studio");
    let hub = KeyboardHub::new();
    mounted(&studio, &hub);

    let id = block_on(studio.add_image_element(ImageUpload::Url(
        "data:image/png;base64,AAAA".to_string(),
    )))
    .expect("upload");
    studio
        .update_element(&id, ElementPatch::position(300.0, 400.0))
        .expect("moved");

    let editor = studio.editor().expect("mounted");
    editor.pointer_down(Point::new(350.0, 450.0));
    editor.pointer_move(Point::new(450.0, 550.0));
    editor.pointer_leave();
    drop(editor);

    let element = studio.selected_element().expect("selected");
    assert_eq!((element.transform.x, element.transform.y), (200.0, 300.0));
}

#[test]
fn test_scaled_display_maps_pointer() {
    let studio = Studio::new(config()).expect("studio");
    let hub = KeyboardHub::new();
    mounted(&studio, &hub);
    let id = studio.add_text_element().expect("text");

    let editor = studio.editor().expect("mounted");
    // Canvas displayed at twice its size.
    editor
        .set_display_rect(DisplayRect::new(0.0, 0.0, 800.0, 1000.0))
        .expect("display rect");
    assert!(matches!(
        editor.pointer_down(Point::new(320.0, 320.0)),
        Response::Selected(ref s) if *s == id
    ));
    editor.pointer_move(Point::new(340.0, 340.0));
    editor.pointer_up();
    drop(editor);

    let element = studio.selected_element().expect("selected");
    assert_eq!((element.transform.x, element.transform.y), (160.0, 160.0));
}

#[test]
fn test_remove_middle_of_three_keeps_order() {
    let studio = Studio::new(config()).expect("studio");
    let a = studio.add_text_element().expect("a");
    let b = studio.add_text_element().expect("b");
    let c = studio.add_text_element().expect("c");

    assert!(studio.delete_element(&b));
    let ids: Vec<_> = studio.scene().elements().iter().map(|e| e.id.clone()).collect();
    assert_eq!(ids, vec![a, c]);
}

// ==========================================================================
// Asset loading and teardown
// ==========================================================================

/// Asset source whose loads finish only when the test says so.
#[derive(Default)]
struct GatedSource {
    gates: RefCell<HashMap<String, oneshot::Sender<RenderResult<TextureData>>>>,
}

#[async_trait(?Send)]
impl AssetSource for GatedSource {
    async fn load(&self, source: &str) -> RenderResult<TextureData> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(source.to_string(), tx);
        rx.await
            .map_err(|_| RenderError::AssetLoad("cancelled".to_string()))?
    }
}

#[test]
fn test_unmount_cancels_in_flight_loads() {
    let studio = Studio::new(config()).expect("studio");
    let hub = KeyboardHub::new();
    let source = Rc::new(GatedSource::default());
    studio
        .mount_editor(&hub, Rc::clone(&source) as Rc<dyn AssetSource>)
        .expect("mount");

    let upload = ImageUpload::Url("https://cdn.example.com/a.png".to_string());
    block_on(studio.add_image_element(upload)).expect("upload");
    let editor_pending = studio.editor().expect("mounted").has_pending_assets();
    assert!(editor_pending);
    assert_eq!(source.gates.borrow().len(), 1);

    assert!(studio.unmount_editor());
    assert_eq!(hub.subscriber_count(), 0);
    let (_, sender) = source.gates.borrow_mut().drain().next().expect("gate");
    assert!(sender.is_canceled());

    // The design itself is untouched and still prices.
    assert_eq!(studio.scene().element_count(), 1);
    assert_eq!(studio.compute_price().cents(), 2699);
}

#[test]
fn test_failed_image_becomes_placeholder() {
    let studio = Studio::new(config()).expect("studio");
    let hub = KeyboardHub::new();
    mounted(&studio, &hub);

    block_on(studio.add_image_element(ImageUpload::Url(
        "https://cdn.example.com/unreachable.png".to_string(),
    )))
    .expect("upload");
    block_on(studio.settle_assets());

    let stats = studio.editor().expect("mounted").frame_stats().expect("frame");
    assert_eq!(stats.placeholders, 1);
    assert_eq!(stats.images_pending, 0);
    assert_eq!(pixel(&studio, 105, 105), (0xf0, 0xf0, 0xf0));
}

// ==========================================================================
// Checkout
// ==========================================================================

#[test]
fn test_save_then_cart() {
    let repository = Rc::new(InMemoryDesignRepository::new());
    let cart = Rc::new(InMemoryCart::new());
    let studio = Studio::new(config())
        .expect("studio")
        .with_repository(Rc::clone(&repository) as Rc<dyn DesignRepository>)
        .with_cart(Rc::clone(&cart) as Rc<dyn CartService>);

    assert!(matches!(block_on(studio.add_to_cart()), Err(StudioError::EmptyDesign)));

    studio.add_text_element().expect("text");
    studio.add_text_element().expect("text");
    studio.set_product_type(ProductType::Longsleeve);
    studio.set_color(GarmentColor::White);
    studio.set_placement(Placement::Back);
    studio.set_design_name("Team Shirt");

    let saved = block_on(studio.save()).expect("save");
    let (_, record) = repository.designs().remove(0);
    assert_eq!(record.price, "33.99");
    assert_eq!(record.placement, Placement::Back);

    // What was persisted loads back as the same design.
    let json = serde_json::to_string(&record).expect("serialize");
    let value: serde_json::Value = serde_json::from_str(&json).expect("json");
    let scene = Scene::from_json(&value["designData"].to_string()).expect("scene");
    assert_eq!(&scene, &*studio.scene());

    let item = block_on(studio.add_to_cart()).expect("cart");
    assert_eq!(item.name, "Team Shirt");
    assert!((item.price - 33.99).abs() < 1e-9);
    assert_eq!(item.variant.color, GarmentColor::White);
    assert_eq!(cart.items().len(), 1);

    assert_eq!(
        studio.drain_notices(),
        vec![
            Notice::DesignSaved { id: saved.id },
            Notice::AddedToCart { id: item.id },
        ]
    );
    assert!(studio.drain_notices().is_empty());
}
