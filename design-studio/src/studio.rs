//! The studio controller: product settings, image intake, pricing, save and
//! add-to-cart around a shared design.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use design_core::{
    CanvasError, Element, ElementId, ElementKind, ElementPatch, GarmentColor, GarmentSize,
    Interaction, KeyboardHub, Placement, Price, ProductContext, ProductType, Scene,
};
use design_renderer::image::{encode_data_uri, is_image_mime};
use design_renderer::{AssetSource, Renderer};
use uuid::Uuid;

use crate::collaborators::{
    BackgroundRemover, CartLineItem, CartService, CartVariant, DesignRecord, DesignRepository,
    RemovalOutcome, SavedDesign,
};
use crate::config::StudioConfig;
use crate::editor::{self, CanvasEditor, DesignState};
use crate::error::{StudioError, StudioResult};

/// An image handed to [`Studio::add_image_element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageUpload {
    /// Encoded file bytes from the user's machine.
    File {
        /// Encoded image.
        bytes: Vec<u8>,
        /// Declared MIME type, e.g. `image/png`.
        mime: String,
    },
    /// An image already hosted somewhere; used as-is.
    Url(String),
}

/// Non-blocking message for the user, in the order things happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// An uploaded image was placed on the canvas.
    ImageAdded {
        /// New element.
        id: ElementId,
        /// Whether the background was removed.
        background_removed: bool,
    },
    /// Background removal failed; the original upload was used.
    BackgroundRemovalFailed {
        /// Why removal failed.
        reason: String,
    },
    /// The design was saved.
    DesignSaved {
        /// Record id from persistence.
        id: String,
    },
    /// The design was added to the cart.
    AddedToCart {
        /// Cart line id.
        id: String,
    },
}

#[derive(Debug, Default)]
struct Settings {
    design_name: String,
    size: GarmentSize,
}

/// Clears the busy flag when image intake ends, however it ends.
struct BusyGuard<'a>(&'a Cell<bool>);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a Cell<bool>) -> StudioResult<Self> {
        if flag.replace(true) {
            return Err(StudioError::Busy);
        }
        Ok(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// The design studio.
///
/// Owns the design, product settings and design name. Collaborators are
/// passed in explicitly; any of them may be absent.
pub struct Studio {
    config: StudioConfig,
    state: Rc<RefCell<DesignState>>,
    settings: RefCell<Settings>,
    editor: RefCell<Option<CanvasEditor>>,
    remover: Option<Rc<dyn BackgroundRemover>>,
    repository: Option<Rc<dyn DesignRepository>>,
    cart: Option<Rc<dyn CartService>>,
    busy: Cell<bool>,
    notices: RefCell<Vec<Notice>>,
}

impl Studio {
    /// Create a studio with an empty design and no collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Config`] if the configuration is invalid.
    pub fn new(config: StudioConfig) -> StudioResult<Self> {
        config.validate()?;
        let interaction = Interaction::new(config.renderer.canvas);
        Ok(Self {
            config,
            state: Rc::new(RefCell::new(DesignState::new(interaction))),
            settings: RefCell::new(Settings::default()),
            editor: RefCell::new(None),
            remover: None,
            repository: None,
            cart: None,
            busy: Cell::new(false),
            notices: RefCell::new(Vec::new()),
        })
    }

    /// Use a background-removal service for file uploads.
    #[must_use]
    pub fn with_background_remover(mut self, remover: Rc<dyn BackgroundRemover>) -> Self {
        self.remover = Some(remover);
        self
    }

    /// Use a design repository for [`Self::save`].
    #[must_use]
    pub fn with_repository(mut self, repository: Rc<dyn DesignRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Use a cart for [`Self::add_to_cart`].
    #[must_use]
    pub fn with_cart(mut self, cart: Rc<dyn CartService>) -> Self {
        self.cart = Some(cart);
        self
    }

    /// Load an existing design, replacing the current one.
    pub fn load_scene(&self, scene: Scene) {
        {
            let mut state = self.state.borrow_mut();
            state.scene = scene;
            state.selection.clear();
            state.interaction.pointer_up();
        }
        self.refresh();
    }

    /// Get the studio configuration.
    #[must_use]
    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Editor lifecycle
    // -----------------------------------------------------------------------

    /// Mount a canvas editor, replacing (and unmounting) any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the renderer cannot be created.
    pub fn mount_editor(
        &self,
        keys: &KeyboardHub,
        assets: Rc<dyn AssetSource>,
    ) -> StudioResult<()> {
        let renderer =
            Renderer::new(self.config.renderer.clone())?.with_mockups(self.config.mockups.clone());
        // Unsubscribe the old editor before the new one subscribes.
        self.editor.borrow_mut().take();
        let editor = CanvasEditor::mount(Rc::clone(&self.state), keys, renderer, assets);
        *self.editor.borrow_mut() = Some(editor);
        Ok(())
    }

    /// Unmount the editor. Returns `false` if none was mounted.
    pub fn unmount_editor(&self) -> bool {
        let editor = self.editor.borrow_mut().take();
        if editor.is_some() {
            tracing::debug!("Editor unmounted");
        }
        editor.is_some()
    }

    /// The mounted editor.
    #[must_use]
    pub fn editor(&self) -> Option<Ref<'_, CanvasEditor>> {
        Ref::filter_map(self.editor.borrow(), Option::as_ref).ok()
    }

    /// Wait for the mounted editor's image loads, redrawing as each lands.
    /// Unmounting meanwhile cancels the rest.
    pub async fn settle_assets(&self) -> usize {
        let Some(weak) = self.editor.borrow().as_ref().map(CanvasEditor::downgrade) else {
            return 0;
        };
        editor::settle(weak).await
    }

    fn refresh(&self) {
        if let Some(editor) = self.editor.borrow().as_ref() {
            editor.refresh();
        }
    }

    // -----------------------------------------------------------------------
    // Elements
    // -----------------------------------------------------------------------

    /// Add an uploaded image at the default image box.
    ///
    /// File uploads go through the background remover when there is one; if
    /// removal fails the original upload is used and a
    /// [`Notice::BackgroundRemovalFailed`] is recorded. URLs are used as-is.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::InvalidUpload`] for non-image files and
    /// [`StudioError::Busy`] while another upload is being processed.
    pub async fn add_image_element(&self, upload: ImageUpload) -> StudioResult<ElementId> {
        if let ImageUpload::File { mime, .. } = &upload {
            if !is_image_mime(mime) {
                return Err(StudioError::InvalidUpload(mime.clone()));
            }
        }
        let _busy = BusyGuard::acquire(&self.busy)?;

        let (src, background_removed) = match upload {
            ImageUpload::Url(url) => (url, false),
            ImageUpload::File { bytes, mime } => self.process_upload(&bytes, &mime).await,
        };

        let id = self.state.borrow_mut().scene.add_element(
            ElementKind::Image { src },
            self.config.default_image_box,
        )?;
        tracing::debug!("Image {id} added (background removed: {background_removed})");
        self.notify(Notice::ImageAdded {
            id: id.clone(),
            background_removed,
        });
        self.refresh();
        Ok(id)
    }

    async fn process_upload(&self, bytes: &[u8], mime: &str) -> (String, bool) {
        let Some(remover) = self.remover.clone() else {
            return (encode_data_uri(mime, bytes), false);
        };
        let removed = remover
            .remove_background(bytes, mime)
            .await
            .and_then(RemovalOutcome::into_image_data);
        match removed {
            Ok(data) => (format!("data:image/png;base64,{data}"), true),
            Err(e) => {
                tracing::warn!("Using original upload: {e}");
                self.notify(Notice::BackgroundRemovalFailed {
                    reason: e.to_string(),
                });
                (encode_data_uri(mime, bytes), false)
            }
        }
    }

    /// Add the default text at the default text box.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured text box is invalid.
    pub fn add_text_element(&self) -> StudioResult<ElementId> {
        let id = self.state.borrow_mut().scene.add_element(
            ElementKind::Text {
                content: self.config.default_text.clone(),
            },
            self.config.default_text_box,
        )?;
        self.refresh();
        Ok(id)
    }

    /// Edit an element's properties. Returns `false` if there is no such
    /// element.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Canvas`] if the patch would leave the element
    /// with a non-positive size; the element is unchanged.
    pub fn update_element(&self, id: &ElementId, patch: ElementPatch) -> StudioResult<bool> {
        let result = self.state.borrow_mut().scene.update_element(id, patch);
        match result {
            Ok(()) => {
                self.refresh();
                Ok(true)
            }
            Err(CanvasError::ElementNotFound(_)) => {
                tracing::debug!("Update of missing element {id} ignored");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove an element, deselecting it. Returns `false` if there was no
    /// such element.
    pub fn delete_element(&self, id: &ElementId) -> bool {
        let removed = {
            let mut state = self.state.borrow_mut();
            state.selection.forget(id);
            state.scene.remove_element(id).is_ok()
        };
        if removed {
            self.refresh();
        }
        removed
    }

    /// Remove every element.
    pub fn clear(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.scene.clear();
            state.selection.clear();
            state.interaction.pointer_up();
        }
        tracing::debug!("Design cleared");
        self.refresh();
    }

    /// Select an element. Returns `false` if there is no such element.
    pub fn select(&self, id: &ElementId) -> bool {
        let selected = {
            let mut state = self.state.borrow_mut();
            if state.scene.contains(id) {
                state.selection.select(id.clone());
                true
            } else {
                false
            }
        };
        if selected {
            self.refresh();
        }
        selected
    }

    /// Clear the selection.
    pub fn clear_selection(&self) {
        if self.state.borrow_mut().selection.clear() {
            self.refresh();
        }
    }

    /// The selected element, for a properties form.
    #[must_use]
    pub fn selected_element(&self) -> Option<Element> {
        let state = self.state.borrow();
        let id = state.selection.current()?;
        state.scene.get_element(id).cloned()
    }

    /// The current design.
    #[must_use]
    pub fn scene(&self) -> Ref<'_, Scene> {
        Ref::map(self.state.borrow(), |state| &state.scene)
    }

    /// Shared design state, for hosts that drive the editor themselves.
    #[must_use]
    pub fn state(&self) -> Rc<RefCell<DesignState>> {
        Rc::clone(&self.state)
    }

    // -----------------------------------------------------------------------
    // Product settings
    // -----------------------------------------------------------------------

    /// Product options the renderer draws with.
    #[must_use]
    pub fn product(&self) -> ProductContext {
        self.state.borrow().product
    }

    /// Change the garment type; the mockup follows.
    pub fn set_product_type(&self, product_type: ProductType) {
        self.state.borrow_mut().product.product_type = product_type;
        self.refresh();
    }

    /// Change the garment color.
    pub fn set_color(&self, color: GarmentColor) {
        self.state.borrow_mut().product.color = color;
        self.refresh();
    }

    /// Change the print placement.
    pub fn set_placement(&self, placement: Placement) {
        self.state.borrow_mut().product.placement = placement;
        self.refresh();
    }

    /// Garment size.
    #[must_use]
    pub fn size(&self) -> GarmentSize {
        self.settings.borrow().size
    }

    /// Change the garment size.
    pub fn set_size(&self, size: GarmentSize) {
        self.settings.borrow_mut().size = size;
    }

    /// Design name.
    #[must_use]
    pub fn design_name(&self) -> String {
        self.settings.borrow().design_name.clone()
    }

    /// Change the design name.
    pub fn set_design_name(&self, name: impl Into<String>) {
        self.settings.borrow_mut().design_name = name.into();
    }

    /// Whether an image upload is being processed.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    // -----------------------------------------------------------------------
    // Price, save and cart
    // -----------------------------------------------------------------------

    /// Base price of the garment plus the per-element surcharge.
    #[must_use]
    pub fn compute_price(&self) -> Price {
        let state = self.state.borrow();
        self.config
            .prices
            .price(state.product.product_type, state.scene.element_count())
    }

    /// The record [`Self::save`] hands to persistence.
    #[must_use]
    pub fn design_record(&self) -> DesignRecord {
        let price = self.compute_price();
        let state = self.state.borrow();
        let settings = self.settings.borrow();
        DesignRecord {
            name: settings.design_name.clone(),
            design_data: state.scene.clone(),
            product_type: state.product.product_type,
            color: state.product.color,
            size: settings.size,
            placement: state.product.placement,
            price: price.to_decimal_string(),
        }
    }

    /// Save the design. On success the stored name is adopted.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::MissingName`] if the name is blank, or the
    /// repository's error. Nothing is retried.
    pub async fn save(&self) -> StudioResult<SavedDesign> {
        if self.settings.borrow().design_name.trim().is_empty() {
            return Err(StudioError::MissingName);
        }
        let repository = self.repository.clone().ok_or_else(|| {
            StudioError::Persistence("no design repository configured".to_string())
        })?;

        let record = self.design_record();
        let saved = repository
            .save_design(&record)
            .await
            .inspect_err(|e| tracing::warn!("Save of {:?} failed: {e}", record.name))?;

        tracing::info!("Design saved as {} ({})", saved.id, saved.name);
        self.settings.borrow_mut().design_name.clone_from(&saved.name);
        self.notify(Notice::DesignSaved {
            id: saved.id.clone(),
        });
        Ok(saved)
    }

    /// The cart line [`Self::add_to_cart`] hands to the cart, with a fresh id.
    #[must_use]
    pub fn cart_line_item(&self) -> CartLineItem {
        let price = self.compute_price();
        let state = self.state.borrow();
        let settings = self.settings.borrow();
        let name = if settings.design_name.trim().is_empty() {
            format!("Custom {}", state.product.product_type)
        } else {
            settings.design_name.clone()
        };
        CartLineItem {
            id: format!("custom-{}", Uuid::new_v4().simple()),
            name,
            price: price.as_dollars(),
            variant: CartVariant {
                color: state.product.color,
                size: settings.size,
                placement: state.product.placement,
            },
        }
    }

    /// Add the design to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::EmptyDesign`] if there are no elements, or the
    /// cart's error. Nothing is retried.
    pub async fn add_to_cart(&self) -> StudioResult<CartLineItem> {
        if self.state.borrow().scene.is_empty() {
            return Err(StudioError::EmptyDesign);
        }
        let cart = self
            .cart
            .clone()
            .ok_or_else(|| StudioError::Cart("no cart configured".to_string()))?;

        let item = self.cart_line_item();
        cart.add_item(item.clone())
            .await
            .inspect_err(|e| tracing::warn!("Add to cart failed: {e}"))?;

        tracing::info!("Added {} to cart at {}", item.id, self.compute_price());
        self.notify(Notice::AddedToCart { id: item.id.clone() });
        Ok(item)
    }

    // -----------------------------------------------------------------------
    // Notices
    // -----------------------------------------------------------------------

    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }

    /// Take every notice recorded since the last call.
    pub fn drain_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.borrow_mut())
    }
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("elements", &self.state.borrow().scene.element_count())
            .field("settings", &*self.settings.borrow())
            .field("mounted", &self.editor.borrow().is_some())
            .field("busy", &self.busy.get())
            .finish_non_exhaustive()
    }
}
