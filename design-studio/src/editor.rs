//! The mounted canvas editor.
//!
//! ```text
//!   pointer (display space) ──▶ map_pointer ──▶ Interaction ──▶ Scene
//!   KeyboardHub ──▶ KeySubscription ──┘                          │
//!                                                                ▼
//!   AssetLoader ◀── request_assets ◀── Renderer::render ◀── redraw
//!        │                                                       ▲
//!        └── completions (poll_assets / settle_assets) ──────────┘
//! ```
//!
//! Mounting an editor subscribes it to the keyboard hub and starts loading
//! the assets of the current design. Dropping it releases the subscription
//! and cancels every in-flight load.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::{Rc, Weak};

use design_core::{
    map_pointer, DisplayRect, InputEvent, Interaction, KeySubscription, KeyboardHub, Point,
    ProductContext, Response, Scene, Selection,
};
use design_renderer::{
    AssetLoader, AssetSource, CacheStats, CompletedLoad, FrameInput, FrameStats, PendingLoads,
    RenderResult, RenderedFrame, Renderer,
};

use crate::error::StudioResult;

/// The editable design: what the studio owns and the editor manipulates.
#[derive(Debug, Clone)]
pub struct DesignState {
    /// Elements on the canvas.
    pub scene: Scene,
    /// Selected element, if any. Never persisted.
    pub selection: Selection,
    /// Product options the renderer reads.
    pub product: ProductContext,
    /// Drag state machine.
    pub interaction: Interaction,
}

impl DesignState {
    /// An empty design on a canvas of the interaction's size.
    #[must_use]
    pub fn new(interaction: Interaction) -> Self {
        Self {
            scene: Scene::new(),
            selection: Selection::none(),
            product: ProductContext::default(),
            interaction,
        }
    }

    fn frame_input(&self) -> FrameInput<'_> {
        FrameInput {
            scene: &self.scene,
            selection: &self.selection,
            product: self.product,
        }
    }
}

pub(crate) struct EditorInner {
    state: Rc<RefCell<DesignState>>,
    renderer: RefCell<Renderer>,
    assets: RefCell<AssetLoader>,
    frame: RefCell<Option<RenderedFrame>>,
    display: Cell<DisplayRect>,
}

impl EditorInner {
    fn handle(&self, event: &InputEvent) -> Response {
        let Ok(mut state) = self.state.try_borrow_mut() else {
            tracing::trace!("Design busy, dropping {event:?}");
            return Response::Ignored;
        };
        let DesignState {
            scene,
            selection,
            interaction,
            ..
        } = &mut *state;
        interaction.handle(event, scene, selection)
    }

    fn redraw(&self) -> RenderResult<FrameStats> {
        let state = self.state.borrow();
        let input = state.frame_input();
        let mut renderer = self.renderer.borrow_mut();

        {
            let mut assets = self.assets.borrow_mut();
            let wanted: HashSet<String> = renderer.asset_sources(&input).into_iter().collect();
            assets.retain(|source| wanted.contains(source));
            renderer.request_assets(&input, &mut assets);
            assets.poll_loaded();
        }

        let frame = renderer.render(&input, self.assets.borrow().cache())?;
        let stats = frame.stats;
        tracing::trace!(
            "Redraw: {} images, {} pending, {} placeholders",
            stats.images_drawn,
            stats.images_pending,
            stats.placeholders
        );
        *self.frame.borrow_mut() = Some(frame);
        Ok(stats)
    }

    /// Redraw, logging any failure.
    fn refresh(&self) {
        if let Err(e) = self.redraw() {
            tracing::warn!("Redraw failed: {e}");
        }
    }
}

/// A canvas editor mounted on a design.
pub struct CanvasEditor {
    inner: Rc<EditorInner>,
    _keys: KeySubscription,
}

impl CanvasEditor {
    /// Mount an editor on `state`, listening for Delete/Backspace on `keys`
    /// until the editor is dropped. Draws the first frame immediately.
    #[must_use]
    pub fn mount(
        state: Rc<RefCell<DesignState>>,
        keys: &KeyboardHub,
        renderer: Renderer,
        source: Rc<dyn AssetSource>,
    ) -> Self {
        let canvas = renderer.config().canvas;
        let inner = Rc::new(EditorInner {
            state,
            renderer: RefCell::new(renderer),
            assets: RefCell::new(AssetLoader::new(source)),
            frame: RefCell::new(None),
            display: Cell::new(DisplayRect::identity(canvas)),
        });

        let weak = Rc::downgrade(&inner);
        let subscription = keys.subscribe(move |event| {
            let Some(inner) = weak.upgrade() else {
                return false;
            };
            let response = inner.handle(&InputEvent::Key(event.clone()));
            if response.needs_redraw() {
                inner.refresh();
            }
            matches!(response, Response::Deleted(_))
        });

        tracing::debug!("Editor mounted on {}x{} canvas", canvas.width, canvas.height);
        inner.refresh();
        Self {
            inner,
            _keys: subscription,
        }
    }

    /// Where the canvas currently sits on the display; pointer positions are
    /// mapped through it.
    ///
    /// # Errors
    ///
    /// Returns an error if the rectangle has a zero or non-finite size; the
    /// previous rectangle stays in effect.
    pub fn set_display_rect(&self, rect: DisplayRect) -> StudioResult<()> {
        rect.validate()
            .inspect_err(|e| tracing::debug!("Keeping previous display rectangle: {e}"))?;
        self.inner.display.set(rect);
        Ok(())
    }

    /// Current display rectangle.
    #[must_use]
    pub fn display_rect(&self) -> DisplayRect {
        self.inner.display.get()
    }

    /// Feed an input event. Pointer positions are in display space.
    pub fn handle(&self, event: InputEvent) -> Response {
        let event = match event {
            InputEvent::PointerDown(p) => InputEvent::PointerDown(self.to_canvas(p)),
            InputEvent::PointerMove(p) => InputEvent::PointerMove(self.to_canvas(p)),
            other => other,
        };
        let response = self.inner.handle(&event);
        if response.needs_redraw() {
            self.inner.refresh();
        }
        response
    }

    /// Pointer pressed at a display position.
    pub fn pointer_down(&self, p: Point) -> Response {
        self.handle(InputEvent::PointerDown(p))
    }

    /// Pointer moved to a display position.
    pub fn pointer_move(&self, p: Point) -> Response {
        self.handle(InputEvent::PointerMove(p))
    }

    /// Pointer released.
    pub fn pointer_up(&self) -> Response {
        self.handle(InputEvent::PointerUp)
    }

    /// Pointer left the canvas.
    pub fn pointer_leave(&self) -> Response {
        self.handle(InputEvent::PointerLeave)
    }

    fn to_canvas(&self, p: Point) -> Point {
        let canvas = self.inner.renderer.borrow().config().canvas;
        map_pointer(p, self.inner.display.get(), canvas)
    }

    /// Draw the design now.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame could not be rasterized.
    pub fn redraw(&self) -> StudioResult<FrameStats> {
        Ok(self.inner.redraw()?)
    }

    pub(crate) fn refresh(&self) {
        self.inner.refresh();
    }

    /// Apply loads that have already finished and redraw if any did.
    ///
    /// Returns how many completions were applied.
    pub fn poll_assets(&self) -> usize {
        let applied = self.inner.assets.borrow_mut().poll_loaded();
        if applied > 0 {
            self.inner.refresh();
        }
        applied
    }

    /// Wait for every in-flight load, redrawing after each one.
    ///
    /// Returns how many completions were applied.
    pub async fn settle_assets(&self) -> usize {
        settle(self.downgrade()).await
    }

    pub(crate) fn downgrade(&self) -> Weak<EditorInner> {
        Rc::downgrade(&self.inner)
    }

    /// Whether any asset is still loading.
    #[must_use]
    pub fn has_pending_assets(&self) -> bool {
        self.inner.assets.borrow().has_pending()
    }

    /// Asset cache counters.
    #[must_use]
    pub fn asset_stats(&self) -> CacheStats {
        self.inner.assets.borrow().stats()
    }

    /// What the last frame drew.
    #[must_use]
    pub fn frame_stats(&self) -> Option<FrameStats> {
        self.inner.frame.borrow().as_ref().map(|frame| frame.stats)
    }

    /// Run `f` on the last drawn frame.
    pub fn with_frame<R>(&self, f: impl FnOnce(&RenderedFrame) -> R) -> Option<R> {
        self.inner.frame.borrow().as_ref().map(f)
    }

    /// The last drawn frame as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn frame_png(&self) -> StudioResult<Option<Vec<u8>>> {
        Ok(self.with_frame(RenderedFrame::to_png).transpose()?)
    }

    /// The current design composed as SVG, with whatever assets are ready.
    #[must_use]
    pub fn compose_svg(&self) -> String {
        let state = self.inner.state.borrow();
        let assets = self.inner.assets.borrow();
        self.inner
            .renderer
            .borrow()
            .compose(&state.frame_input(), assets.cache())
            .svg
    }

    /// Overlay label, e.g. `"3 elements"`.
    #[must_use]
    pub fn count_label(&self) -> String {
        self.inner.state.borrow().scene.count_label()
    }

    /// Overlay product label, e.g. `"tshirt • black • front"`.
    #[must_use]
    pub fn product_label(&self) -> String {
        self.inner.state.borrow().product.label()
    }

    /// Whether the "add an image or text" hint should show.
    #[must_use]
    pub fn shows_empty_hint(&self) -> bool {
        self.inner.state.borrow().scene.is_empty()
    }
}

impl std::fmt::Debug for CanvasEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasEditor")
            .field("display", &self.inner.display.get())
            .field("assets", &*self.inner.assets.borrow())
            .field("frame", &self.frame_stats())
            .finish_non_exhaustive()
    }
}

/// Loads detached from an editor's loader while they are awaited. Loads
/// still running when this is dropped go back to the editor, or are
/// cancelled if the editor is gone.
struct DetachedLoads {
    editor: Weak<EditorInner>,
    pending: PendingLoads,
}

impl DetachedLoads {
    async fn next(&mut self) -> Option<CompletedLoad> {
        self.pending.next().await
    }
}

impl Drop for DetachedLoads {
    fn drop(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let Some(editor) = self.editor.upgrade() else {
            return;
        };
        let Ok(mut assets) = editor.assets.try_borrow_mut() else {
            return;
        };
        assets.restore_pending(std::mem::take(&mut self.pending));
    }
}

/// Drive an editor's loads to completion without keeping it alive.
pub(crate) async fn settle(editor: Weak<EditorInner>) -> usize {
    let mut applied = 0;
    loop {
        let Some(inner) = editor.upgrade() else {
            return applied;
        };
        let pending = inner.assets.borrow_mut().take_pending();
        if pending.is_empty() {
            return applied;
        }
        drop(inner);

        let mut detached = DetachedLoads {
            editor: editor.clone(),
            pending,
        };
        while let Some(done) = detached.next().await {
            let Some(inner) = editor.upgrade() else {
                tracing::debug!("Editor unmounted, discarding finished load");
                return applied;
            };
            inner.assets.borrow_mut().complete(done);
            applied += 1;
            inner.refresh();
        }
    }
}
