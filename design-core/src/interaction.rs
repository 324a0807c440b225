//! Select-and-drag state machine.
//!
//! ```text
//!            pointer-down (hit)            pointer-move
//!   ┌──────┐ ─────────────────────▶ ┌──────────┐ ◀──┐
//!   │ Idle │                        │ Dragging │ ───┘
//!   └──────┘ ◀───────────────────── └──────────┘
//!      ▲      pointer-up / leave
//!      └── pointer-down (miss): clear selection
//!
//!   any state + Delete/Backspace with a selection: remove it, clear selection
//! ```
//!
//! All positions handed to this module are already in canvas space.

use crate::geometry::{apply_drag, hit_test_id, CanvasSize, Point};
use crate::{CanvasError, ElementId, ElementPatch, InputEvent, KeyEvent, Scene, Selection};

/// Drag state between pointer-down and pointer-up.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// An element follows the pointer.
    Dragging {
        /// Element being moved.
        id: ElementId,
        /// Canvas position of the previous pointer event.
        last: Point,
    },
}

/// What an input event did.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Nothing changed.
    Ignored,
    /// An element was selected and a drag started.
    Selected(ElementId),
    /// The selection was cleared by clicking empty canvas.
    Deselected,
    /// The dragged element moved to a new top-left corner.
    Moved {
        /// Element that moved.
        id: ElementId,
        /// New clamped position.
        to: Point,
    },
    /// The drag finished; selection is kept.
    DragEnded,
    /// The selected element was removed.
    Deleted(ElementId),
}

impl Response {
    /// Whether the scene or selection changed and the canvas should redraw.
    #[must_use]
    pub fn needs_redraw(&self) -> bool {
        matches!(
            self,
            Self::Selected(_) | Self::Deselected | Self::Moved { .. } | Self::Deleted(_)
        )
    }
}

/// The interaction controller.
#[derive(Debug, Clone)]
pub struct Interaction {
    state: DragState,
    canvas: CanvasSize,
}

impl Interaction {
    /// Create an idle controller for a canvas of the given size.
    #[must_use]
    pub fn new(canvas: CanvasSize) -> Self {
        Self {
            state: DragState::Idle,
            canvas,
        }
    }

    /// Current drag state.
    #[must_use]
    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Canvas the drag is clamped to.
    #[must_use]
    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Feed one event through the state machine.
    pub fn handle(
        &mut self,
        event: &InputEvent,
        scene: &mut Scene,
        selection: &mut Selection,
    ) -> Response {
        match event {
            InputEvent::PointerDown(p) => self.pointer_down(*p, scene, selection),
            InputEvent::PointerMove(p) => self.pointer_move(*p, scene),
            InputEvent::PointerUp | InputEvent::PointerLeave => self.pointer_up(),
            InputEvent::Key(key) => self.key_down(key, scene, selection),
        }
    }

    /// Pointer pressed at a canvas point. Non-finite points are ignored.
    pub fn pointer_down(
        &mut self,
        p: Point,
        scene: &Scene,
        selection: &mut Selection,
    ) -> Response {
        if !p.is_finite() {
            tracing::debug!("Ignoring pointer-down at ({}, {})", p.x, p.y);
            return Response::Ignored;
        }
        if let Some(id) = hit_test_id(scene, p) {
            tracing::debug!("Drag start on {id} at ({}, {})", p.x, p.y);
            selection.select(id.clone());
            self.state = DragState::Dragging {
                id: id.clone(),
                last: p,
            };
            Response::Selected(id)
        } else {
            self.state = DragState::Idle;
            if selection.clear() {
                Response::Deselected
            } else {
                Response::Ignored
            }
        }
    }

    /// Pointer moved to a canvas point. Non-finite points are ignored and
    /// the drag continues from the last good one.
    pub fn pointer_move(&mut self, p: Point, scene: &mut Scene) -> Response {
        let DragState::Dragging { id, last } = &mut self.state else {
            return Response::Ignored;
        };
        if !p.is_finite() {
            return Response::Ignored;
        }

        let Some(element) = scene.get_element(id) else {
            // The element was deleted mid-drag.
            tracing::debug!("Dropping stale drag of {id}");
            self.state = DragState::Idle;
            return Response::Ignored;
        };

        let to = apply_drag(&element.transform, p.delta_from(*last), self.canvas);
        *last = p;
        let id = id.clone();
        match scene.update_element(&id, ElementPatch::position(to.x, to.y)) {
            Ok(()) => Response::Moved { id, to },
            Err(e) => {
                tracing::debug!("Drag update ignored: {e}");
                Response::Ignored
            }
        }
    }

    /// Pointer released or left the surface.
    pub fn pointer_up(&mut self) -> Response {
        match std::mem::take(&mut self.state) {
            DragState::Dragging { id, .. } => {
                tracing::debug!("Drag end on {id}");
                Response::DragEnded
            }
            DragState::Idle => Response::Ignored,
        }
    }

    /// Key pressed anywhere while the editor is mounted.
    pub fn key_down(
        &mut self,
        key: &KeyEvent,
        scene: &mut Scene,
        selection: &mut Selection,
    ) -> Response {
        if !key.key.is_delete() {
            return Response::Ignored;
        }
        let Some(id) = selection.current().cloned() else {
            return Response::Ignored;
        };

        selection.clear();
        if matches!(&self.state, DragState::Dragging { id: dragged, .. } if *dragged == id) {
            self.state = DragState::Idle;
        }
        match scene.remove_element(&id) {
            Ok(_) => {
                tracing::debug!("Deleted {id} via {}", key.key.name());
                Response::Deleted(id)
            }
            Err(CanvasError::ElementNotFound(_)) => Response::Deselected,
            Err(e) => {
                tracing::warn!("Delete of {id} failed: {e}");
                Response::Deselected
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementKind, Key, Transform};

    fn setup() -> (Interaction, Scene, Selection) {
        (
            Interaction::new(CanvasSize::new(400.0, 500.0)),
            Scene::new(),
            Selection::none(),
        )
    }

    fn add(scene: &mut Scene, t: Transform) -> ElementId {
        scene
            .add_element(
                ElementKind::Image {
                    src: "a.png".to_string(),
                },
                t,
            )
            .expect("add")
    }

    fn pos(scene: &Scene, id: &ElementId) -> (f64, f64) {
        let t = scene.get_element(id).expect("exists").transform;
        (t.x, t.y)
    }

    #[test]
    fn pointer_down_on_element_starts_drag() {
        let (mut ix, mut scene, mut sel) = setup();
        let id = add(&mut scene, Transform::new(100.0, 100.0, 200.0, 200.0));

        let r = ix.pointer_down(Point::new(150.0, 150.0), &scene, &mut sel);

        assert_eq!(r, Response::Selected(id.clone()));
        assert!(sel.is_selected(&id));
        assert_eq!(
            ix.state(),
            &DragState::Dragging {
                id,
                last: Point::new(150.0, 150.0)
            }
        );
    }

    #[test]
    fn pointer_down_on_empty_canvas_clears_selection() {
        let (mut ix, mut scene, mut sel) = setup();
        let id = add(&mut scene, Transform::new(0.0, 0.0, 10.0, 10.0));
        sel.select(id);

        assert_eq!(
            ix.pointer_down(Point::new(300.0, 300.0), &scene, &mut sel),
            Response::Deselected
        );
        assert!(sel.is_empty());
        assert!(!ix.is_dragging());
        assert_eq!(ix.pointer_down(Point::new(300.0, 300.0), &scene, &mut sel), Response::Ignored);
    }

    #[test]
    fn drag_moves_by_pointer_delta() {
        let (mut ix, mut scene, mut sel) = setup();
        let id = add(&mut scene, Transform::new(100.0, 100.0, 200.0, 200.0));

        ix.pointer_down(Point::new(110.0, 110.0), &scene, &mut sel);
        let r = ix.pointer_move(Point::new(160.0, 80.0), &mut scene);

        assert_eq!(
            r,
            Response::Moved {
                id: id.clone(),
                to: Point::new(150.0, 70.0)
            }
        );
        assert_eq!(pos(&scene, &id), (150.0, 70.0));
    }

    #[test]
    fn non_finite_pointer_is_ignored_mid_drag() {
        let (mut ix, mut scene, mut sel) = setup();
        let id = add(&mut scene, Transform::new(150.0, 150.0, 200.0, 50.0));

        ix.pointer_down(Point::new(160.0, 160.0), &scene, &mut sel);
        let bad = Point::new(f64::NAN, f64::INFINITY);
        assert_eq!(ix.pointer_move(bad, &mut scene), Response::Ignored);
        assert_eq!(pos(&scene, &id), (150.0, 150.0));
        assert!(ix.is_dragging());

        // The drag resumes from the last finite pointer position.
        ix.pointer_move(Point::new(161.0, 160.0), &mut scene);
        assert_eq!(pos(&scene, &id), (151.0, 150.0));

        ix.pointer_up();
        assert_eq!(ix.pointer_down(bad, &scene, &mut sel), Response::Ignored);
        assert!(sel.is_selected(&id));
    }

    #[test]
    fn successive_moves_use_last_pointer_position() {
        let (mut ix, mut scene, mut sel) = setup();
        let id = add(&mut scene, Transform::new(100.0, 100.0, 50.0, 50.0));

        ix.pointer_down(Point::new(120.0, 120.0), &scene, &mut sel);
        ix.pointer_move(Point::new(130.0, 120.0), &mut scene);
        ix.pointer_move(Point::new(140.0, 125.0), &mut scene);

        assert_eq!(pos(&scene, &id), (120.0, 105.0));
    }

    #[test]
    fn drag_is_clamped_to_canvas() {
        let (mut ix, mut scene, mut sel) = setup();
        let id = add(&mut scene, Transform::new(190.0, 290.0, 200.0, 200.0));
        // Bring it to the scenario position first without clamping.
        scene
            .update_element(&id, ElementPatch::position(300.0, 400.0))
            .expect("place");

        ix.pointer_down(Point::new(350.0, 450.0), &scene, &mut sel);
        ix.pointer_move(Point::new(450.0, 550.0), &mut scene);

        assert_eq!(pos(&scene, &id), (200.0, 300.0));
    }

    #[test]
    fn clamp_overshoot_is_not_remembered() {
        let (mut ix, mut scene, mut sel) = setup();
        let id = add(&mut scene, Transform::new(10.0, 10.0, 50.0, 50.0));

        ix.pointer_down(Point::new(20.0, 20.0), &scene, &mut sel);
        ix.pointer_move(Point::new(0.0, 20.0), &mut scene); // clamps x to 0
        ix.pointer_move(Point::new(5.0, 20.0), &mut scene);

        assert_eq!(pos(&scene, &id), (5.0, 10.0));
    }

    #[test]
    fn pointer_up_ends_drag_and_keeps_selection() {
        let (mut ix, mut scene, mut sel) = setup();
        let id = add(&mut scene, Transform::new(0.0, 0.0, 10.0, 10.0));

        ix.pointer_down(Point::new(5.0, 5.0), &scene, &mut sel);
        assert_eq!(ix.pointer_up(), Response::DragEnded);
        assert!(!ix.is_dragging());
        assert!(sel.is_selected(&id));

        // Moves after release do nothing.
        assert_eq!(ix.pointer_move(Point::new(50.0, 50.0), &mut scene), Response::Ignored);
        assert_eq!(pos(&scene, &id), (0.0, 0.0));
    }

    #[test]
    fn pointer_leave_behaves_like_up() {
        let (mut ix, mut scene, mut sel) = setup();
        add(&mut scene, Transform::new(0.0, 0.0, 10.0, 10.0));

        ix.pointer_down(Point::new(5.0, 5.0), &scene, &mut sel);
        let r = ix.handle(&InputEvent::PointerLeave, &mut scene, &mut sel);
        assert_eq!(r, Response::DragEnded);
        assert!(!ix.is_dragging());
    }

    #[test]
    fn stale_drag_fails_safely() {
        let (mut ix, mut scene, mut sel) = setup();
        let id = add(&mut scene, Transform::new(0.0, 0.0, 10.0, 10.0));

        ix.pointer_down(Point::new(5.0, 5.0), &scene, &mut sel);
        scene.remove_element(&id).expect("remove");

        assert_eq!(ix.pointer_move(Point::new(8.0, 8.0), &mut scene), Response::Ignored);
        assert!(!ix.is_dragging());
    }

    #[test]
    fn delete_key_removes_selected() {
        let (mut ix, mut scene, mut sel) = setup();
        let keep = add(&mut scene, Transform::new(200.0, 200.0, 10.0, 10.0));
        let doomed = add(&mut scene, Transform::new(0.0, 0.0, 10.0, 10.0));

        ix.pointer_down(Point::new(5.0, 5.0), &scene, &mut sel);
        let r = ix.key_down(&KeyEvent::new(Key::Delete), &mut scene, &mut sel);

        assert_eq!(r, Response::Deleted(doomed.clone()));
        assert!(sel.is_empty());
        assert!(!ix.is_dragging());
        assert!(!scene.contains(&doomed));
        assert!(scene.contains(&keep));
    }

    #[test]
    fn backspace_deletes_and_other_keys_do_not() {
        let (mut ix, mut scene, mut sel) = setup();
        let id = add(&mut scene, Transform::new(0.0, 0.0, 10.0, 10.0));
        sel.select(id.clone());

        assert_eq!(
            ix.key_down(&KeyEvent::new(Key::from_name("x")), &mut scene, &mut sel),
            Response::Ignored
        );
        assert!(scene.contains(&id));

        assert_eq!(
            ix.key_down(&KeyEvent::new(Key::Backspace), &mut scene, &mut sel),
            Response::Deleted(id)
        );
        assert!(scene.is_empty());
    }

    #[test]
    fn delete_without_selection_is_ignored() {
        let (mut ix, mut scene, mut sel) = setup();
        add(&mut scene, Transform::new(0.0, 0.0, 10.0, 10.0));

        assert_eq!(
            ix.key_down(&KeyEvent::new(Key::Delete), &mut scene, &mut sel),
            Response::Ignored
        );
        assert_eq!(scene.element_count(), 1);
    }

    #[test]
    fn delete_of_already_removed_selection_is_noop() {
        let (mut ix, mut scene, mut sel) = setup();
        let id = add(&mut scene, Transform::new(0.0, 0.0, 10.0, 10.0));
        sel.select(id.clone());
        scene.remove_element(&id).expect("remove");

        let r = ix.key_down(&KeyEvent::new(Key::Delete), &mut scene, &mut sel);
        assert_eq!(r, Response::Deselected);
        assert!(sel.is_empty());
    }

    #[test]
    fn redraw_flags() {
        assert!(!Response::Ignored.needs_redraw());
        assert!(!Response::DragEnded.needs_redraw());
        assert!(Response::Deselected.needs_redraw());
        assert!(Response::Deleted(ElementId::from("a")).needs_redraw());
    }
}
