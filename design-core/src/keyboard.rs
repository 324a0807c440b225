//! Process-wide keyboard surface with scoped subscriptions.
//!
//! The host owns one [`KeyboardHub`] and forwards every key press to
//! [`KeyboardHub::dispatch`]. Editors subscribe when they mount and hold the
//! returned [`KeySubscription`]; dropping it unsubscribes, so a handler can
//! never run after its editor is gone.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::KeyEvent;

type Handler = Rc<RefCell<dyn FnMut(&KeyEvent) -> bool>>;

#[derive(Default)]
struct HubInner {
    next_id: u64,
    handlers: Vec<(u64, Handler)>,
}

impl HubInner {
    fn is_subscribed(&self, id: u64) -> bool {
        self.handlers.iter().any(|(i, _)| *i == id)
    }
}

/// The global input surface key presses arrive on.
#[derive(Clone, Default)]
pub struct KeyboardHub {
    inner: Rc<RefCell<HubInner>>,
}

impl KeyboardHub {
    /// Create a hub with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key handler for as long as the returned guard lives.
    ///
    /// The handler returns `true` if it consumed the key.
    #[must_use = "dropping the subscription immediately unsubscribes the handler"]
    pub fn subscribe<F>(&self, handler: F) -> KeySubscription
    where
        F: FnMut(&KeyEvent) -> bool + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let handler: Handler = Rc::new(RefCell::new(handler));
        inner.handlers.push((id, handler));
        tracing::trace!("Key subscription {id} registered");
        KeySubscription {
            hub: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Deliver a key press to every live subscriber, oldest first.
    ///
    /// Handlers may subscribe or unsubscribe while being dispatched to; a
    /// handler released mid-dispatch is skipped. Returns `true` if any
    /// handler consumed the key.
    pub fn dispatch(&self, event: &KeyEvent) -> bool {
        let snapshot: Vec<(u64, Handler)> = self.inner.borrow().handlers.clone();
        let mut consumed = false;
        for (id, handler) in snapshot {
            if !self.inner.borrow().is_subscribed(id) {
                continue;
            }
            // A handler that re-enters dispatch is not called recursively.
            let Ok(mut handler) = handler.try_borrow_mut() else {
                continue;
            };
            consumed |= (&mut *handler)(event);
        }
        consumed
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().handlers.len()
    }
}

impl std::fmt::Debug for KeyboardHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardHub")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Guard for a registered key handler. Dropping it unsubscribes.
#[derive(Debug)]
pub struct KeySubscription {
    hub: Weak<RefCell<HubInner>>,
    id: u64,
}

impl KeySubscription {
    /// Whether the handler is still registered with a live hub.
    #[must_use]
    pub fn is_active(&self) -> bool {
        let Some(hub) = self.hub.upgrade() else {
            return false;
        };
        let active = hub.borrow().is_subscribed(self.id);
        active
    }
}

impl Drop for KeySubscription {
    fn drop(&mut self) {
        let Some(hub) = self.hub.upgrade() else {
            return;
        };
        // try_borrow_mut: the guard may be dropped from inside a handler.
        let Ok(mut inner) = hub.try_borrow_mut() else {
            return;
        };
        inner.handlers.retain(|(id, _)| *id != self.id);
        tracing::trace!("Key subscription {} released", self.id);
    }
}
