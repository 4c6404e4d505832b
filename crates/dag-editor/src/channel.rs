//! Synchronous publish/subscribe bus for editor events.
//!
//! `trigger` calls every handler in subscription order before returning.
//! A handler may trigger again: the nested event reaches all handlers
//! before the outer trigger moves on to its next handler (depth-first).
//! Nesting deeper than the configured limit is dropped with a warning.

use crate::events::GraphEvent;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Handler = Rc<dyn Fn(&GraphEvent)>;

pub const DEFAULT_MAX_NESTING: usize = 64;

pub struct EventChannel {
    handlers: RefCell<Vec<(u64, Handler)>>,
    next_id: Cell<u64>,
    depth: Cell<usize>,
    max_nesting: usize,
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_NESTING)
    }
}

impl EventChannel {
    pub fn new(max_nesting: usize) -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
            depth: Cell::new(0),
            max_nesting,
        }
    }

    /// Register a handler. It stays subscribed until the returned guard is
    /// dropped or disposed.
    pub fn subscribe(self: &Rc<Self>, handler: impl Fn(&GraphEvent) + 'static) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.handlers.borrow_mut().push((id, Rc::new(handler)));
        Subscription {
            channel: Rc::downgrade(self),
            id,
        }
    }

    fn unsubscribe(&self, id: u64) {
        self.handlers.borrow_mut().retain(|(h, _)| *h != id);
    }

    fn is_subscribed(&self, id: u64) -> bool {
        self.handlers.borrow().iter().any(|(h, _)| *h == id)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn trigger(&self, event: GraphEvent) {
        let depth = self.depth.get();
        if depth >= self.max_nesting {
            log::warn!("event nesting limit {} reached, dropping {event:?}", self.max_nesting);
            return;
        }
        log::trace!("trigger (depth {depth}): {event:?}");

        // Handlers may (un)subscribe while we dispatch.
        let snapshot: Vec<(u64, Handler)> = self.handlers.borrow().clone();
        self.depth.set(depth + 1);
        for (id, handler) in snapshot {
            if self.is_subscribed(id) {
                handler(&event);
            }
        }
        self.depth.set(depth);
    }
}

/// Disposer returned by [`EventChannel::subscribe`]. Unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes the handler"]
pub struct Subscription {
    channel: Weak<EventChannel>,
    id: u64,
}

impl Subscription {
    pub fn dispose(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(channel) = self.channel.upgrade() {
            channel.unsubscribe(self.id);
        }
    }
}
