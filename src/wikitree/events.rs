//! # Change Notifications
//!
//! Each [`crate::document::Document`] owns one [`EventBus`]. Observers (tree
//! views, caches, plugins) subscribe to an [`EventKind`] and get called
//! synchronously, on the mutating thread, in the order they subscribed.
//!
//! A failing handler never blocks the others: errors and panics are logged
//! and delivery moves on to the next subscriber.
//!
//! Bulk mutations are bracketed by `TreeUpdateBegin`/`TreeUpdateEnd` so
//! observers can defer expensive work until the end marker.

use crate::page::PageId;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PageCreated,
    PageRemoved,
    PageSelected,
    PageOrderChanged,
    PageRenamed,
    PageMoved,
    PageUpdated,
    TreeUpdateBegin,
    TreeUpdateEnd,
    DocumentOpened,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub page: Option<PageId>,
}

impl Event {
    pub fn new(kind: EventKind, page: Option<PageId>) -> Self {
        Self { kind, page }
    }

    pub fn for_page(kind: EventKind, page: PageId) -> Self {
        Self::new(kind, Some(page))
    }
}

pub type Handler = Box<dyn FnMut(&Event) -> anyhow::Result<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    kind: EventKind,
    handler: Handler,
}

#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) -> anyhow::Result<()> + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push(Subscriber {
            id,
            kind,
            handler: Box::new(handler),
        });
        id
    }

    /// Safe to call any number of times; returns whether a handler was removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.iter().filter(|s| s.kind == kind).count()
    }

    pub fn emit(&mut self, event: &Event) {
        for sub in self.subscribers.iter_mut().filter(|s| s.kind == event.kind) {
            let handler = &mut sub.handler;
            match panic::catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(kind = ?event.kind, error = %e, "event handler failed");
                }
                Err(payload) => {
                    warn!(
                        kind = ?event.kind,
                        panic = panic_message(&*payload),
                        "event handler panicked"
                    );
                }
            }
        }
    }

    pub fn begin_update(&mut self, root: PageId) {
        self.emit(&Event::for_page(EventKind::TreeUpdateBegin, root));
    }

    pub fn end_update(&mut self, root: PageId) {
        self.emit(&Event::for_page(EventKind::TreeUpdateEnd, root));
    }

    /// Emits `TreeUpdateBegin` now and `TreeUpdateEnd` when the guard drops.
    pub fn update_guard(&mut self, root: PageId) -> TreeUpdateGuard<'_> {
        self.begin_update(root);
        TreeUpdateGuard { bus: self, root }
    }
}

pub struct TreeUpdateGuard<'a> {
    bus: &'a mut EventBus,
    root: PageId,
}

impl TreeUpdateGuard<'_> {
    pub fn emit(&mut self, event: &Event) {
        self.bus.emit(event);
    }
}

impl Drop for TreeUpdateGuard<'_> {
    fn drop(&mut self) {
        self.bus.end_update(self.root);
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
