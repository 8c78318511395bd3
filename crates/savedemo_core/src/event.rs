//! Host event sources and listener registration.
//!
//! # Responsibility
//! - Deliver host lifecycle notifications to registered listeners.
//! - Hand out subscription ids so listeners can deregister at teardown.
//!
//! # Invariants
//! - Single-threaded: sources and listeners live on the UI-affine context.
//! - Sources keep only weak references; a dropped listener is pruned on the
//!   next emit.
//! - A listener that is already borrowed (re-entrant emit) is skipped, never
//!   double-borrowed.

use log::{debug, warn};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::rc::{Rc, Weak};

/// Document lifecycle notifications from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEvent {
    NewDocument,
    EndOpenDocument,
    CloseDocument,
}

/// Application-level notifications from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Host finished its current work and is waiting for input.
    Idle,
}

/// Receives events of type `E`.
pub trait EventListener<E> {
    fn on_event(&mut self, event: &E);
}

/// Handle returned by [`EventSource::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

type ListenerSlot<E> = Weak<RefCell<dyn EventListener<E>>>;

/// Typed, single-threaded event source.
pub struct EventSource<E: 'static> {
    name: &'static str,
    listeners: RefCell<BTreeMap<SubscriptionId, ListenerSlot<E>>>,
    next_id: Cell<u64>,
}

impl<E: 'static> EventSource<E> {
    /// `name` only appears in log lines.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            listeners: RefCell::new(BTreeMap::new()),
            next_id: Cell::new(0),
        }
    }

    /// Registers `listener` without taking ownership of it.
    pub fn subscribe<L>(&self, listener: &Rc<RefCell<L>>) -> SubscriptionId
    where
        L: EventListener<E> + 'static,
    {
        let strong: Rc<RefCell<dyn EventListener<E>>> = listener.clone();
        let id = SubscriptionId(self.next_id.get() + 1);
        self.next_id.set(id.0);
        self.listeners
            .borrow_mut()
            .insert(id, Rc::downgrade(&strong));
        debug!(
            "event=subscription module=event status=ok source={} action=add id={}",
            self.name, id
        );
        id
    }

    /// Returns `true` when `id` was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.listeners.borrow_mut().remove(&id).is_some();
        if removed {
            debug!(
                "event=subscription module=event status=ok source={} action=remove id={}",
                self.name, id
            );
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Delivers `event` to every live listener; returns how many received it.
    pub fn emit(&self, event: &E) -> usize {
        // Collect first so listeners may subscribe/unsubscribe while handling.
        let live: Vec<(SubscriptionId, Rc<RefCell<dyn EventListener<E>>>)> = {
            let mut listeners = self.listeners.borrow_mut();
            listeners.retain(|_, slot| slot.strong_count() > 0);
            listeners
                .iter()
                .filter_map(|(id, slot)| slot.upgrade().map(|listener| (*id, listener)))
                .collect()
        };

        let mut delivered = 0;
        for (id, listener) in live {
            match listener.try_borrow_mut() {
                Ok(mut listener) => {
                    listener.on_event(event);
                    delivered += 1;
                }
                Err(_) => warn!(
                    "event=subscription module=event status=skip source={} id={} reason=listener_busy",
                    self.name, id
                ),
            }
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentEvent, EventListener, EventSource};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<DocumentEvent>,
    }

    impl EventListener<DocumentEvent> for Recorder {
        fn on_event(&mut self, event: &DocumentEvent) {
            self.seen.push(*event);
        }
    }

    #[test]
    fn delivers_until_unsubscribed() {
        let source = EventSource::new("documents");
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let id = source.subscribe(&recorder);

        assert_eq!(source.emit(&DocumentEvent::NewDocument), 1);
        assert!(source.unsubscribe(id));
        assert!(!source.unsubscribe(id));
        assert_eq!(source.emit(&DocumentEvent::CloseDocument), 0);
        assert_eq!(recorder.borrow().seen, vec![DocumentEvent::NewDocument]);
    }

    #[test]
    fn dropped_listener_is_pruned() {
        let source = EventSource::new("documents");
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        source.subscribe(&recorder);
        drop(recorder);

        assert_eq!(source.emit(&DocumentEvent::EndOpenDocument), 0);
        assert_eq!(source.subscriber_count(), 0);
    }

    #[test]
    fn busy_listener_is_skipped() {
        let source = EventSource::new("documents");
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        source.subscribe(&recorder);

        let _guard = recorder.borrow_mut();
        assert_eq!(source.emit(&DocumentEvent::NewDocument), 0);
    }
}
