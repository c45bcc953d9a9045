//! Event bus.
//!
//! An ordered list of listeners. Every published event reaches every
//! listener synchronously, in registration order. Listeners belong to the
//! game they were registered on and are not carried over by `Game::copy`.

use serde::{Deserialize, Serialize};

use super::event::GameEvent;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriberId(pub u32);

impl SubscriberId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Subscriber({})", self.0)
    }
}

/// A boxed event callback.
pub type Listener = Box<dyn FnMut(&GameEvent)>;

/// Ordered event listeners.
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use rust_cloister::events::{EventBus, GameEvent};
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let mut bus = EventBus::new();
///
/// let sink = Rc::clone(&seen);
/// let id = bus.subscribe(move |event| sink.borrow_mut().push(event.name()));
///
/// bus.publish(&GameEvent::GameOver);
/// assert!(bus.unsubscribe(id));
/// bus.publish(&GameEvent::GameOver);
///
/// assert_eq!(*seen.borrow(), vec!["game-over"]);
/// ```
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(SubscriberId, Listener)>,
    next_id: u32,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener after all existing ones.
    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> SubscriberId {
        let id = SubscriberId::new(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Deliver `event` to every listener in registration order.
    pub fn publish(&mut self, event: &GameEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PlayerId;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_delivery_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();

        for tag in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            bus.subscribe(move |_| log.borrow_mut().push(tag));
        }
        bus.publish(&GameEvent::PlayerActivated { player: PlayerId::new(0) });

        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unsubscribe_unknown() {
        let mut bus = EventBus::new();
        let id = bus.subscribe(|_| {});
        assert_eq!(bus.len(), 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert!(bus.is_empty());
    }

    #[test]
    fn test_ids_not_reused() {
        let mut bus = EventBus::new();
        let a = bus.subscribe(|_| {});
        bus.unsubscribe(a);
        let b = bus.subscribe(|_| {});
        assert_ne!(a, b);
    }
}
