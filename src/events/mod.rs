//! Game events and the bus that delivers them to subscribers.

mod bus;
mod event;

pub use bus::{EventBus, Listener, SubscriberId};
pub use event::GameEvent;
