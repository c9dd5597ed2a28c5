//! Domain events and the pub/sub plumbing that distributes them.
//!
//! Side effects that follow a committed write (e.g. "card created"
//! communications) are expressed as events published on an [`EventBus`].

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
