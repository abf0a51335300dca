//! Domain & integration events.
//!
//! Domain events (stock decrements, restocks) are consumed synchronously inside a
//! unit of work. Integration events (an order was placed) are wrapped in an
//! [`EventEnvelope`] and published on an [`EventBus`] only after commit.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
