//! Publish/subscribe seam for committed integration events.
//!
//! The store is the record of truth; the bus only fans committed facts out to
//! consumers such as reporting. A consumer that misses a message can re-read
//! the store.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

/// One consumer's view of a bus. Every subscription sees every message
/// published after it was created.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Next message, blocking. `None` once the bus is gone.
    pub fn recv(&self) -> Option<M> {
        self.receiver.recv().ok()
    }

    /// Next message if one is already queued.
    pub fn try_recv(&self) -> Option<M> {
        self.receiver.try_recv().ok()
    }

    /// Wait at most `timeout`. `None` on timeout or when the bus is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<M> {
        match self.receiver.recv_timeout(timeout) {
            Ok(m) => Some(m),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Everything queued right now, oldest first.
    #[cfg(test)]
    pub(crate) fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }

    /// Blocking iterator that ends when the bus is dropped.
    pub fn iter(&self) -> impl Iterator<Item = M> + '_ {
        self.receiver.iter()
    }
}

/// Where committed events go.
///
/// ```text
/// place_order → unit of work commit → EventBus::publish → reporting consumers
/// ```
///
/// Callers publish strictly after commit; a rolled-back order never reaches a
/// subscriber. A publish failure does not undo the commit.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        B::publish(self, message)
    }

    fn subscribe(&self) -> Subscription<M> {
        B::subscribe(self)
    }
}
