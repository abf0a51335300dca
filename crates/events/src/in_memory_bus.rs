//! Process-local fan-out bus backed by `std::sync::mpsc` channels.

use std::sync::{Mutex, MutexGuard, mpsc};

use thiserror::Error;

use crate::bus::{EventBus, Subscription};

#[derive(Debug, Error)]
pub enum InMemoryBusError {
    #[error("event bus subscriber list poisoned")]
    Poisoned,
}

/// Synchronous pub/sub for committed events.
///
/// Each subscriber owns an unbounded channel. Publishing clones the message
/// into every live channel; channels whose receiver was dropped are forgotten
/// on the next publish.
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    senders: Mutex<Vec<mpsc::Sender<M>>>,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self {
            senders: Mutex::new(Vec::new()),
        }
    }

    /// Live subscribers as of the last publish.
    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.senders().map_or(0, |s| s.len())
    }

    fn senders(&self) -> Result<MutexGuard<'_, Vec<mpsc::Sender<M>>>, InMemoryBusError> {
        self.senders.lock().map_err(|_| InMemoryBusError::Poisoned)
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let mut senders = self.senders()?;
        senders.retain(|tx| tx.send(message.clone()).is_ok());
        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();
        // Poisoned: the subscription is handed out but never fed.
        if let Ok(mut senders) = self.senders() {
            senders.push(tx);
        }
        Subscription::new(rx)
    }
}
