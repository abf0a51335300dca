use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LockError {
    /// The lock was still held by another unit of work when the wait expired.
    #[error("lock not acquired within {0:?}")]
    Timeout(Duration),

    #[error("lock state poisoned: {0}")]
    Poisoned(String),
}

/// One row lock: `Mutex<bool>` + `Condvar`.
#[derive(Debug, Default)]
struct RowLock {
    held: Mutex<bool>,
    wake: Condvar,
}

impl RowLock {
    fn release(&self) {
        let mut held = match self.held.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        *held = false;
        self.wake.notify_one();
    }
}

/// Lock table keyed by row identity.
///
/// Locks are created lazily, one per key, and never removed. Two keys never
/// contend with each other; there is no global lock on the acquire path beyond
/// the brief map lookup.
#[derive(Debug)]
pub struct RowLockTable<K> {
    locks: Mutex<HashMap<K, Arc<RowLock>>>,
}

impl<K> Default for RowLockTable<K> {
    fn default() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }
}

impl<K> RowLockTable<K>
where
    K: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn row(&self, key: &K) -> Result<Arc<RowLock>, LockError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| LockError::Poisoned("row lock table poisoned".into()))?;
        Ok(locks.entry(key.clone()).or_default().clone())
    }

    /// Acquire the row lock for `key`, waiting at most `timeout`.
    pub fn acquire(&self, key: &K, timeout: Duration) -> Result<RowLockGuard, LockError> {
        let row = self.row(key)?;
        let deadline = Instant::now() + timeout;

        {
            let mut held = row
                .held
                .lock()
                .map_err(|e| LockError::Poisoned(e.to_string()))?;
            while *held {
                let now = Instant::now();
                if now >= deadline {
                    return Err(LockError::Timeout(timeout));
                }
                let (guard, _) = row
                    .wake
                    .wait_timeout(held, deadline - now)
                    .map_err(|e| LockError::Poisoned(e.to_string()))?;
                held = guard;
            }
            *held = true;
        }

        Ok(RowLockGuard { row })
    }
}

/// Exclusive hold on one row; released on drop.
#[derive(Debug)]
pub struct RowLockGuard {
    row: Arc<RowLock>,
}

impl Drop for RowLockGuard {
    fn drop(&mut self) {
        self.row.release();
    }
}
