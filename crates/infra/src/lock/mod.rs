//! Per-row exclusive locks with bounded waits.

mod table;

pub use table::{LockError, RowLockGuard, RowLockTable};
