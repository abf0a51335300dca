//! Transactional in-memory store.
//!
//! ```text
//! begin() → lock_product (row lock) → stage_* → commit()   all or nothing
//!                                             ↘ drop         nothing
//! ```
//!
//! Lock order is always row lock first, table lock second, and the table lock
//! is never held while waiting on a row.

mod directory;
mod error;
mod in_memory;
mod unit_of_work;

pub use directory::{Address, Category, Customer, Directory, Supplier};
pub use error::StoreError;
pub use in_memory::InMemoryStore;
pub use unit_of_work::{CommitSummary, UnitOfWork};
