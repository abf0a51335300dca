//! Aggregate traits shared by the domain crates.

use crate::error::{DomainError, DomainResult};

/// A consistency boundary with an identity and a version.
pub trait AggregateRoot {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Bumped once per applied event, so a row read under its lock can be
    /// checked for interleaved writers before the unit of work commits.
    fn version(&self) -> u64;
}

/// The version a write expects to find.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Seeding and other unconditional writes.
    Any,
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }

    pub fn check(self, actual: u64) -> DomainResult<()> {
        match self {
            ExpectedVersion::Exact(expected) if expected != actual => {
                Err(DomainError::VersionConflict { expected, actual })
            }
            _ => Ok(()),
        }
    }
}

/// Pure decide/evolve pair.
///
/// `handle` decides without mutating; `apply` evolves state from one event
/// (+1 version). Neither performs IO.
pub trait Aggregate: AggregateRoot {
    type Command: Clone + core::fmt::Debug;
    type Event: Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    fn apply(&mut self, event: &Self::Event);

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// `handle`, then `apply` every resulting event. State is untouched on error.
    fn execute(&mut self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let events = self.handle(command)?;
        for event in &events {
            self.apply(event);
        }
        Ok(events)
    }
}
