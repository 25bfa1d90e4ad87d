//! Aggregate root traits for the marketplace's stateful documents.

/// Aggregate root marker + minimal interface.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Document revision this state was loaded at.
    ///
    /// Used as the optimistic concurrency token when the next write is committed.
    fn version(&self) -> u64;
}

/// Optimistic concurrency expectation for a stored document.
///
/// Store versions start at 1, so version 0 stands for "not stored yet".
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExpectedVersion(u64);

impl ExpectedVersion {
    /// The document must not exist.
    pub const ABSENT: Self = Self(0);

    /// The document must be at exactly `version` (0 meaning absent).
    pub fn exact(version: u64) -> Self {
        Self(version)
    }

    pub fn matches(self, actual: u64) -> bool {
        self.0 == actual
    }
}

/// Aggregate execution semantics (pure, deterministic).
///
/// - **Decision logic**: `handle(&self, cmd)` checks guards and returns events.
/// - **State mutation**: `apply(&mut self, event)` evolves state.
///
/// Aggregates must not perform IO. The workflow layer persists the evolved
/// state together with any side documents in one atomic batch.
pub trait Aggregate: AggregateRoot {
    type Command: Clone + core::fmt::Debug;
    type Event: Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    /// Evolve in-memory state from a single event.
    fn apply(&mut self, event: &Self::Event);

    /// Decide which events to emit given the current state and a command.
    ///
    /// This must not mutate state.
    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_version_rejects_mismatch() {
        assert!(ExpectedVersion::exact(3).matches(3));
        assert!(!ExpectedVersion::exact(3).matches(4));
        assert_eq!(ExpectedVersion::exact(0), ExpectedVersion::ABSENT);
        assert!(ExpectedVersion::ABSENT.matches(0));
    }
}
