//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Properties, inquiries, quotes and sales are entities: they are referenced by
/// id from other documents and never embedded.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
