//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Items and orders are mutated in place by their owning component; the id is
/// the only thing that stays fixed.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
