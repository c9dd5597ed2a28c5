//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Every stored record (template, variant, card, ...) is an entity: two records
/// with equal fields but different ids are different records.
pub trait Entity {
    /// Strongly-typed record identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the record identifier.
    fn id(&self) -> &Self::Id;
}
