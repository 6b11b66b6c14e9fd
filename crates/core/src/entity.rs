//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Entity owned by exactly one company (tenant).
///
/// Every record below the company root implements this; stores use it to
/// refuse cross-tenant writes.
pub trait TenantOwned: Entity {
    fn company_id(&self) -> crate::CompanyId;
}
