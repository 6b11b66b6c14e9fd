//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. A
/// `Quantity` of 3 is the same as any other `Quantity` of 3, whereas two
/// clients with the same name are still different entities.
///
/// To "modify" a value object, build a new one through its validating
/// constructor; that keeps the invariant checks in one place.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
