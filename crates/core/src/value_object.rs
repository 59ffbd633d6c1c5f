//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and defined entirely by their attribute
/// values: two with the same values are the same value. `Price` is a value
/// object; a `Product` (whose identity survives attribute changes) is an
/// entity.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
