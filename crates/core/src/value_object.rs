//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values
/// (`Username`, `Slug`). Two value objects with the same values are equal.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
