//! Value object trait: equality by value, not identity.
//!
//! Schemas and records are value objects: two records with the same fields are
//! interchangeable, and the engine never hands out aliases to stored records.

/// Marker trait for value objects.
///
/// Value objects are **compared by value** and copied rather than shared. A
/// filter or difference result is built from clones, so mutating the result
/// never reaches back into the store it came from.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
