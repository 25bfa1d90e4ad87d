//! Value object trait: equality by value, not identity.
//!
//! Cruise inventory rows, products and stands are value objects: a project owns
//! its inventory outright and no other document refers to an individual row.

/// Marker trait for value objects.
///
/// Two value objects with the same attributes are interchangeable. To "modify"
/// one, build a new value.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct DbhRow { dbh: String, trees: u64, volume: f64 }
///
/// impl ValueObject for DbhRow {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
