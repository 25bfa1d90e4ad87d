//! `timberline-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by every marketplace
//! module (no storage, no transport).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ActivityId, InquiryId, ProjectId, PropertyId, QuoteId, SaleId, UserId};
pub use value_object::ValueObject;
