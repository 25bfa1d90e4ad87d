//! Projects domain module: the engagement lifecycle of a property.
//!
//! This crate contains the project state machine and the documents it owns,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod cruise;
pub mod project;
pub mod property;

pub use cruise::{CruiseData, Rate, RateSet, SaleDetails};
pub use project::{
    AcceptQuote, ApproveCruise, Assignment, CompleteHarvest, DeclineEngagement, PostToMarketplace,
    Project, ProjectCommand, ProjectEvent, ProjectStatus, RetractCruise, SubmitCruise,
};
pub use property::Property;
