//! Timber cruise inventory model and volume aggregation.
//!
//! This crate is pure computation over stand → product → DBH-row data
//! (no IO, no storage). The same inputs always produce the same totals, so
//! reports can be recomputed from persisted cruise data alone.

pub mod aggregator;
pub mod category;
pub mod model;
pub mod numeric;

pub use aggregator::{CategoryTotals, InventorySummary, ProductTotals, StandTotals, aggregate, per_acre};
pub use category::{DBH_CLASSES, PRODUCT_CATALOG, ProductCategory};
pub use model::{DbhRow, ENTIRE_TRACT, Inventory, InventoryError, Product, Stand, StandLayout, Units};
