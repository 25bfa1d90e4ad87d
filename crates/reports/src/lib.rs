//! Printable cruise report summaries.
//!
//! Everything here is derived from stored cruise inventory on demand; nothing
//! is cached and stored tonnage is never modified.

pub mod summary;

pub use summary::{
    CruiseReport, DetailRow, GrandTotal, HARDWOOD_TONS_PER_MBF, PINE_TONS_PER_MBF, StandDetail,
    SummaryRow, SummaryTable, TableKind, is_sawtimber, summarize, tons_per_mbf, tons_to_mbf,
};
