//! Marketplace documents that live beside a project: inquiries, quotes and
//! posted sales.
//!
//! Like the other domain crates this one performs no IO. Guards return
//! `DomainError`; the infra workflows decide what to persist.

pub mod inquiry;
pub mod quote;
pub mod sale;

pub use inquiry::{Inquiry, InquiryEvent, InquiryStatus, all_closed};
pub use quote::{Quote, QuoteStatus};
pub use sale::{Sale, SaleStatus, SaleSummary};
