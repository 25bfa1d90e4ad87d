//! Document store boundary.
//!
//! The marketplace persists JSON documents grouped in collections. The core
//! only needs point reads, equality/membership queries and an all-or-nothing
//! multi-document batch; anything richer stays behind this trait.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryDocumentStore;
pub use r#trait::{AtomicBatch, DocRef, Document, DocumentStore, Filter, Precondition, StoreError, Write};

/// Collection names used by the marketplace.
pub mod collections {
    pub const USERS: &str = "users";
    pub const PROPERTIES: &str = "properties";
    pub const PROJECTS: &str = "projects";
    pub const INQUIRIES: &str = "inquiries";
    pub const QUOTES: &str = "quotes";
    pub const SALES: &str = "sales";
    pub const ACTIVITY: &str = "activity";
}
