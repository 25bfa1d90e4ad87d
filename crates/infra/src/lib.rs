//! Infrastructure layer: document store, repository, configuration and the
//! workflows that commit domain decisions atomically.

pub mod acceptance;
mod commit;
pub mod config;
pub mod document_store;
pub mod error;
pub mod inquiries;
pub mod onboarding;
pub mod project_workflow;
pub mod queries;
pub mod repository;


pub use acceptance::AcceptanceProtocol;
pub use config::{AppConfig, ConfigError};
pub use document_store::{DocumentStore, InMemoryDocumentStore, StoreError};
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use inquiries::{InquiryOutcome, InquiryWorkflow};
pub use onboarding::{NewProperty, Onboarding};
pub use project_workflow::{ProjectWorkflow, WorkflowCommand};
pub use queries::ProjectQueries;
pub use repository::Repository;
