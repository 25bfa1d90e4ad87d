//! Quote acceptance: the one cross-document transaction of the marketplace.
//!
//! ```text
//! load project + quote          (not-found)
//!   ↓
//! Project::handle(AcceptQuote)  (owner → unassigned → role → status)
//!   ↓
//! quote's inquiry still quoted  (failed-precondition)
//!   ↓
//! one atomic batch:
//!   project   Set         [precondition: version read above]
//!   inquiry   (no write)  [precondition: version read above]
//!   property  ArrayUnion  authorizedViewers += professional
//!   activity  Create
//! ```
//!
//! A concurrent acceptance that commits first bumps the project version, so
//! the second batch fails its precondition, re-reads, and is then rejected by
//! the single-assignment guard.

use chrono::{DateTime, Utc};
use serde_json::json;

use timberline_auth::Caller;
use timberline_core::{Aggregate, AggregateRoot, ExpectedVersion, ProjectId, QuoteId};
use timberline_events::ActivityRecord;
use timberline_projects::{Project, ProjectEvent};

use crate::commit::{AttemptError, commit_with_retry};
use crate::document_store::{AtomicBatch, DocumentStore, collections};
use crate::error::ServiceResult;
use crate::repository::Repository;

#[derive(Debug, Clone)]
pub struct AcceptanceProtocol<S> {
    repo: Repository<S>,
    max_attempts: u32,
}

impl<S: DocumentStore> AcceptanceProtocol<S> {
    pub fn new(store: S, max_attempts: u32) -> Self {
        Self {
            repo: Repository::new(store),
            max_attempts,
        }
    }

    /// Accept `quote_id` on behalf of the owner of `project_id`.
    ///
    /// Returns the project as committed.
    pub fn accept_quote(
        &self,
        caller: &Caller,
        quote_id: QuoteId,
        project_id: ProjectId,
        now: DateTime<Utc>,
    ) -> ServiceResult<Project> {
        let result = commit_with_retry("acceptQuote", self.max_attempts, || {
            self.attempt(caller, quote_id, project_id, now)
        });

        match &result {
            Ok(project) => tracing::info!(
                project_id = %project_id,
                quote_id = %quote_id,
                status = %project.status(),
                "quote accepted"
            ),
            Err(err) => tracing::warn!(
                project_id = %project_id,
                quote_id = %quote_id,
                kind = %err.kind(),
                error = %err.message(),
                "quote acceptance rejected"
            ),
        }
        result
    }

    fn attempt(
        &self,
        caller: &Caller,
        quote_id: QuoteId,
        project_id: ProjectId,
        now: DateTime<Utc>,
    ) -> Result<Project, AttemptError> {
        let mut project = self.repo.load_project(project_id)?;
        let quote = self.repo.load_quote(quote_id)?;
        let read_version = project.version();

        let command = quote.accept_command(*caller, project_id, now)?;
        let events = project.handle(&command)?;

        // A withdrawn or released inquiry takes its quote off the table.
        let (inquiry, inquiry_version) = self.repo.load_inquiry(quote.inquiry_id)?;
        inquiry.ensure_acceptable()?;

        for event in &events {
            project.apply(event);
        }

        let mut batch = AtomicBatch::new()
            .require(collections::PROJECTS, project_id, ExpectedVersion::exact(read_version))
            .require(collections::INQUIRIES, inquiry.id, ExpectedVersion::exact(inquiry_version))
            .set(collections::PROJECTS, project_id, &project)?
            .array_union(
                collections::PROPERTIES,
                project.property_id(),
                "authorizedViewers",
                vec![json!(quote.professional_id)],
            );
        for event in &events {
            let record = activity_for(project_id, event)
                .with_subject(quote.professional_id)
                .with_subject(quote.id);
            batch = batch.create(collections::ACTIVITY, record.id, &record)?;
        }

        self.repo.store().run_atomic_batch(batch)?;
        Ok(project.with_version(read_version + 1))
    }
}

pub(crate) fn activity_for(project_id: ProjectId, event: &ProjectEvent) -> ActivityRecord {
    ActivityRecord::from_event(project_id, event.actor_id(), event, event.describe())
}
