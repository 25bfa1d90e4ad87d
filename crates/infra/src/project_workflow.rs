//! Project transition pipeline (application-level orchestration).
//!
//! ```text
//! WorkflowCommand
//!   ↓
//! 1. Load project (+version) and its property
//!   ↓
//! 2. Build the typed ProjectCommand (caller, time, property acreage)
//!   ↓
//! 3. Project::handle (pure guards, produces events) and apply
//!   ↓
//! 4. One atomic batch: project Set with version precondition,
//!    activity records, derived documents (Sale on posting,
//!    released inquiry on a declined engagement)
//! ```
//!
//! A version conflict re-runs the whole pipeline against fresh state.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use timberline_auth::Caller;
use timberline_core::{Aggregate, AggregateRoot, ExpectedVersion, ProjectId, QuoteId, SaleId};
use timberline_marketplace::{InquiryStatus, Sale};
use timberline_projects::{
    ApproveCruise, CompleteHarvest, CruiseData, DeclineEngagement, PostToMarketplace, Project,
    ProjectCommand, ProjectEvent, RateSet, RetractCruise, SubmitCruise,
};

use crate::acceptance::activity_for;
use crate::commit::{AttemptError, commit_with_retry};
use crate::document_store::{AtomicBatch, DocumentStore, collections};
use crate::error::ServiceResult;
use crate::repository::Repository;

/// Transitions a caller may request directly.
///
/// Quote acceptance is absent on purpose: it only runs through
/// [`crate::AcceptanceProtocol`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum WorkflowCommand {
    SubmitCruise {
        cruise_data: CruiseData,
        #[serde(default)]
        rate_sets: Option<Vec<RateSet>>,
    },
    RetractCruise,
    ApproveCruise,
    PostToMarketplace { sale_id: SaleId },
    DeclineEngagement,
    CompleteHarvest,
}

impl WorkflowCommand {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowCommand::SubmitCruise { .. } => "submit_cruise",
            WorkflowCommand::RetractCruise => "retract_cruise",
            WorkflowCommand::ApproveCruise => "approve_cruise",
            WorkflowCommand::PostToMarketplace { .. } => "post_to_marketplace",
            WorkflowCommand::DeclineEngagement => "decline_engagement",
            WorkflowCommand::CompleteHarvest => "complete_harvest",
        }
    }

    fn into_project_command(
        self,
        caller: Caller,
        property_acreage: f64,
        occurred_at: DateTime<Utc>,
    ) -> ProjectCommand {
        match self {
            WorkflowCommand::SubmitCruise {
                cruise_data,
                rate_sets,
            } => ProjectCommand::SubmitCruise(SubmitCruise {
                caller,
                cruise_data,
                rate_sets,
                property_acreage: Some(property_acreage),
                occurred_at,
            }),
            WorkflowCommand::RetractCruise => {
                ProjectCommand::RetractCruise(RetractCruise { caller, occurred_at })
            }
            WorkflowCommand::ApproveCruise => {
                ProjectCommand::ApproveCruise(ApproveCruise { caller, occurred_at })
            }
            WorkflowCommand::PostToMarketplace { sale_id } => {
                ProjectCommand::PostToMarketplace(PostToMarketplace {
                    caller,
                    sale_id,
                    occurred_at,
                })
            }
            WorkflowCommand::DeclineEngagement => {
                ProjectCommand::DeclineEngagement(DeclineEngagement { caller, occurred_at })
            }
            WorkflowCommand::CompleteHarvest => {
                ProjectCommand::CompleteHarvest(CompleteHarvest { caller, occurred_at })
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProjectWorkflow<S> {
    repo: Repository<S>,
    max_attempts: u32,
}

impl<S: DocumentStore> ProjectWorkflow<S> {
    pub fn new(store: S, max_attempts: u32) -> Self {
        Self {
            repo: Repository::new(store),
            max_attempts,
        }
    }

    /// Run one transition and return the committed project.
    pub fn dispatch(
        &self,
        caller: &Caller,
        project_id: ProjectId,
        command: WorkflowCommand,
        now: DateTime<Utc>,
    ) -> ServiceResult<Project> {
        let name = command.name();
        let result = commit_with_retry(name, self.max_attempts, || {
            self.attempt(caller, project_id, command.clone(), now)
        });

        match &result {
            Ok(project) => tracing::info!(
                project_id = %project_id,
                command = name,
                status = %project.status(),
                "project transition committed"
            ),
            Err(err) => tracing::warn!(
                project_id = %project_id,
                command = name,
                kind = %err.kind(),
                error = %err.message(),
                "project transition rejected"
            ),
        }
        result
    }

    fn attempt(
        &self,
        caller: &Caller,
        project_id: ProjectId,
        command: WorkflowCommand,
        now: DateTime<Utc>,
    ) -> Result<Project, AttemptError> {
        let mut project = self.repo.load_project(project_id)?;
        let (property, _) = self.repo.load_property(project.property_id())?;
        let read_version = project.version();

        let command = command.into_project_command(*caller, property.acreage, now);
        let events = project.handle(&command)?;
        let accepted_quote = project.accepted_quote_id();
        for event in &events {
            project.apply(event);
        }

        let mut batch = AtomicBatch::new()
            .require(collections::PROJECTS, project_id, ExpectedVersion::exact(read_version))
            .set(collections::PROJECTS, project_id, &project)?;

        for event in &events {
            let mut record = activity_for(project_id, event);
            if let ProjectEvent::SalePosted { sale_id, .. } = event {
                let sale = Sale::from_project(*sale_id, &project, &property, now)?;
                batch = batch.create(collections::SALES, sale_id, &sale)?;
                record = record.with_subject(sale_id);
            }
            if let (ProjectEvent::EngagementDeclined { .. }, Some(quote_id)) =
                (event, accepted_quote)
            {
                batch = self.release_inquiry(batch, caller, quote_id, now)?;
            }
            batch = batch.create(collections::ACTIVITY, record.id, &record)?;
        }

        self.repo.store().run_atomic_batch(batch)?;
        Ok(project.with_version(read_version + 1))
    }

    /// Close the inquiry behind a declined engagement so its quote cannot be accepted again.
    fn release_inquiry(
        &self,
        batch: AtomicBatch,
        caller: &Caller,
        quote_id: QuoteId,
        now: DateTime<Utc>,
    ) -> Result<AtomicBatch, AttemptError> {
        let quote = self.repo.load_quote(quote_id)?;
        let (mut inquiry, version) = self.repo.load_inquiry(quote.inquiry_id)?;
        if inquiry.status != InquiryStatus::Quoted {
            return Ok(batch);
        }
        inquiry.release(caller, now)?;
        Ok(batch
            .require(collections::INQUIRIES, inquiry.id, ExpectedVersion::exact(version))
            .set(collections::INQUIRIES, inquiry.id, &inquiry)?)
    }
}
