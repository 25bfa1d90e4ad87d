//! Inquiry → quote workflow.
//!
//! Every mutation commits the inquiry with a version precondition together
//! with its activity record. Declines and withdrawals that leave a project
//! with no live inquiry delete the unassigned project in the same batch,
//! without an activity record for the deleted project. Sending an inquiry
//! touches the project so that deletion cannot race a new inquiry.

use chrono::{DateTime, Utc};
use serde_json::json;

use timberline_auth::{Caller, ensure_owner};
use timberline_core::{AggregateRoot, ExpectedVersion, InquiryId, ProjectId, QuoteId, UserId};
use timberline_events::ActivityRecord;
use timberline_marketplace::{Inquiry, InquiryEvent, Quote, all_closed};
use timberline_projects::ProjectStatus;

use crate::commit::{AttemptError, commit_with_retry};
use crate::document_store::{AtomicBatch, DocumentStore, collections};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::Repository;

/// Result of a decline or withdrawal.
#[derive(Debug, Clone, PartialEq)]
pub struct InquiryOutcome {
    pub inquiry: Inquiry,
    /// The project had no live inquiry left and was deleted.
    pub project_cancelled: bool,
}

#[derive(Debug, Clone)]
pub struct InquiryWorkflow<S> {
    repo: Repository<S>,
    max_attempts: u32,
}

fn activity_for(event: &InquiryEvent, project_id: ProjectId, inquiry_id: InquiryId) -> ActivityRecord {
    ActivityRecord::from_event(project_id, event.actor_id(), event, event.describe()).with_subject(inquiry_id)
}

impl<S: DocumentStore> InquiryWorkflow<S> {
    pub fn new(store: S, max_attempts: u32) -> Self {
        Self {
            repo: Repository::new(store),
            max_attempts,
        }
    }

    pub fn send_inquiry(
        &self,
        caller: &Caller,
        project_id: ProjectId,
        to_user_id: UserId,
        message: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<Inquiry> {
        let inquiry = commit_with_retry("sendInquiry", self.max_attempts, || {
            let project = self.repo.load_project(project_id)?;
            ensure_owner(caller, project.owner_id(), "project")?;

            if project.status() != ProjectStatus::Inquiry {
                return Err(ServiceError::failed_precondition(format!(
                    "inquiries can only be sent while the project is in inquiry (currently {})",
                    project.status()
                ))
                .into());
            }

            let target = self.repo.load_user(to_user_id)?;
            if !target.role.is_professional() {
                return Err(ServiceError::failed_precondition(format!(
                    "user {to_user_id} is not a professional"
                ))
                .into());
            }

            let duplicate = self
                .repo
                .inquiries_for_project(project_id)?
                .into_iter()
                .any(|(i, _)| i.to_user_id == to_user_id && i.status.is_open());
            if duplicate {
                return Err(ServiceError::failed_precondition(
                    "an open inquiry to this professional already exists",
                )
                .into());
            }

            let (inquiry, event) = Inquiry::send(
                InquiryId::new(),
                project_id,
                project.property_id(),
                caller,
                to_user_id,
                message,
                now,
            )?;
            let record = activity_for(&event, project_id, inquiry.id).with_subject(to_user_id);

            // Touching the project moves its version, so a racing cancellation re-reads the siblings.
            let batch = AtomicBatch::new()
                .require(collections::PROJECTS, project_id, ExpectedVersion::exact(project.version()))
                .merge(collections::PROJECTS, project_id, json!({ "updatedAt": now }))
                .create(collections::INQUIRIES, inquiry.id, &inquiry)?
                .create(collections::ACTIVITY, record.id, &record)?;
            self.repo.store().run_atomic_batch(batch)?;
            Ok::<_, AttemptError>(inquiry)
        })?;

        tracing::info!(project_id = %project_id, inquiry_id = %inquiry.id, to = %to_user_id, "inquiry sent");
        Ok(inquiry)
    }

    pub fn submit_quote(
        &self,
        caller: &Caller,
        inquiry_id: InquiryId,
        amount: f64,
        message: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<Quote> {
        let quote = commit_with_retry("submitQuote", self.max_attempts, || {
            let (mut inquiry, version) = self.repo.load_inquiry(inquiry_id)?;
            let quote_id = QuoteId::new();
            let event = inquiry.mark_quoted(caller, quote_id, amount, now)?;

            // Role comes from the stored profile, not the token claim.
            let profile = self.repo.load_user(caller.user_id)?;
            let quote = Quote::for_inquiry(quote_id, &inquiry, profile.role.kind(), amount, message, now)?;
            let record = activity_for(&event, inquiry.project_id, inquiry.id).with_subject(quote.id);

            let batch = AtomicBatch::new()
                .require(collections::INQUIRIES, inquiry_id, ExpectedVersion::exact(version))
                .set(collections::INQUIRIES, inquiry_id, &inquiry)?
                .create(collections::QUOTES, quote.id, &quote)?
                .create(collections::ACTIVITY, record.id, &record)?;
            self.repo.store().run_atomic_batch(batch)?;
            Ok::<_, AttemptError>(quote)
        })?;

        tracing::info!(inquiry_id = %inquiry_id, quote_id = %quote.id, amount = quote.amount, "quote submitted");
        Ok(quote)
    }

    pub fn decline_inquiry(
        &self,
        caller: &Caller,
        inquiry_id: InquiryId,
        now: DateTime<Utc>,
    ) -> ServiceResult<InquiryOutcome> {
        self.close(caller, inquiry_id, now, "declineInquiry", Inquiry::decline)
    }

    pub fn withdraw_inquiry(
        &self,
        caller: &Caller,
        inquiry_id: InquiryId,
        now: DateTime<Utc>,
    ) -> ServiceResult<InquiryOutcome> {
        self.close(caller, inquiry_id, now, "withdrawInquiry", Inquiry::withdraw)
    }

    fn close(
        &self,
        caller: &Caller,
        inquiry_id: InquiryId,
        now: DateTime<Utc>,
        operation: &'static str,
        transition: fn(&mut Inquiry, &Caller, DateTime<Utc>) -> timberline_core::DomainResult<InquiryEvent>,
    ) -> ServiceResult<InquiryOutcome> {
        let outcome = commit_with_retry(operation, self.max_attempts, || {
            let (mut inquiry, version) = self.repo.load_inquiry(inquiry_id)?;
            let event = transition(&mut inquiry, caller, now)?;
            let project_id = inquiry.project_id;
            let record = activity_for(&event, project_id, inquiry.id);

            let mut batch = AtomicBatch::new()
                .require(collections::INQUIRIES, inquiry_id, ExpectedVersion::exact(version))
                .set(collections::INQUIRIES, inquiry_id, &inquiry)?;

            let mut project_cancelled = false;
            let project = self.repo.find_project(project_id)?;
            let keeps_trail = project.is_some();
            if let Some(project) = project {
                let siblings = self.repo.inquiries_for_project(project_id)?;
                let after: Vec<&Inquiry> = siblings
                    .iter()
                    .map(|(i, _)| if i.id == inquiry.id { &inquiry } else { i })
                    .collect();

                if all_closed(after) && project.status() == ProjectStatus::Inquiry && !project.is_assigned() {
                    // Every sibling must still be what we saw, or a new quote could race the delete.
                    for (sibling, sibling_version) in &siblings {
                        if sibling.id != inquiry.id {
                            batch = batch.require(
                                collections::INQUIRIES,
                                sibling.id,
                                ExpectedVersion::exact(*sibling_version),
                            );
                        }
                    }
                    batch = batch
                        .require(collections::PROJECTS, project_id, ExpectedVersion::exact(project.version()))
                        .delete(collections::PROJECTS, project_id);
                    project_cancelled = true;
                }
            }

            // A deleted or missing project keeps no activity trail.
            if keeps_trail && !project_cancelled {
                batch = batch.create(collections::ACTIVITY, record.id, &record)?;
            }
            self.repo.store().run_atomic_batch(batch)?;
            Ok::<_, AttemptError>(InquiryOutcome {
                inquiry,
                project_cancelled,
            })
        })?;

        tracing::info!(
            inquiry_id = %inquiry_id,
            status = %outcome.inquiry.status,
            project_cancelled = outcome.project_cancelled,
            "inquiry closed"
        );
        Ok(outcome)
    }
}
