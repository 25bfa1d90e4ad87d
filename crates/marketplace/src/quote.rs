use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use timberline_auth::{Caller, RoleKind};
use timberline_core::{DomainError, DomainResult, Entity, InquiryId, ProjectId, PropertyId, QuoteId, UserId};
use timberline_projects::{AcceptQuote, Project, ProjectCommand};

use crate::inquiry::Inquiry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Pending,
    Accepted,
}

/// A professional's priced answer to an inquiry.
///
/// Immutable after creation. Acceptance is recorded on the project
/// (`acceptedQuoteId`), so the stored `status` stays `pending`; use
/// [`Quote::effective_status`] to read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: QuoteId,
    pub inquiry_id: InquiryId,
    pub project_id: ProjectId,
    pub property_id: PropertyId,
    pub landowner_id: UserId,
    pub professional_id: UserId,
    pub professional_role: RoleKind,
    pub amount: f64,
    #[serde(default)]
    pub message: String,
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
}

impl Quote {
    /// Build a quote answering `inquiry`.
    ///
    /// The caller's role comes from their stored profile, not the token.
    pub fn for_inquiry(
        id: QuoteId,
        inquiry: &Inquiry,
        professional_role: RoleKind,
        amount: f64,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(DomainError::validation("quote amount must be a positive number"));
        }
        if !professional_role.is_professional() {
            return Err(DomainError::precondition(format!(
                "role '{professional_role}' cannot submit quotes"
            )));
        }

        Ok(Self {
            id,
            inquiry_id: inquiry.id,
            project_id: inquiry.project_id,
            property_id: inquiry.property_id,
            landowner_id: inquiry.from_user_id,
            professional_id: inquiry.to_user_id,
            professional_role,
            amount,
            message: message.into().trim().to_string(),
            status: QuoteStatus::Pending,
            created_at: now,
        })
    }

    pub fn effective_status(&self, project: &Project) -> QuoteStatus {
        if project.accepted_quote_id() == Some(self.id) {
            QuoteStatus::Accepted
        } else {
            self.status
        }
    }

    /// The project command that accepting this quote issues.
    pub fn accept_command(
        &self,
        caller: Caller,
        project_id: ProjectId,
        now: DateTime<Utc>,
    ) -> DomainResult<ProjectCommand> {
        if self.project_id != project_id {
            return Err(DomainError::validation(format!(
                "quote {} does not belong to project {project_id}",
                self.id
            )));
        }

        Ok(ProjectCommand::AcceptQuote(AcceptQuote {
            caller,
            quote_id: self.id,
            professional_id: self.professional_id,
            professional_role: self.professional_role,
            occurred_at: now,
        }))
    }
}

impl Entity for Quote {
    type Id = QuoteId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
