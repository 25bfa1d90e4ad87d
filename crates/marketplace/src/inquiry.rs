use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use timberline_auth::{Caller, ensure_owner, ensure_recipient};
use timberline_core::{DomainError, DomainResult, Entity, InquiryId, ProjectId, PropertyId, QuoteId, UserId};
use timberline_events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatus {
    Pending,
    Quoted,
    Declined,
    Withdrawn,
    Archived,
}

impl InquiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InquiryStatus::Pending => "pending",
            InquiryStatus::Quoted => "quoted",
            InquiryStatus::Declined => "declined",
            InquiryStatus::Withdrawn => "withdrawn",
            InquiryStatus::Archived => "archived",
        }
    }

    /// Still awaiting a response or a landowner decision.
    pub fn is_open(&self) -> bool {
        matches!(self, InquiryStatus::Pending | InquiryStatus::Quoted)
    }

    /// Ended without producing an engagement.
    pub fn is_closed_out(&self) -> bool {
        matches!(self, InquiryStatus::Declined | InquiryStatus::Withdrawn)
    }
}

impl core::fmt::Display for InquiryStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A landowner's request to one professional for a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: InquiryId,
    pub project_id: ProjectId,
    pub property_id: PropertyId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    #[serde(default)]
    pub message: String,
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InquiryEvent {
    Sent {
        inquiry_id: InquiryId,
        project_id: ProjectId,
        actor_id: UserId,
        to_user_id: UserId,
        occurred_at: DateTime<Utc>,
    },
    Quoted {
        inquiry_id: InquiryId,
        project_id: ProjectId,
        actor_id: UserId,
        quote_id: QuoteId,
        amount: f64,
        occurred_at: DateTime<Utc>,
    },
    Declined {
        inquiry_id: InquiryId,
        project_id: ProjectId,
        actor_id: UserId,
        occurred_at: DateTime<Utc>,
    },
    Withdrawn {
        inquiry_id: InquiryId,
        project_id: ProjectId,
        actor_id: UserId,
        occurred_at: DateTime<Utc>,
    },
}

impl InquiryEvent {
    pub fn actor_id(&self) -> UserId {
        match self {
            InquiryEvent::Sent { actor_id, .. }
            | InquiryEvent::Quoted { actor_id, .. }
            | InquiryEvent::Declined { actor_id, .. }
            | InquiryEvent::Withdrawn { actor_id, .. } => *actor_id,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            InquiryEvent::Sent { .. } => "Inquiry sent to a professional".to_string(),
            InquiryEvent::Quoted { amount, .. } => format!("Quote submitted for ${amount:.2}"),
            InquiryEvent::Declined { .. } => "Professional declined the inquiry".to_string(),
            InquiryEvent::Withdrawn { .. } => "Landowner withdrew the inquiry".to_string(),
        }
    }
}

impl Event for InquiryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InquiryEvent::Sent { .. } => "inquiry.sent",
            InquiryEvent::Quoted { .. } => "inquiry.quoted",
            InquiryEvent::Declined { .. } => "inquiry.declined",
            InquiryEvent::Withdrawn { .. } => "inquiry.withdrawn",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InquiryEvent::Sent { occurred_at, .. }
            | InquiryEvent::Quoted { occurred_at, .. }
            | InquiryEvent::Declined { occurred_at, .. }
            | InquiryEvent::Withdrawn { occurred_at, .. } => *occurred_at,
        }
    }
}

impl Inquiry {
    /// Open a new `pending` inquiry from `caller` to a professional.
    pub fn send(
        id: InquiryId,
        project_id: ProjectId,
        property_id: PropertyId,
        caller: &Caller,
        to_user_id: UserId,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<(Self, InquiryEvent)> {
        if caller.is(to_user_id) {
            return Err(DomainError::validation("cannot send an inquiry to yourself"));
        }

        let inquiry = Self {
            id,
            project_id,
            property_id,
            from_user_id: caller.user_id,
            to_user_id,
            message: message.into().trim().to_string(),
            status: InquiryStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        let event = InquiryEvent::Sent {
            inquiry_id: id,
            project_id,
            actor_id: caller.user_id,
            to_user_id,
            occurred_at: now,
        };
        Ok((inquiry, event))
    }

    fn ensure_status(&self, allowed: &[InquiryStatus], action: &str) -> DomainResult<()> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(DomainError::precondition(format!(
                "cannot {action} an inquiry that is {}",
                self.status
            )))
        }
    }

    /// Recipient answers with a quote. Amount validation lives on [`crate::Quote`].
    pub fn mark_quoted(
        &mut self,
        caller: &Caller,
        quote_id: QuoteId,
        amount: f64,
        now: DateTime<Utc>,
    ) -> DomainResult<InquiryEvent> {
        ensure_recipient(caller, self.to_user_id)?;
        self.ensure_status(&[InquiryStatus::Pending], "quote")?;

        self.status = InquiryStatus::Quoted;
        self.updated_at = now;
        Ok(InquiryEvent::Quoted {
            inquiry_id: self.id,
            project_id: self.project_id,
            actor_id: caller.user_id,
            quote_id,
            amount,
            occurred_at: now,
        })
    }

    pub fn decline(&mut self, caller: &Caller, now: DateTime<Utc>) -> DomainResult<InquiryEvent> {
        ensure_recipient(caller, self.to_user_id)?;
        self.ensure_status(&[InquiryStatus::Pending], "decline")?;

        self.status = InquiryStatus::Declined;
        self.updated_at = now;
        Ok(InquiryEvent::Declined {
            inquiry_id: self.id,
            project_id: self.project_id,
            actor_id: caller.user_id,
            occurred_at: now,
        })
    }

    pub fn withdraw(&mut self, caller: &Caller, now: DateTime<Utc>) -> DomainResult<InquiryEvent> {
        ensure_owner(caller, self.from_user_id, "inquiry")?;
        self.ensure_status(&[InquiryStatus::Pending, InquiryStatus::Quoted], "withdraw")?;

        self.status = InquiryStatus::Withdrawn;
        self.updated_at = now;
        Ok(InquiryEvent::Withdrawn {
            inquiry_id: self.id,
            project_id: self.project_id,
            actor_id: caller.user_id,
            occurred_at: now,
        })
    }

    /// A quote can only turn into an engagement while its inquiry stands at `quoted`.
    pub fn ensure_acceptable(&self) -> DomainResult<()> {
        self.ensure_status(&[InquiryStatus::Quoted], "accept a quote on")
    }

    /// The engaged professional walks away; the old quote can no longer be accepted.
    pub fn release(&mut self, caller: &Caller, now: DateTime<Utc>) -> DomainResult<()> {
        ensure_recipient(caller, self.to_user_id)?;
        self.ensure_status(&[InquiryStatus::Quoted], "release")?;

        self.status = InquiryStatus::Declined;
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for Inquiry {
    type Id = InquiryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// True when a project's inquiries have all been declined or withdrawn.
///
/// An empty list is not "all closed": a project nobody was asked about yet is
/// still live.
pub fn all_closed<'a>(inquiries: impl IntoIterator<Item = &'a Inquiry>) -> bool {
    let mut any = false;
    for inquiry in inquiries {
        if !inquiry.status.is_closed_out() {
            return false;
        }
        any = true;
    }
    any
}

#[cfg(test)]
mod tests {
    use super::*;
    use timberline_auth::RoleKind;

    fn pending() -> (Inquiry, Caller, Caller) {
        let owner = Caller::landowner(UserId::new());
        let pro = Caller::new(UserId::new(), RoleKind::Forester);
        let (inquiry, event) = Inquiry::send(
            InquiryId::new(),
            ProjectId::new(),
            PropertyId::new(),
            &owner,
            pro.user_id,
            "  Need a cruise on 40 ac  ",
            Utc::now(),
        )
        .unwrap();
        assert_eq!(event.event_type(), "inquiry.sent");
        (inquiry, owner, pro)
    }

    #[test]
    fn send_starts_pending_and_trims_message() {
        let (inquiry, owner, pro) = pending();
        assert_eq!(inquiry.status, InquiryStatus::Pending);
        assert_eq!(inquiry.from_user_id, owner.user_id);
        assert_eq!(inquiry.to_user_id, pro.user_id);
        assert_eq!(inquiry.message, "Need a cruise on 40 ac");
    }

    #[test]
    fn only_recipient_may_quote_or_decline() {
        let (mut inquiry, owner, pro) = pending();

        let err = inquiry.mark_quoted(&owner, QuoteId::new(), 100.0, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(_)));
        let err = inquiry.decline(&owner, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(_)));

        inquiry.mark_quoted(&pro, QuoteId::new(), 100.0, Utc::now()).unwrap();
        assert_eq!(inquiry.status, InquiryStatus::Quoted);

        // A quoted inquiry can no longer be declined or re-quoted.
        assert!(matches!(
            inquiry.decline(&pro, Utc::now()),
            Err(DomainError::FailedPrecondition(_))
        ));
        assert!(matches!(
            inquiry.mark_quoted(&pro, QuoteId::new(), 5.0, Utc::now()),
            Err(DomainError::FailedPrecondition(_))
        ));
    }

    #[test]
    fn owner_withdraws_pending_or_quoted() {
        let (mut inquiry, owner, pro) = pending();
        assert!(matches!(
            inquiry.withdraw(&pro, Utc::now()),
            Err(DomainError::PermissionDenied(_))
        ));

        inquiry.mark_quoted(&pro, QuoteId::new(), 10.0, Utc::now()).unwrap();
        inquiry.withdraw(&owner, Utc::now()).unwrap();
        assert_eq!(inquiry.status, InquiryStatus::Withdrawn);

        assert!(matches!(
            inquiry.withdraw(&owner, Utc::now()),
            Err(DomainError::FailedPrecondition(_))
        ));
    }

    #[test]
    fn only_quoted_inquiries_are_acceptable_or_releasable() {
        let (mut inquiry, owner, pro) = pending();
        assert!(matches!(inquiry.ensure_acceptable(), Err(DomainError::FailedPrecondition(_))));
        assert!(matches!(
            inquiry.release(&pro, Utc::now()),
            Err(DomainError::FailedPrecondition(_))
        ));

        inquiry.mark_quoted(&pro, QuoteId::new(), 10.0, Utc::now()).unwrap();
        assert!(inquiry.ensure_acceptable().is_ok());
        assert!(matches!(
            inquiry.release(&owner, Utc::now()),
            Err(DomainError::PermissionDenied(_))
        ));

        inquiry.release(&pro, Utc::now()).unwrap();
        assert_eq!(inquiry.status, InquiryStatus::Declined);
        assert!(matches!(inquiry.ensure_acceptable(), Err(DomainError::FailedPrecondition(_))));

        let (mut withdrawn, owner, pro) = pending();
        withdrawn.mark_quoted(&pro, QuoteId::new(), 10.0, Utc::now()).unwrap();
        withdrawn.withdraw(&owner, Utc::now()).unwrap();
        assert!(matches!(withdrawn.ensure_acceptable(), Err(DomainError::FailedPrecondition(_))));
    }

    #[test]
    fn cannot_inquire_yourself() {
        let owner = Caller::landowner(UserId::new());
        let err = Inquiry::send(
            InquiryId::new(),
            ProjectId::new(),
            PropertyId::new(),
            &owner,
            owner.user_id,
            "",
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn all_closed_requires_every_inquiry_closed_out() {
        let (mut a, owner, pro) = pending();
        let (mut b, _, _) = pending();
        assert!(!all_closed([] as [&Inquiry; 0]));
        assert!(!all_closed([&a, &b]));

        a.decline(&pro, Utc::now()).unwrap();
        assert!(!all_closed([&a, &b]));

        b.from_user_id = owner.user_id;
        b.withdraw(&owner, Utc::now()).unwrap();
        assert!(all_closed([&a, &b]));

        let (mut c, _, c_pro) = pending();
        c.mark_quoted(&c_pro, QuoteId::new(), 1.0, Utc::now()).unwrap();
        assert!(!all_closed([&a, &b, &c]));
    }

    #[test]
    fn wire_shape_is_camel_case() {
        let (inquiry, _, _) = pending();
        let json = serde_json::to_value(&inquiry).unwrap();
        assert_eq!(json["status"], "pending");
        assert!(json.get("toUserId").is_some());
        assert!(json.get("fromUserId").is_some());
    }
}
