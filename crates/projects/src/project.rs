use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use timberline_auth::{Caller, Engagement, RoleKind, ensure_assignee, ensure_owner};
use timberline_core::{
    Aggregate, AggregateRoot, DomainError, ProjectId, PropertyId, QuoteId, SaleId, UserId,
};
use timberline_events::Event;

use crate::cruise::{CruiseData, RateSet};

/// Project status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Inquiry,
    CruiseInProgress,
    PendingApproval,
    OpenForBids,
    HarvestInProgress,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Inquiry => "inquiry",
            ProjectStatus::CruiseInProgress => "cruise_in_progress",
            ProjectStatus::PendingApproval => "pending_approval",
            ProjectStatus::OpenForBids => "open_for_bids",
            ProjectStatus::HarvestInProgress => "harvest_in_progress",
            ProjectStatus::Completed => "completed",
        }
    }
}

impl core::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single professional engaged on a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Assignment {
    /// Persisted as `foresterId`.
    Forester(UserId),
    /// Buyer or logging contractor, persisted as `supplierId`.
    Supplier(UserId),
}

impl Assignment {
    pub fn for_engagement(engagement: Engagement, professional_id: UserId) -> Self {
        match engagement {
            Engagement::Cruise => Assignment::Forester(professional_id),
            Engagement::Harvest => Assignment::Supplier(professional_id),
        }
    }

    pub fn user_id(&self) -> UserId {
        match self {
            Assignment::Forester(id) | Assignment::Supplier(id) => *id,
        }
    }
}

/// Aggregate root: Project.
///
/// Serialized through [`ProjectDocument`], which is the stored shape with the
/// two mutually exclusive assignment fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProjectDocument", into = "ProjectDocument")]
pub struct Project {
    id: ProjectId,
    owner_id: UserId,
    property_id: PropertyId,
    name: String,
    status: ProjectStatus,
    assignment: Option<Assignment>,
    quote_accepted_at: Option<DateTime<Utc>>,
    accepted_quote_id: Option<QuoteId>,
    cruise_data: Option<CruiseData>,
    rate_sets: Option<Vec<RateSet>>,
    involved_users: BTreeSet<UserId>,
    sale_id: Option<SaleId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
}

impl Project {
    /// A fresh project in `inquiry`, owned by the landowner.
    pub fn new(
        id: ProjectId,
        owner_id: UserId,
        property_id: PropertyId,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            property_id,
            name: name.into(),
            status: ProjectStatus::Inquiry,
            assignment: None,
            quote_accepted_at: None,
            accepted_quote_id: None,
            cruise_data: None,
            rate_sets: None,
            involved_users: BTreeSet::from([owner_id]),
            sale_id: None,
            created_at,
            updated_at: created_at,
            version: 0,
        }
    }

    /// Attach the stored revision this state was read at.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn project_id(&self) -> ProjectId {
        self.id
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    pub fn property_id(&self) -> PropertyId {
        self.property_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> ProjectStatus {
        self.status
    }

    pub fn assignment(&self) -> Option<Assignment> {
        self.assignment
    }

    pub fn forester_id(&self) -> Option<UserId> {
        match self.assignment {
            Some(Assignment::Forester(id)) => Some(id),
            _ => None,
        }
    }

    pub fn supplier_id(&self) -> Option<UserId> {
        match self.assignment {
            Some(Assignment::Supplier(id)) => Some(id),
            _ => None,
        }
    }

    pub fn quote_accepted_at(&self) -> Option<DateTime<Utc>> {
        self.quote_accepted_at
    }

    pub fn accepted_quote_id(&self) -> Option<QuoteId> {
        self.accepted_quote_id
    }

    pub fn cruise_data(&self) -> Option<&CruiseData> {
        self.cruise_data.as_ref()
    }

    pub fn rate_sets(&self) -> Option<&[RateSet]> {
        self.rate_sets.as_deref()
    }

    pub fn involved_users(&self) -> &BTreeSet<UserId> {
        &self.involved_users
    }

    pub fn sale_id(&self) -> Option<SaleId> {
        self.sale_id
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_assigned(&self) -> bool {
        self.assignment.is_some()
    }

    pub fn can_view(&self, user_id: UserId) -> bool {
        self.involved_users.contains(&user_id)
    }
}

impl AggregateRoot for Project {
    type Id = ProjectId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Stored project shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    pub id: ProjectId,
    pub owner_id: UserId,
    pub property_id: PropertyId,
    #[serde(default)]
    pub name: String,
    pub status: ProjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forester_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_accepted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_quote_id: Option<QuoteId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cruise_data: Option<CruiseData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_sets: Option<Vec<RateSet>>,
    #[serde(default)]
    pub involved_users: BTreeSet<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_id: Option<SaleId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProjectDocument> for Project {
    type Error = DomainError;

    fn try_from(doc: ProjectDocument) -> Result<Self, Self::Error> {
        let assignment = match (doc.forester_id, doc.supplier_id) {
            (Some(_), Some(_)) => {
                return Err(DomainError::invariant(
                    "project has both foresterId and supplierId set",
                ));
            }
            (Some(id), None) => Some(Assignment::Forester(id)),
            (None, Some(id)) => Some(Assignment::Supplier(id)),
            (None, None) => None,
        };

        Ok(Self {
            id: doc.id,
            owner_id: doc.owner_id,
            property_id: doc.property_id,
            name: doc.name,
            status: doc.status,
            assignment,
            quote_accepted_at: doc.quote_accepted_at,
            accepted_quote_id: doc.accepted_quote_id,
            cruise_data: doc.cruise_data,
            rate_sets: doc.rate_sets,
            involved_users: doc.involved_users,
            sale_id: doc.sale_id,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
            version: 0,
        })
    }
}

impl From<Project> for ProjectDocument {
    fn from(p: Project) -> Self {
        let forester_id = p.forester_id();
        let supplier_id = p.supplier_id();
        Self {
            id: p.id,
            owner_id: p.owner_id,
            property_id: p.property_id,
            name: p.name,
            status: p.status,
            forester_id,
            supplier_id,
            quote_accepted_at: p.quote_accepted_at,
            accepted_quote_id: p.accepted_quote_id,
            cruise_data: p.cruise_data,
            rate_sets: p.rate_sets,
            involved_users: p.involved_users,
            sale_id: p.sale_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Command: AcceptQuote (issued only by the acceptance protocol).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptQuote {
    pub caller: Caller,
    pub quote_id: QuoteId,
    pub professional_id: UserId,
    pub professional_role: RoleKind,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SubmitCruise (assigned forester attaches inventory + sale terms).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitCruise {
    pub caller: Caller,
    pub cruise_data: CruiseData,
    pub rate_sets: Option<Vec<RateSet>>,
    /// Acreage of the project's property, read by the workflow layer.
    pub property_acreage: Option<f64>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RetractCruise (forester pulls a submission back for editing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetractCruise {
    pub caller: Caller,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ApproveCruise (landowner approves and completes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproveCruise {
    pub caller: Caller,
    pub occurred_at: DateTime<Utc>,
}

/// Command: PostToMarketplace (landowner lists the sale for bids).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostToMarketplace {
    pub caller: Caller,
    pub sale_id: SaleId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DeclineEngagement (forester walks away from the project).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclineEngagement {
    pub caller: Caller,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CompleteHarvest (landowner closes a harvest engagement).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteHarvest {
    pub caller: Caller,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProjectCommand {
    AcceptQuote(AcceptQuote),
    SubmitCruise(SubmitCruise),
    RetractCruise(RetractCruise),
    ApproveCruise(ApproveCruise),
    PostToMarketplace(PostToMarketplace),
    DeclineEngagement(DeclineEngagement),
    CompleteHarvest(CompleteHarvest),
}

impl ProjectCommand {
    pub fn caller(&self) -> &Caller {
        match self {
            ProjectCommand::AcceptQuote(c) => &c.caller,
            ProjectCommand::SubmitCruise(c) => &c.caller,
            ProjectCommand::RetractCruise(c) => &c.caller,
            ProjectCommand::ApproveCruise(c) => &c.caller,
            ProjectCommand::PostToMarketplace(c) => &c.caller,
            ProjectCommand::DeclineEngagement(c) => &c.caller,
            ProjectCommand::CompleteHarvest(c) => &c.caller,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProjectEvent {
    QuoteAccepted {
        project_id: ProjectId,
        actor_id: UserId,
        quote_id: QuoteId,
        professional_id: UserId,
        engagement: Engagement,
        status: ProjectStatus,
        occurred_at: DateTime<Utc>,
    },
    CruiseSubmitted {
        project_id: ProjectId,
        actor_id: UserId,
        cruise_data: CruiseData,
        rate_sets: Option<Vec<RateSet>>,
        occurred_at: DateTime<Utc>,
    },
    CruiseRetracted {
        project_id: ProjectId,
        actor_id: UserId,
        occurred_at: DateTime<Utc>,
    },
    CruiseApproved {
        project_id: ProjectId,
        actor_id: UserId,
        occurred_at: DateTime<Utc>,
    },
    SalePosted {
        project_id: ProjectId,
        actor_id: UserId,
        sale_id: SaleId,
        occurred_at: DateTime<Utc>,
    },
    EngagementDeclined {
        project_id: ProjectId,
        actor_id: UserId,
        professional_id: UserId,
        occurred_at: DateTime<Utc>,
    },
    HarvestCompleted {
        project_id: ProjectId,
        actor_id: UserId,
        occurred_at: DateTime<Utc>,
    },
}

impl ProjectEvent {
    pub fn actor_id(&self) -> UserId {
        match self {
            ProjectEvent::QuoteAccepted { actor_id, .. }
            | ProjectEvent::CruiseSubmitted { actor_id, .. }
            | ProjectEvent::CruiseRetracted { actor_id, .. }
            | ProjectEvent::CruiseApproved { actor_id, .. }
            | ProjectEvent::SalePosted { actor_id, .. }
            | ProjectEvent::EngagementDeclined { actor_id, .. }
            | ProjectEvent::HarvestCompleted { actor_id, .. } => *actor_id,
        }
    }

    /// Human-readable feed line.
    pub fn describe(&self) -> String {
        match self {
            ProjectEvent::QuoteAccepted { engagement, status, .. } => match engagement {
                Engagement::Cruise => format!("Quote accepted; forester engaged ({status})"),
                Engagement::Harvest => format!("Quote accepted; harvest contractor engaged ({status})"),
            },
            ProjectEvent::CruiseSubmitted { cruise_data, .. } => format!(
                "Cruise submitted for approval ({} stand(s))",
                cruise_data.inventory.stands().len()
            ),
            ProjectEvent::CruiseRetracted { .. } => "Cruise retracted for editing".to_string(),
            ProjectEvent::CruiseApproved { .. } => "Cruise approved; project completed".to_string(),
            ProjectEvent::SalePosted { .. } => "Timber sale posted to the marketplace".to_string(),
            ProjectEvent::EngagementDeclined { .. } => {
                "Professional declined the engagement".to_string()
            }
            ProjectEvent::HarvestCompleted { .. } => "Harvest completed".to_string(),
        }
    }
}

impl Event for ProjectEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProjectEvent::QuoteAccepted { .. } => "project.quote.accepted",
            ProjectEvent::CruiseSubmitted { .. } => "project.cruise.submitted",
            ProjectEvent::CruiseRetracted { .. } => "project.cruise.retracted",
            ProjectEvent::CruiseApproved { .. } => "project.cruise.approved",
            ProjectEvent::SalePosted { .. } => "project.sale.posted",
            ProjectEvent::EngagementDeclined { .. } => "project.engagement.declined",
            ProjectEvent::HarvestCompleted { .. } => "project.harvest.completed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProjectEvent::QuoteAccepted { occurred_at, .. }
            | ProjectEvent::CruiseSubmitted { occurred_at, .. }
            | ProjectEvent::CruiseRetracted { occurred_at, .. }
            | ProjectEvent::CruiseApproved { occurred_at, .. }
            | ProjectEvent::SalePosted { occurred_at, .. }
            | ProjectEvent::EngagementDeclined { occurred_at, .. }
            | ProjectEvent::HarvestCompleted { occurred_at, .. } => *occurred_at,
        }
    }
}

impl Aggregate for Project {
    type Command = ProjectCommand;
    type Event = ProjectEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ProjectEvent::QuoteAccepted {
                quote_id,
                professional_id,
                engagement,
                status,
                occurred_at,
                ..
            } => {
                self.status = *status;
                self.assignment = Some(Assignment::for_engagement(*engagement, *professional_id));
                self.quote_accepted_at = Some(*occurred_at);
                self.accepted_quote_id = Some(*quote_id);
                self.involved_users.insert(*professional_id);
            }
            ProjectEvent::CruiseSubmitted {
                cruise_data,
                rate_sets,
                ..
            } => {
                self.status = ProjectStatus::PendingApproval;
                self.cruise_data = Some(cruise_data.clone());
                if rate_sets.is_some() {
                    self.rate_sets = rate_sets.clone();
                }
            }
            ProjectEvent::CruiseRetracted { .. } => {
                self.status = ProjectStatus::CruiseInProgress;
            }
            ProjectEvent::CruiseApproved { .. } => {
                self.status = ProjectStatus::Completed;
            }
            ProjectEvent::SalePosted { sale_id, .. } => {
                self.status = ProjectStatus::OpenForBids;
                self.sale_id = Some(*sale_id);
            }
            ProjectEvent::EngagementDeclined { .. } => {
                self.status = ProjectStatus::Inquiry;
                self.assignment = None;
                self.quote_accepted_at = None;
                self.accepted_quote_id = None;
            }
            ProjectEvent::HarvestCompleted { .. } => {
                self.status = ProjectStatus::Completed;
            }
        }

        self.updated_at = event.occurred_at();
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ProjectCommand::AcceptQuote(cmd) => self.handle_accept_quote(cmd),
            ProjectCommand::SubmitCruise(cmd) => self.handle_submit_cruise(cmd),
            ProjectCommand::RetractCruise(cmd) => self.handle_retract(cmd),
            ProjectCommand::ApproveCruise(cmd) => self.handle_approve(cmd),
            ProjectCommand::PostToMarketplace(cmd) => self.handle_post(cmd),
            ProjectCommand::DeclineEngagement(cmd) => self.handle_decline(cmd),
            ProjectCommand::CompleteHarvest(cmd) => self.handle_complete_harvest(cmd),
        }
    }
}

impl Project {
    fn ensure_status(&self, allowed: &[ProjectStatus], action: &str) -> Result<(), DomainError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(DomainError::precondition(format!(
                "cannot {action} while project is {}",
                self.status
            )))
        }
    }

    fn ensure_forester(&self, caller: &Caller) -> Result<(), DomainError> {
        ensure_assignee(caller, self.forester_id())?;
        Ok(())
    }

    fn handle_accept_quote(&self, cmd: &AcceptQuote) -> Result<Vec<ProjectEvent>, DomainError> {
        ensure_owner(&cmd.caller, self.owner_id, "project")?;

        if self.is_assigned() {
            return Err(DomainError::precondition(
                "project already has an assigned professional",
            ));
        }

        let engagement = cmd.professional_role.engagement().ok_or_else(|| {
            DomainError::precondition(format!(
                "role '{}' cannot be engaged on a project",
                cmd.professional_role
            ))
        })?;

        self.ensure_status(&[ProjectStatus::Inquiry], "accept a quote")?;

        let status = match engagement {
            Engagement::Cruise => ProjectStatus::CruiseInProgress,
            Engagement::Harvest => ProjectStatus::HarvestInProgress,
        };

        Ok(vec![ProjectEvent::QuoteAccepted {
            project_id: self.id,
            actor_id: cmd.caller.user_id,
            quote_id: cmd.quote_id,
            professional_id: cmd.professional_id,
            engagement,
            status,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_submit_cruise(&self, cmd: &SubmitCruise) -> Result<Vec<ProjectEvent>, DomainError> {
        self.ensure_forester(&cmd.caller)?;
        self.ensure_status(&[ProjectStatus::CruiseInProgress], "submit a cruise")?;

        let cruise_data = cmd.cruise_data.clone().validated(cmd.property_acreage)?;

        Ok(vec![ProjectEvent::CruiseSubmitted {
            project_id: self.id,
            actor_id: cmd.caller.user_id,
            cruise_data,
            rate_sets: cmd.rate_sets.clone(),
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_retract(&self, cmd: &RetractCruise) -> Result<Vec<ProjectEvent>, DomainError> {
        self.ensure_forester(&cmd.caller)?;
        self.ensure_status(&[ProjectStatus::PendingApproval], "retract a cruise")?;

        Ok(vec![ProjectEvent::CruiseRetracted {
            project_id: self.id,
            actor_id: cmd.caller.user_id,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_approve(&self, cmd: &ApproveCruise) -> Result<Vec<ProjectEvent>, DomainError> {
        ensure_owner(&cmd.caller, self.owner_id, "project")?;
        self.ensure_status(&[ProjectStatus::PendingApproval], "approve a cruise")?;

        Ok(vec![ProjectEvent::CruiseApproved {
            project_id: self.id,
            actor_id: cmd.caller.user_id,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_post(&self, cmd: &PostToMarketplace) -> Result<Vec<ProjectEvent>, DomainError> {
        ensure_owner(&cmd.caller, self.owner_id, "project")?;
        self.ensure_status(&[ProjectStatus::PendingApproval], "post a sale")?;

        if self.cruise_data.is_none() {
            return Err(DomainError::precondition("cannot post a sale without cruise data"));
        }

        Ok(vec![ProjectEvent::SalePosted {
            project_id: self.id,
            actor_id: cmd.caller.user_id,
            sale_id: cmd.sale_id,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_decline(&self, cmd: &DeclineEngagement) -> Result<Vec<ProjectEvent>, DomainError> {
        self.ensure_forester(&cmd.caller)?;
        self.ensure_status(
            &[ProjectStatus::CruiseInProgress, ProjectStatus::PendingApproval],
            "decline the engagement",
        )?;

        Ok(vec![ProjectEvent::EngagementDeclined {
            project_id: self.id,
            actor_id: cmd.caller.user_id,
            professional_id: cmd.caller.user_id,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_complete_harvest(
        &self,
        cmd: &CompleteHarvest,
    ) -> Result<Vec<ProjectEvent>, DomainError> {
        ensure_owner(&cmd.caller, self.owner_id, "project")?;
        self.ensure_status(&[ProjectStatus::HarvestInProgress], "complete the harvest")?;

        Ok(vec![ProjectEvent::HarvestCompleted {
            project_id: self.id,
            actor_id: cmd.caller.user_id,
            occurred_at: cmd.occurred_at,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cruise::SaleDetails;
    use timberline_inventory::{DbhRow, Inventory, Product};

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn fresh() -> (Project, UserId) {
        let owner = UserId::new();
        let project = Project::new(ProjectId::new(), owner, PropertyId::new(), "Back 40", test_time());
        (project, owner)
    }

    fn run(project: &mut Project, cmd: ProjectCommand) -> Result<(), DomainError> {
        let events = project.handle(&cmd)?;
        for e in &events {
            project.apply(e);
        }
        Ok(())
    }

    fn accept(project: &mut Project, owner: UserId, professional: UserId, role: RoleKind) {
        run(
            project,
            ProjectCommand::AcceptQuote(AcceptQuote {
                caller: Caller::landowner(owner),
                quote_id: QuoteId::new(),
                professional_id: professional,
                professional_role: role,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
    }

    fn cruise() -> CruiseData {
        CruiseData {
            details: SaleDetails {
                sale_name: "Back 40 Pine".to_string(),
                ..SaleDetails::default()
            },
            inventory: Inventory::entire_tract(
                0.0,
                vec![Product::new("Pine Sawtimber").with_row(DbhRow::tons("14", 100, 200.0))],
            ),
            annotations: None,
        }
    }

    fn submit(project: &mut Project, forester: UserId) -> Result<(), DomainError> {
        run(
            project,
            ProjectCommand::SubmitCruise(SubmitCruise {
                caller: Caller::new(forester, RoleKind::Forester),
                cruise_data: cruise(),
                rate_sets: None,
                property_acreage: Some(40.0),
                occurred_at: test_time(),
            }),
        )
    }

    fn in_pending_approval() -> (Project, UserId, UserId) {
        let (mut project, owner) = fresh();
        let forester = UserId::new();
        accept(&mut project, owner, forester, RoleKind::Forester);
        submit(&mut project, forester).unwrap();
        (project, owner, forester)
    }

    #[test]
    fn forester_quote_starts_cruise() {
        let (mut project, owner) = fresh();
        let forester = UserId::new();
        accept(&mut project, owner, forester, RoleKind::Forester);

        assert_eq!(project.status(), ProjectStatus::CruiseInProgress);
        assert_eq!(project.forester_id(), Some(forester));
        assert_eq!(project.supplier_id(), None);
        assert!(project.quote_accepted_at().is_some());
        assert!(project.involved_users().contains(&forester));
    }

    #[test]
    fn buyer_and_contractor_quotes_start_harvest() {
        for role in [RoleKind::TimberBuyer, RoleKind::LoggingContractor] {
            let (mut project, owner) = fresh();
            let supplier = UserId::new();
            accept(&mut project, owner, supplier, role);

            assert_eq!(project.status(), ProjectStatus::HarvestInProgress);
            assert_eq!(project.supplier_id(), Some(supplier));
            assert_eq!(project.forester_id(), None);
        }
    }

    #[test]
    fn accept_requires_owner() {
        let (project, _owner) = fresh();
        let err = project
            .handle(&ProjectCommand::AcceptQuote(AcceptQuote {
                caller: Caller::landowner(UserId::new()),
                quote_id: QuoteId::new(),
                professional_id: UserId::new(),
                professional_role: RoleKind::Forester,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(_)));
    }

    #[test]
    fn second_acceptance_is_rejected() {
        let (mut project, owner) = fresh();
        accept(&mut project, owner, UserId::new(), RoleKind::Forester);

        let err = project
            .handle(&ProjectCommand::AcceptQuote(AcceptQuote {
                caller: Caller::landowner(owner),
                quote_id: QuoteId::new(),
                professional_id: UserId::new(),
                professional_role: RoleKind::TimberBuyer,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::FailedPrecondition(msg) if msg.contains("already has an assigned") => {}
            other => panic!("expected FailedPrecondition, got {other:?}"),
        }
    }

    #[test]
    fn service_provider_quote_cannot_be_accepted() {
        let (project, owner) = fresh();
        let err = project
            .handle(&ProjectCommand::AcceptQuote(AcceptQuote {
                caller: Caller::landowner(owner),
                quote_id: QuoteId::new(),
                professional_id: UserId::new(),
                professional_role: RoleKind::ServiceProvider,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::FailedPrecondition(_)));
    }

    #[test]
    fn submit_forces_entire_tract_acreage() {
        let (project, _, _) = in_pending_approval();
        assert_eq!(project.status(), ProjectStatus::PendingApproval);

        let stored = project.cruise_data().unwrap();
        assert_eq!(stored.inventory.stands()[0].net_acres, 40.0);
        let summary = stored.summary(Some(40.0));
        assert!((summary.stands[0].tons_per_acre - 5.0).abs() < 1e-9);
        assert!((summary.categories.pine_sawtimber - 200.0).abs() < 1e-9);
    }

    #[test]
    fn only_assigned_forester_may_submit() {
        let (mut project, owner) = fresh();
        accept(&mut project, owner, UserId::new(), RoleKind::Forester);

        let err = submit(&mut project, UserId::new()).unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(_)));
        assert_eq!(project.status(), ProjectStatus::CruiseInProgress);
    }

    #[test]
    fn retract_keeps_cruise_data() {
        let (mut project, _, forester) = in_pending_approval();
        let before = project.cruise_data().cloned();

        run(
            &mut project,
            ProjectCommand::RetractCruise(RetractCruise {
                caller: Caller::new(forester, RoleKind::Forester),
                occurred_at: test_time(),
            }),
        )
        .unwrap();

        assert_eq!(project.status(), ProjectStatus::CruiseInProgress);
        assert_eq!(project.cruise_data().cloned(), before);
        assert_eq!(project.forester_id(), Some(forester));

        // Resubmission is allowed after retraction.
        submit(&mut project, forester).unwrap();
        assert_eq!(project.status(), ProjectStatus::PendingApproval);
    }

    #[test]
    fn owner_cannot_retract() {
        let (project, owner, _) = in_pending_approval();
        let err = project
            .handle(&ProjectCommand::RetractCruise(RetractCruise {
                caller: Caller::landowner(owner),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(_)));
    }

    #[test]
    fn decline_returns_to_inquiry_and_clears_assignment() {
        let (mut project, _, forester) = in_pending_approval();

        run(
            &mut project,
            ProjectCommand::DeclineEngagement(DeclineEngagement {
                caller: Caller::new(forester, RoleKind::Forester),
                occurred_at: test_time(),
            }),
        )
        .unwrap();

        assert_eq!(project.status(), ProjectStatus::Inquiry);
        assert_eq!(project.forester_id(), None);
        assert_eq!(project.quote_accepted_at(), None);
        assert_eq!(project.accepted_quote_id(), None);
        assert!(!project.is_assigned());
    }

    #[test]
    fn approve_completes_and_post_opens_bids() {
        let (mut approved, owner, _) = in_pending_approval();
        run(
            &mut approved,
            ProjectCommand::ApproveCruise(ApproveCruise {
                caller: Caller::landowner(owner),
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(approved.status(), ProjectStatus::Completed);

        let (mut posted, owner, _) = in_pending_approval();
        let sale_id = SaleId::new();
        run(
            &mut posted,
            ProjectCommand::PostToMarketplace(PostToMarketplace {
                caller: Caller::landowner(owner),
                sale_id,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(posted.status(), ProjectStatus::OpenForBids);
        assert_eq!(posted.sale_id(), Some(sale_id));
    }

    #[test]
    fn forester_cannot_approve_own_cruise() {
        let (project, _, forester) = in_pending_approval();
        let err = project
            .handle(&ProjectCommand::ApproveCruise(ApproveCruise {
                caller: Caller::new(forester, RoleKind::Forester),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(_)));
    }

    #[test]
    fn harvest_completion_is_owner_only() {
        let (mut project, owner) = fresh();
        let buyer = UserId::new();
        accept(&mut project, owner, buyer, RoleKind::TimberBuyer);

        let err = project
            .handle(&ProjectCommand::CompleteHarvest(CompleteHarvest {
                caller: Caller::new(buyer, RoleKind::TimberBuyer),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(_)));

        run(
            &mut project,
            ProjectCommand::CompleteHarvest(CompleteHarvest {
                caller: Caller::landowner(owner),
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(project.status(), ProjectStatus::Completed);
    }

    #[test]
    fn wrong_state_is_failed_precondition() {
        let (mut project, owner) = fresh();
        let forester = UserId::new();
        accept(&mut project, owner, forester, RoleKind::Forester);

        let err = project
            .handle(&ProjectCommand::RetractCruise(RetractCruise {
                caller: Caller::new(forester, RoleKind::Forester),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::FailedPrecondition(_)));
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let (project, owner) = fresh();
        let snapshot = project.clone();
        let _ = project.handle(&ProjectCommand::AcceptQuote(AcceptQuote {
            caller: Caller::landowner(owner),
            quote_id: QuoteId::new(),
            professional_id: UserId::new(),
            professional_role: RoleKind::Forester,
            occurred_at: test_time(),
        }));
        assert_eq!(project, snapshot);
    }

    #[test]
    fn document_shape_uses_exclusive_assignment_fields() {
        let (mut project, owner) = fresh();
        let supplier = UserId::new();
        accept(&mut project, owner, supplier, RoleKind::LoggingContractor);

        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["status"], "harvest_in_progress");
        assert_eq!(json["supplierId"], serde_json::json!(supplier.to_string()));
        assert!(json.get("foresterId").is_none());

        let back: Project = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back.supplier_id(), Some(supplier));

        let mut both = json;
        both["foresterId"] = serde_json::json!(UserId::new().to_string());
        assert!(serde_json::from_value::<Project>(both).is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone, Copy)]
        enum Actor {
            Owner,
            Professional,
            Stranger,
        }

        fn actor() -> impl Strategy<Value = Actor> {
            prop_oneof![Just(Actor::Owner), Just(Actor::Professional), Just(Actor::Stranger)]
        }

        fn role() -> impl Strategy<Value = RoleKind> {
            prop_oneof![
                Just(RoleKind::Forester),
                Just(RoleKind::TimberBuyer),
                Just(RoleKind::LoggingContractor),
                Just(RoleKind::ServiceProvider),
            ]
        }

        fn build(step: u8, caller: Caller, professional: UserId, role: RoleKind) -> ProjectCommand {
            let occurred_at = test_time();
            match step % 7 {
                0 => ProjectCommand::AcceptQuote(AcceptQuote {
                    caller,
                    quote_id: QuoteId::new(),
                    professional_id: professional,
                    professional_role: role,
                    occurred_at,
                }),
                1 => ProjectCommand::SubmitCruise(SubmitCruise {
                    caller,
                    cruise_data: cruise(),
                    rate_sets: None,
                    property_acreage: Some(40.0),
                    occurred_at,
                }),
                2 => ProjectCommand::RetractCruise(RetractCruise { caller, occurred_at }),
                3 => ProjectCommand::ApproveCruise(ApproveCruise { caller, occurred_at }),
                4 => ProjectCommand::PostToMarketplace(PostToMarketplace {
                    caller,
                    sale_id: SaleId::new(),
                    occurred_at,
                }),
                5 => ProjectCommand::DeclineEngagement(DeclineEngagement { caller, occurred_at }),
                _ => ProjectCommand::CompleteHarvest(CompleteHarvest { caller, occurred_at }),
            }
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: whatever commands succeed, status and assignment stay consistent.
            #[test]
            fn status_matches_assignment(
                role in role(),
                steps in prop::collection::vec((0u8..7, actor()), 0..24)
            ) {
                let (mut project, owner) = fresh();
                let professional = UserId::new();
                let stranger = UserId::new();

                for (step, who) in steps {
                    let caller = match who {
                        Actor::Owner => Caller::landowner(owner),
                        Actor::Professional => Caller::new(professional, role),
                        Actor::Stranger => Caller::new(stranger, RoleKind::Forester),
                    };
                    let _ = run(&mut project, build(step, caller, professional, role));

                    match project.status() {
                        ProjectStatus::Inquiry => {
                            prop_assert!(!project.is_assigned());
                            prop_assert!(project.quote_accepted_at().is_none());
                        }
                        ProjectStatus::CruiseInProgress
                        | ProjectStatus::PendingApproval
                        | ProjectStatus::OpenForBids => {
                            prop_assert_eq!(project.forester_id(), Some(professional));
                        }
                        ProjectStatus::HarvestInProgress => {
                            prop_assert_eq!(project.supplier_id(), Some(professional));
                        }
                        ProjectStatus::Completed => prop_assert!(project.is_assigned()),
                    }
                    prop_assert!(!project.can_view(stranger));
                }
            }
        }
    }
}
