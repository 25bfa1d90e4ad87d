use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use timberline_core::{DomainError, DomainResult, Entity, ProjectId, PropertyId, SaleId, UserId};
use timberline_projects::{Project, Property};
use timberline_reports::CruiseReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Open,
}

/// Headline volumes shown on a public sale listing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleSummary {
    pub sawtimber_tons: f64,
    pub sawtimber_mbf: f64,
    pub pulpwood_tons: f64,
    pub total_tons: f64,
    pub tons_per_acre: f64,
}

impl From<&CruiseReport> for SaleSummary {
    fn from(report: &CruiseReport) -> Self {
        Self {
            sawtimber_tons: report.sawtimber.total_tons,
            sawtimber_mbf: report.sawtimber.total_mbf.unwrap_or(0.0),
            pulpwood_tons: report.pulpwood.total_tons,
            total_tons: report.grand_total.tons,
            tons_per_acre: report.grand_total.tons_per_acre,
        }
    }
}

/// Public listing created when a landowner posts a cruised project for bids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: SaleId,
    pub project_id: ProjectId,
    pub property_id: PropertyId,
    pub owner_id: UserId,
    pub sale_name: String,
    pub county: String,
    pub state: String,
    pub acreage: f64,
    pub bid_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_deadline: Option<String>,
    pub summary: SaleSummary,
    pub status: SaleStatus,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Derive the listing from a project's stored cruise data.
    pub fn from_project(
        id: SaleId,
        project: &Project,
        property: &Property,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let cruise = project
            .cruise_data()
            .ok_or_else(|| DomainError::precondition("cannot post a sale without cruise data"))?;
        let details = &cruise.details;
        let report = cruise.report(Some(property.acreage));

        // Listing falls back to property fields when the cruise left them blank.
        let county = if details.county.trim().is_empty() {
            property.county.clone().unwrap_or_default()
        } else {
            details.county.clone()
        };
        let state = if details.state.trim().is_empty() {
            property.state.clone().unwrap_or_default()
        } else {
            details.state.clone()
        };

        Ok(Self {
            id,
            project_id: project.project_id(),
            property_id: project.property_id(),
            owner_id: project.owner_id(),
            sale_name: details.sale_name.clone(),
            county,
            state,
            acreage: details.acreage.unwrap_or(property.acreage),
            bid_method: details.bid_method.clone(),
            bid_deadline: details.bid_deadline.clone(),
            summary: SaleSummary::from(&report),
            status: SaleStatus::Open,
            created_at: now,
        })
    }
}

impl Entity for Sale {
    type Id = SaleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timberline_auth::{Caller, RoleKind};
    use timberline_core::{Aggregate, QuoteId};
    use timberline_inventory::{DbhRow, Inventory, Product};
    use timberline_projects::{AcceptQuote, CruiseData, ProjectCommand, SaleDetails, SubmitCruise};

    fn submitted(property: &Property) -> Project {
        let owner = Caller::landowner(property.owner_id);
        let forester = Caller::new(UserId::new(), RoleKind::Forester);
        let mut project = Project::new(ProjectId::new(), owner.user_id, property.id, "Sale", Utc::now());

        let commands = [
            ProjectCommand::AcceptQuote(AcceptQuote {
                caller: owner,
                quote_id: QuoteId::new(),
                professional_id: forester.user_id,
                professional_role: RoleKind::Forester,
                occurred_at: Utc::now(),
            }),
            ProjectCommand::SubmitCruise(SubmitCruise {
                caller: forester,
                cruise_data: CruiseData {
                    details: SaleDetails {
                        sale_name: "Creek Bottom".to_string(),
                        bid_method: "sealed".to_string(),
                        ..SaleDetails::default()
                    },
                    inventory: Inventory::entire_tract(
                        0.0,
                        vec![
                            Product::new("Pine Sawtimber").with_row(DbhRow::tons("16", 80, 160.0)),
                            Product::new("Pine Pulpwood").with_row(DbhRow::tons("8", 400, 40.0)),
                        ],
                    ),
                    annotations: None,
                },
                rate_sets: None,
                property_acreage: Some(property.acreage),
                occurred_at: Utc::now(),
            }),
        ];
        for cmd in commands {
            for event in project.handle(&cmd).unwrap() {
                project.apply(&event);
            }
        }
        project
    }

    #[test]
    fn listing_carries_report_totals() {
        let mut property = Property::new(PropertyId::new(), UserId::new(), "Home", 40.0, Utc::now());
        property.county = Some("Tift".to_string());
        property.state = Some("GA".to_string());
        let project = submitted(&property);

        let sale = Sale::from_project(SaleId::new(), &project, &property, Utc::now()).unwrap();
        assert_eq!(sale.sale_name, "Creek Bottom");
        assert_eq!(sale.county, "Tift");
        assert_eq!(sale.state, "GA");
        assert_eq!(sale.acreage, 40.0);
        assert!((sale.summary.sawtimber_tons - 160.0).abs() < 1e-9);
        assert!((sale.summary.sawtimber_mbf - 20.0).abs() < 1e-9);
        assert!((sale.summary.pulpwood_tons - 40.0).abs() < 1e-9);
        assert!((sale.summary.total_tons - 200.0).abs() < 1e-9);
        assert!((sale.summary.tons_per_acre - 5.0).abs() < 1e-9);
        assert_eq!(sale.status, SaleStatus::Open);
    }

    #[test]
    fn listing_requires_cruise_data() {
        let property = Property::new(PropertyId::new(), UserId::new(), "Home", 40.0, Utc::now());
        let project = Project::new(ProjectId::new(), property.owner_id, property.id, "Empty", Utc::now());
        let err = Sale::from_project(SaleId::new(), &project, &property, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::FailedPrecondition(_)));
    }
}
