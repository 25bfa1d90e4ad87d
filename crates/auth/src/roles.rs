use serde::{Deserialize, Serialize};

/// Marketplace role of a user, with role-specific profile fields.
///
/// Fields only exist on the variant they belong to, so a landowner can never
/// carry a mill name and every role branch is checked exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Role {
    Landowner,
    Forester {
        license_number: Option<String>,
    },
    TimberBuyer {
        mill_name: Option<String>,
    },
    LoggingContractor {
        crew_size: Option<u32>,
    },
    ServiceProvider {
        #[serde(default)]
        services: Vec<String>,
    },
}

impl Role {
    pub fn kind(&self) -> RoleKind {
        match self {
            Role::Landowner => RoleKind::Landowner,
            Role::Forester { .. } => RoleKind::Forester,
            Role::TimberBuyer { .. } => RoleKind::TimberBuyer,
            Role::LoggingContractor { .. } => RoleKind::LoggingContractor,
            Role::ServiceProvider { .. } => RoleKind::ServiceProvider,
        }
    }

    pub fn is_professional(&self) -> bool {
        self.kind().is_professional()
    }
}

/// Field-less role discriminant, as persisted on quotes (`professionalRole`) and tokens.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoleKind {
    Landowner,
    Forester,
    TimberBuyer,
    LoggingContractor,
    ServiceProvider,
}

impl RoleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleKind::Landowner => "landowner",
            RoleKind::Forester => "forester",
            RoleKind::TimberBuyer => "timber-buyer",
            RoleKind::LoggingContractor => "logging-contractor",
            RoleKind::ServiceProvider => "service-provider",
        }
    }

    pub fn is_professional(&self) -> bool {
        !matches!(self, RoleKind::Landowner)
    }

    /// The kind of project engagement an accepted quote from this role starts.
    ///
    /// `None` for roles that cannot be assigned to a project.
    pub fn engagement(&self) -> Option<Engagement> {
        match self {
            RoleKind::Forester => Some(Engagement::Cruise),
            RoleKind::TimberBuyer | RoleKind::LoggingContractor => Some(Engagement::Harvest),
            RoleKind::ServiceProvider | RoleKind::Landowner => None,
        }
    }
}

impl core::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Professional engagement started by quote acceptance.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engagement {
    /// Forester cruises the property (populates `foresterId`).
    Cruise,
    /// Buyer or logging contractor harvests (populates `supplierId`).
    Harvest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engagement_mapping_is_role_driven() {
        assert_eq!(RoleKind::Forester.engagement(), Some(Engagement::Cruise));
        assert_eq!(RoleKind::TimberBuyer.engagement(), Some(Engagement::Harvest));
        assert_eq!(RoleKind::LoggingContractor.engagement(), Some(Engagement::Harvest));
        assert_eq!(RoleKind::ServiceProvider.engagement(), None);
        assert_eq!(RoleKind::Landowner.engagement(), None);
    }

    #[test]
    fn role_wire_format_is_tagged() {
        let role = Role::TimberBuyer {
            mill_name: Some("Pine Ridge Mill".to_string()),
        };
        let json = serde_json::to_value(&role).unwrap();
        assert_eq!(json["kind"], "timber-buyer");
        assert_eq!(json["millName"], "Pine Ridge Mill");

        let back: Role = serde_json::from_value(serde_json::json!({ "kind": "service-provider" })).unwrap();
        assert_eq!(back, Role::ServiceProvider { services: vec![] });
        assert_eq!(back.kind(), RoleKind::ServiceProvider);
    }

    #[test]
    fn role_kind_serializes_kebab_case() {
        let json = serde_json::to_value(RoleKind::LoggingContractor).unwrap();
        assert_eq!(json, "logging-contractor");
        assert_eq!(RoleKind::LoggingContractor.to_string(), "logging-contractor");
    }
}
