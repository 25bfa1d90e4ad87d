//! Creating the documents the marketplace flows start from.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use timberline_auth::{Caller, Role, RoleKind, UserProfile, ensure_owner};
use timberline_core::{ExpectedVersion, ProjectId, PropertyId};
use timberline_projects::{Project, Property};

use crate::document_store::{AtomicBatch, DocumentStore, collections};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::Repository;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    pub name: String,
    pub acreage: f64,
    #[serde(default)]
    pub boundary: Option<serde_json::Value>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Onboarding<S> {
    repo: Repository<S>,
}

impl<S: DocumentStore> Onboarding<S> {
    pub fn new(store: S) -> Self {
        Self {
            repo: Repository::new(store),
        }
    }

    /// Create or replace the caller's own profile.
    pub fn register_profile(
        &self,
        caller: &Caller,
        display_name: &str,
        email: Option<String>,
        role: Role,
    ) -> ServiceResult<UserProfile> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(ServiceError::invalid_argument("displayName is required"));
        }
        if role.kind() != caller.role {
            return Err(ServiceError::permission_denied(format!(
                "profile role '{}' does not match the authenticated role '{}'",
                role.kind(),
                caller.role
            )));
        }

        let profile = UserProfile {
            id: caller.user_id,
            display_name: display_name.to_string(),
            email: email.filter(|e| !e.trim().is_empty()),
            role,
        };
        let version = self.repo.find_user(caller.user_id)?.map(|(_, v)| v).unwrap_or(0);
        let batch = AtomicBatch::new()
            .require(collections::USERS, caller.user_id, ExpectedVersion::exact(version))
            .set(collections::USERS, caller.user_id, &profile)?;
        self.repo.store().run_atomic_batch(batch)?;

        tracing::info!(user_id = %caller.user_id, role = %caller.role, "profile registered");
        Ok(profile)
    }

    pub fn create_property(
        &self,
        caller: &Caller,
        input: NewProperty,
        now: DateTime<Utc>,
    ) -> ServiceResult<Property> {
        if caller.role != RoleKind::Landowner {
            return Err(ServiceError::permission_denied("only landowners can register properties"));
        }
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ServiceError::invalid_argument("property name is required"));
        }
        if !input.acreage.is_finite() || input.acreage <= 0.0 {
            return Err(ServiceError::invalid_argument("acreage must be a positive number"));
        }

        let mut property = Property::new(PropertyId::new(), caller.user_id, name, input.acreage, now);
        property.boundary = input.boundary;
        property.county = input.county;
        property.state = input.state;
        property.description = input.description;

        let batch = AtomicBatch::new().create(collections::PROPERTIES, property.id, &property)?;
        self.repo.store().run_atomic_batch(batch)?;

        tracing::info!(property_id = %property.id, owner_id = %caller.user_id, acreage = property.acreage, "property created");
        Ok(property)
    }

    /// Open a project in `inquiry` for one of the caller's properties.
    pub fn create_project(
        &self,
        caller: &Caller,
        property_id: PropertyId,
        name: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<Project> {
        let (property, _) = self.repo.load_property(property_id)?;
        ensure_owner(caller, property.owner_id, "property")?;

        let name = match name.trim() {
            "" => property.name.as_str(),
            trimmed => trimmed,
        };
        let project = Project::new(ProjectId::new(), caller.user_id, property_id, name, now);

        let batch = AtomicBatch::new().create(collections::PROJECTS, project.project_id(), &project)?;
        self.repo.store().run_atomic_batch(batch)?;

        tracing::info!(project_id = %project.project_id(), property_id = %property_id, "project created");
        Ok(project.with_version(1))
    }
}
