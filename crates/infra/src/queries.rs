//! Read side: project documents and the figures recomputed from them.

use timberline_auth::Caller;
use timberline_core::ProjectId;
use timberline_events::ActivityRecord;
use timberline_inventory::InventorySummary;
use timberline_projects::Project;
use timberline_reports::CruiseReport;

use crate::document_store::DocumentStore;
use crate::error::{ServiceError, ServiceResult};
use crate::repository::Repository;

#[derive(Debug, Clone)]
pub struct ProjectQueries<S> {
    repo: Repository<S>,
}

impl<S: DocumentStore> ProjectQueries<S> {
    pub fn new(store: S) -> Self {
        Self {
            repo: Repository::new(store),
        }
    }

    /// Load a project the caller may see.
    ///
    /// Involved users can always read it; a professional holding an inquiry
    /// for it can read it while deciding whether to quote.
    pub fn get_project(&self, caller: &Caller, project_id: ProjectId) -> ServiceResult<Project> {
        let project = self.repo.load_project(project_id)?;
        if project.can_view(caller.user_id) {
            return Ok(project);
        }

        let invited = self
            .repo
            .inquiries_for_project(project_id)?
            .iter()
            .any(|(i, _)| i.to_user_id == caller.user_id);
        if invited {
            Ok(project)
        } else {
            Err(ServiceError::permission_denied("caller is not involved in this project"))
        }
    }

    fn acreage_of(&self, project: &Project) -> ServiceResult<f64> {
        Ok(self.repo.load_property(project.property_id())?.0.acreage)
    }

    /// Aggregated inventory of the stored cruise; empty when nothing was submitted.
    pub fn inventory(&self, caller: &Caller, project_id: ProjectId) -> ServiceResult<InventorySummary> {
        let project = self.get_project(caller, project_id)?;
        let acreage = self.acreage_of(&project)?;
        Ok(match project.cruise_data() {
            Some(cruise) => cruise.summary(Some(acreage)),
            None => timberline_inventory::aggregate(&[], Some(acreage)),
        })
    }

    pub fn report(&self, caller: &Caller, project_id: ProjectId) -> ServiceResult<CruiseReport> {
        let project = self.get_project(caller, project_id)?;
        let acreage = self.acreage_of(&project)?;
        Ok(match project.cruise_data() {
            Some(cruise) => cruise.report(Some(acreage)),
            None => timberline_reports::summarize(&[], Some(acreage)),
        })
    }

    pub fn activity(&self, caller: &Caller, project_id: ProjectId) -> ServiceResult<Vec<ActivityRecord>> {
        self.get_project(caller, project_id)?;
        self.repo.activity_for_project(project_id)
    }
}
