//! Typed reads over the document store.
//!
//! Nothing here caches: every call reads the store, so callers always see
//! committed state. Loads that feed an atomic batch also return the version
//! the value was read at.

use serde::de::DeserializeOwned;

use timberline_auth::UserProfile;
use timberline_core::{InquiryId, ProjectId, PropertyId, QuoteId, SaleId, UserId};
use timberline_events::ActivityRecord;
use timberline_marketplace::{Inquiry, Quote, Sale};
use timberline_projects::{Project, Property};

use crate::document_store::{DocumentStore, Filter, collections};
use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone)]
pub struct Repository<S> {
    store: S,
}

impl<S: DocumentStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn find<T: DeserializeOwned>(&self, collection: &str, id: &str) -> ServiceResult<Option<(T, u64)>> {
        match self.store.get(collection, id)? {
            Some(doc) => Ok(Some((serde_json::from_value(doc.data)?, doc.version))),
            None => Ok(None),
        }
    }

    fn load<T: DeserializeOwned>(&self, collection: &str, id: &str, what: &str) -> ServiceResult<(T, u64)> {
        self.find(collection, id)?
            .ok_or_else(|| ServiceError::not_found(format!("{what} {id} not found")))
    }

    fn list<T: DeserializeOwned>(&self, collection: &str, filters: &[Filter]) -> ServiceResult<Vec<(T, u64)>> {
        self.store
            .query(collection, filters)?
            .into_iter()
            .map(|doc| Ok((serde_json::from_value(doc.data)?, doc.version)))
            .collect()
    }

    /// Project with its stored version attached.
    pub fn load_project(&self, id: ProjectId) -> ServiceResult<Project> {
        let (project, version): (Project, u64) = self.load(collections::PROJECTS, &id.key(), "project")?;
        Ok(project.with_version(version))
    }

    pub fn find_project(&self, id: ProjectId) -> ServiceResult<Option<Project>> {
        Ok(self
            .find::<Project>(collections::PROJECTS, &id.key())?
            .map(|(project, version)| project.with_version(version)))
    }

    pub fn load_property(&self, id: PropertyId) -> ServiceResult<(Property, u64)> {
        self.load(collections::PROPERTIES, &id.key(), "property")
    }

    pub fn load_quote(&self, id: QuoteId) -> ServiceResult<Quote> {
        Ok(self.load(collections::QUOTES, &id.key(), "quote")?.0)
    }

    pub fn load_inquiry(&self, id: InquiryId) -> ServiceResult<(Inquiry, u64)> {
        self.load(collections::INQUIRIES, &id.key(), "inquiry")
    }

    pub fn load_user(&self, id: UserId) -> ServiceResult<UserProfile> {
        Ok(self.load(collections::USERS, &id.key(), "user")?.0)
    }

    pub fn find_user(&self, id: UserId) -> ServiceResult<Option<(UserProfile, u64)>> {
        self.find(collections::USERS, &id.key())
    }

    pub fn load_sale(&self, id: SaleId) -> ServiceResult<Sale> {
        Ok(self.load(collections::SALES, &id.key(), "sale")?.0)
    }

    pub fn inquiries_for_project(&self, project_id: ProjectId) -> ServiceResult<Vec<(Inquiry, u64)>> {
        self.list(
            collections::INQUIRIES,
            &[Filter::eq("projectId", project_id.key())],
        )
    }

    /// Feed entries for a project, oldest first.
    pub fn activity_for_project(&self, project_id: ProjectId) -> ServiceResult<Vec<ActivityRecord>> {
        let mut records: Vec<ActivityRecord> = self
            .list(collections::ACTIVITY, &[Filter::eq("projectId", project_id.key())])?
            .into_iter()
            .map(|(record, _)| record)
            .collect();
        records.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }
}
