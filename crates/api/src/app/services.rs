use std::sync::Arc;

use timberline_infra::{
    AcceptanceProtocol, AppConfig, InMemoryDocumentStore, InquiryWorkflow, Onboarding, ProjectQueries,
    ProjectWorkflow,
};

pub type Store = Arc<InMemoryDocumentStore>;

/// Application services shared by every handler.
pub struct AppServices {
    pub onboarding: Onboarding<Store>,
    pub inquiries: InquiryWorkflow<Store>,
    pub acceptance: AcceptanceProtocol<Store>,
    pub workflow: ProjectWorkflow<Store>,
    pub queries: ProjectQueries<Store>,
}

impl AppServices {
    pub fn new(store: Store, config: &AppConfig) -> Self {
        let retries = config.accept_retries;
        Self {
            onboarding: Onboarding::new(store.clone()),
            inquiries: InquiryWorkflow::new(store.clone(), retries),
            acceptance: AcceptanceProtocol::new(store.clone(), retries),
            workflow: ProjectWorkflow::new(store.clone(), retries),
            queries: ProjectQueries::new(store),
        }
    }
}
