use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    assessment::SessionRegistry,
    config::Config,
    store::{AssessmentStore, AttemptStore, CourseStore, ProgressStore, SiteStore},
};

#[derive(Clone)]
pub struct AppState {
    pub assessments: Arc<dyn AssessmentStore>,
    pub attempts: Arc<dyn AttemptStore>,
    pub courses: Arc<dyn CourseStore>,
    pub progress: Arc<dyn ProgressStore>,
    pub site: Arc<dyn SiteStore>,
    pub sessions: Arc<SessionRegistry>,
    pub config: Config,
}

impl AppState {
    /// Wires every store trait to the same backend.
    pub fn new<S>(store: Arc<S>, config: Config) -> Self
    where
        S: AssessmentStore + AttemptStore + CourseStore + ProgressStore + SiteStore + 'static,
    {
        Self {
            assessments: store.clone(),
            attempts: store.clone(),
            courses: store.clone(),
            progress: store.clone(),
            site: store,
            sessions: Arc::new(SessionRegistry::new()),
            config,
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
