use std::sync::Arc;

use crate::extraction::storage::ObjectStorage;
use crate::orchestrator::AnalysisOrchestrator;
use crate::resumes::store::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ResumeStore>,
    pub storage: Arc<dyn ObjectStorage>,
    pub orchestrator: Arc<AnalysisOrchestrator>,
}
