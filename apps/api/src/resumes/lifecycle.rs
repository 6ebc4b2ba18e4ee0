//! Resume processing lifecycle: PENDING → PROCESSING → {COMPLETED, FAILED}.
//!
//! Transitions are plain status writes. Nothing is locked or compared, so two
//! concurrent runs on one resume both enter PROCESSING and the last write wins.

use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use crate::models::analysis::AnalysisResult;
use crate::models::resume::ResumeStatus;
use crate::resumes::store::{ResumeStore, StoreError};

#[derive(Clone)]
pub struct ResumeLifecycle {
    store: Arc<dyn ResumeStore>,
}

impl ResumeLifecycle {
    pub fn new(store: Arc<dyn ResumeStore>) -> Self {
        Self { store }
    }

    /// Enters PROCESSING from any prior state, re-submissions included.
    pub async fn begin_processing(&self, resume_id: Uuid) -> Result<(), StoreError> {
        self.store
            .update_resume_status(resume_id, ResumeStatus::Processing)
            .await?;
        info!("Resume {resume_id} is processing");
        Ok(())
    }

    /// Appends `result` to the resume's history and marks it COMPLETED.
    /// Returns the id of the stored analysis.
    pub async fn complete(
        &self,
        resume_id: Uuid,
        result: &AnalysisResult,
    ) -> Result<Uuid, StoreError> {
        let analysis_id = self.store.create_analysis(resume_id, result).await?;
        self.store
            .update_resume_status(resume_id, ResumeStatus::Completed)
            .await?;
        info!(
            "Resume {resume_id} completed with analysis {analysis_id} (provider: {})",
            result.metadata.provider
        );
        Ok(analysis_id)
    }

    /// Best-effort FAILED write. A failure here is logged and swallowed so the
    /// caller still reports the original error.
    pub async fn fail(&self, resume_id: Uuid) {
        match self
            .store
            .update_resume_status(resume_id, ResumeStatus::Failed)
            .await
        {
            Ok(()) => info!("Updated resume status to FAILED for {resume_id}"),
            Err(e) => error!("Error updating resume {resume_id} status to FAILED: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::heuristic::heuristic_analysis;
    use crate::testing::InMemoryResumeStore;

    #[tokio::test]
    async fn test_happy_path_transitions() {
        let store = Arc::new(InMemoryResumeStore::new());
        let resume = store.seed_resume("cv.pdf", "application/pdf");
        let lifecycle = ResumeLifecycle::new(store.clone());

        lifecycle.begin_processing(resume.id).await.unwrap();
        assert_eq!(store.status_of(resume.id), Some(ResumeStatus::Processing));

        let id = lifecycle.complete(resume.id, &heuristic_analysis("")).await.unwrap();
        assert_eq!(store.status_of(resume.id), Some(ResumeStatus::Completed));
        assert_eq!(store.analyses_for(resume.id).len(), 1);
        assert_eq!(store.analyses_for(resume.id)[0].id, id);
    }

    #[tokio::test]
    async fn test_resubmission_appends_history() {
        let store = Arc::new(InMemoryResumeStore::new());
        let resume = store.seed_resume("cv.pdf", "application/pdf");
        let lifecycle = ResumeLifecycle::new(store.clone());

        lifecycle.begin_processing(resume.id).await.unwrap();
        lifecycle.fail(resume.id).await;
        assert_eq!(store.status_of(resume.id), Some(ResumeStatus::Failed));

        for _ in 0..2 {
            lifecycle.begin_processing(resume.id).await.unwrap();
            lifecycle.complete(resume.id, &heuristic_analysis("")).await.unwrap();
        }
        assert_eq!(store.analyses_for(resume.id).len(), 2);
        assert_eq!(
            store.status_history(resume.id),
            vec![
                ResumeStatus::Processing,
                ResumeStatus::Failed,
                ResumeStatus::Processing,
                ResumeStatus::Completed,
                ResumeStatus::Processing,
                ResumeStatus::Completed,
            ]
        );
    }

    #[tokio::test]
    async fn test_complete_surfaces_persistence_failure() {
        let store = Arc::new(InMemoryResumeStore::new().failing_analysis_writes());
        let resume = store.seed_resume("cv.pdf", "application/pdf");
        let lifecycle = ResumeLifecycle::new(store.clone());

        assert!(lifecycle.complete(resume.id, &heuristic_analysis("")).await.is_err());
        assert!(store.analyses_for(resume.id).is_empty());
    }

    #[tokio::test]
    async fn test_fail_swallows_store_errors() {
        let store = Arc::new(InMemoryResumeStore::new());
        let lifecycle = ResumeLifecycle::new(store);
        // Unknown resume: the store errors, fail() must not panic or propagate.
        lifecycle.fail(Uuid::new_v4()).await;
    }
}
