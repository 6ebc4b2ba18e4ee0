//! Analysis orchestrator: the end-to-end "analyze one resume" operation.
//!
//! Flow: begin_processing → extract text → provider cascade → persist →
//!       COMPLETED. Extraction or persistence failures roll the resume back to
//!       FAILED (best effort) and surface a classified error.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::analysis::cascade::ProviderCascade;
use crate::extraction::storage::ObjectStorage;
use crate::extraction::{ExtractionError, TextExtractor};
use crate::models::analysis::AnalysisResult;
use crate::providers::Provider;
use crate::resumes::lifecycle::ResumeLifecycle;
use crate::resumes::store::{ResumeStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestrationError {
    #[error("Missing required fields: {0}")]
    MissingInput(String),

    #[error("Resume not found or access denied")]
    NotFoundOrDenied,

    #[error("File storage service error: {0}")]
    StorageUnavailable(String),

    #[error("File is {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("The document contains no extractable text")]
    EmptyDocument,

    #[error("{0}")]
    Unknown(String),
}

impl From<ExtractionError> for OrchestrationError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::StorageUnavailable(e) => {
                OrchestrationError::StorageUnavailable(e.to_string())
            }
            ExtractionError::TooLarge { size, limit } => {
                OrchestrationError::TooLarge { size, limit }
            }
            ExtractionError::UnsupportedType(t) => OrchestrationError::UnsupportedType(t),
            ExtractionError::EmptyDocument => OrchestrationError::EmptyDocument,
            ExtractionError::Unknown(m) => OrchestrationError::Unknown(m),
        }
    }
}

impl From<StoreError> for OrchestrationError {
    fn from(err: StoreError) -> Self {
        OrchestrationError::Unknown(err.to_string())
    }
}

/// Composes extraction, the provider cascade and the lifecycle. All
/// collaborators are injected; the orchestrator holds no mutable state.
#[derive(Clone)]
pub struct AnalysisOrchestrator {
    extractor: TextExtractor,
    cascade: ProviderCascade,
    lifecycle: ResumeLifecycle,
}

impl AnalysisOrchestrator {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        providers: Vec<Arc<dyn Provider>>,
        store: Arc<dyn ResumeStore>,
    ) -> Self {
        Self {
            extractor: TextExtractor::new(storage),
            cascade: ProviderCascade::new(providers),
            lifecycle: ResumeLifecycle::new(store),
        }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.cascade.provider_names()
    }

    /// Analyzes the file behind `file_key` for `resume_id` and stores the result.
    ///
    /// The returned result carries the id of the stored analysis.
    pub async fn run(
        &self,
        resume_id: Uuid,
        file_key: &str,
        declared_mime: Option<&str>,
    ) -> Result<AnalysisResult, OrchestrationError> {
        if file_key.trim().is_empty() {
            return Err(OrchestrationError::MissingInput("fileKey".to_string()));
        }

        // Step 1: PROCESSING
        self.lifecycle.begin_processing(resume_id).await?;

        // Step 2: Extract text
        let text = match self.extractor.extract(file_key, declared_mime).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Text extraction failed for resume {resume_id}: {e}");
                self.lifecycle.fail(resume_id).await;
                return Err(e.into());
            }
        };

        // Step 3: Analyze (never fails)
        let mut result = self.cascade.analyze(&text).await;

        // Step 4: Persist + COMPLETED
        match self.lifecycle.complete(resume_id, &result).await {
            Ok(analysis_id) => {
                result.id = Some(analysis_id);
                info!(
                    "Resume {resume_id} analyzed: score {} via {}",
                    result.resume_score, result.metadata.provider
                );
                Ok(result)
            }
            Err(e) => {
                error!("Failed to persist analysis for resume {resume_id}: {e}");
                self.lifecycle.fail(resume_id).await;
                Err(e.into())
            }
        }
    }
}
