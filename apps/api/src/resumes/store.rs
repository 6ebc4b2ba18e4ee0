//! Persistence of resumes and their analysis history.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::analysis::AnalysisResult;
use crate::models::resume::{AnalysisRow, NewResume, ResumeRow, ResumeStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to serialize analysis: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("resume {0} does not exist")]
    MissingResume(Uuid),
}

/// The relational store behind the engine. Analyses are append-only.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn create_resume(&self, resume: &NewResume) -> Result<ResumeRow, StoreError>;

    /// Returns the resume only if it belongs to `user_id`.
    async fn find_resume(&self, resume_id: Uuid, user_id: Uuid)
        -> Result<Option<ResumeRow>, StoreError>;

    /// All resumes of a user, newest first.
    async fn list_resumes(&self, user_id: Uuid) -> Result<Vec<ResumeRow>, StoreError>;

    async fn update_resume_status(
        &self,
        resume_id: Uuid,
        status: ResumeStatus,
    ) -> Result<(), StoreError>;

    /// Appends an analysis and returns its id.
    async fn create_analysis(
        &self,
        resume_id: Uuid,
        result: &AnalysisResult,
    ) -> Result<Uuid, StoreError>;

    /// Analysis history of one resume, newest first.
    async fn list_analyses(&self, resume_id: Uuid) -> Result<Vec<AnalysisRow>, StoreError>;

    /// The most recent analysis of each of the user's resumes.
    async fn latest_analyses(&self, user_id: Uuid) -> Result<Vec<AnalysisRow>, StoreError>;
}

pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn create_resume(&self, resume: &NewResume) -> Result<ResumeRow, StoreError> {
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes (id, user_id, file_name, file_key, file_size, file_type, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(resume.user_id)
        .bind(&resume.file_name)
        .bind(&resume.file_key)
        .bind(resume.file_size)
        .bind(&resume.file_type)
        .bind(ResumeStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await?;

        info!("Created resume {} for user {}", row.id, row.user_id);
        Ok(row)
    }

    async fn find_resume(
        &self,
        resume_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ResumeRow>, StoreError> {
        Ok(sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resumes WHERE id = $1 AND user_id = $2",
        )
        .bind(resume_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_resumes(&self, user_id: Uuid) -> Result<Vec<ResumeRow>, StoreError> {
        Ok(sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resumes WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_resume_status(
        &self,
        resume_id: Uuid,
        status: ResumeStatus,
    ) -> Result<(), StoreError> {
        let updated = sqlx::query("UPDATE resumes SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(resume_id)
            .execute(&self.pool)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::MissingResume(resume_id));
        }
        Ok(())
    }

    async fn create_analysis(
        &self,
        resume_id: Uuid,
        result: &AnalysisResult,
    ) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let payload = serde_json::to_value(result)?;

        sqlx::query("INSERT INTO analyses (id, resume_id, result, score) VALUES ($1, $2, $3, $4)")
            .bind(id)
            .bind(resume_id)
            .bind(&payload)
            .bind(result.resume_score as i32)
            .execute(&self.pool)
            .await?;

        Ok(id)
    }

    async fn list_analyses(&self, resume_id: Uuid) -> Result<Vec<AnalysisRow>, StoreError> {
        Ok(sqlx::query_as::<_, AnalysisRow>(
            "SELECT * FROM analyses WHERE resume_id = $1 ORDER BY created_at DESC",
        )
        .bind(resume_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn latest_analyses(&self, user_id: Uuid) -> Result<Vec<AnalysisRow>, StoreError> {
        Ok(sqlx::query_as::<_, AnalysisRow>(
            r#"
            SELECT DISTINCT ON (a.resume_id) a.*
            FROM analyses a
            JOIN resumes r ON r.id = a.resume_id
            WHERE r.user_id = $1
            ORDER BY a.resume_id, a.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
