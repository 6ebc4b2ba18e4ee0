//! In-memory fakes for the engine's collaborators, shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::io::{Cursor, Write};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;
use zip::write::FileOptions;
use zip::ZipWriter;

use crate::config::Config;
use crate::extraction::storage::{check_object_size, ObjectStorage, StorageError};
use crate::models::analysis::AnalysisResult;
use crate::models::resume::{AnalysisRow, NewResume, ResumeRow, ResumeStatus};
use crate::providers::{Provider, ProviderError};
use crate::resumes::store::{ResumeStore, StoreError};

const FILLER: &[&str] = &[
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "hotel", "india", "juliet", "kilo",
];

/// `n` words that trigger none of the heuristic scorer's patterns.
pub fn filler_words(n: usize) -> String {
    FILLER
        .iter()
        .cycle()
        .take(n)
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// A resume that satisfies every heuristic bonus.
pub fn strong_resume_text() -> String {
    format!(
        "Jane Doe\njane.doe@example.com | 555-123-4567\n\
         Skills: JavaScript, TypeScript, Python, React, Node.js, SQL, PostgreSQL, AWS, Docker, \
         Kubernetes, Git, Linux, Agile, leadership, mentoring, communication\n\
         Experience: Senior engineer leading data analysis and reporting work.\n\
         Education: BSc Computer Science, State University\n{}",
        filler_words(520)
    )
}

/// Minimal DOCX with one paragraph per entry.
pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| {
            format!(
                "<w:p><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"720\"/></w:tabs></w:pPr>\
                 <w:r><w:t xml:space=\"preserve\">{p}</w:t></w:r></w:p>"
            )
        })
        .collect();
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{body}</w:body></w:document>"
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", FileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/test".to_string(),
        s3_bucket: "resumes".to_string(),
        s3_endpoint: None,
        aws_region: "us-east-1".to_string(),
        aws_access_key_id: "test".to_string(),
        aws_secret_access_key: "test".to_string(),
        gemini_api_key: None,
        aimlapi_key: None,
        anthropic_api_key: None,
        port: 8080,
        rust_log: "info".to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Object storage
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryStorage {
    objects: HashMap<String, Result<Bytes, StorageError>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, key: &str, bytes: impl Into<Bytes>) -> Self {
        self.objects.insert(key.to_string(), Ok(bytes.into()));
        self
    }

    pub fn with_failure(mut self, key: &str, error: StorageError) -> Self {
        self.objects.insert(key.to_string(), Err(error));
        self
    }
}

#[async_trait]
impl ObjectStorage for InMemoryStorage {
    async fn get(&self, key: &str, max_bytes: usize) -> Result<Bytes, StorageError> {
        let bytes = self
            .objects
            .get(key)
            .cloned()
            .unwrap_or_else(|| Err(StorageError::NotFound(format!("NoSuchKey: {key}"))))?;
        check_object_size(Some(bytes.len() as i64), max_bytes)?;
        Ok(bytes)
    }

    async fn presign_upload(&self, key: &str, content_type: &str) -> Result<String, StorageError> {
        Ok(format!(
            "https://storage.test/resumes/{key}?content-type={content_type}&expires=3600"
        ))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Providers
// ────────────────────────────────────────────────────────────────────────────

/// Provider that replays queued replies in order and records every prompt.
pub struct ScriptedProvider {
    name: String,
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reply(self, reply: Result<String, ProviderError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Unknown("no scripted reply left".to_string())))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resume store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct StoreState {
    resumes: Vec<ResumeRow>,
    analyses: Vec<AnalysisRow>,
    status_history: Vec<(Uuid, ResumeStatus)>,
}

#[derive(Default)]
pub struct InMemoryResumeStore {
    state: Mutex<StoreState>,
    fail_analysis_writes: bool,
}

impl InMemoryResumeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `create_analysis` call fails.
    pub fn failing_analysis_writes(mut self) -> Self {
        self.fail_analysis_writes = true;
        self
    }

    /// Inserts a PENDING resume for a fresh user.
    pub fn seed_resume(&self, file_key: &str, file_type: &str) -> ResumeRow {
        self.seed_resume_for(Uuid::new_v4(), file_key, file_type)
    }

    pub fn seed_resume_for(&self, user_id: Uuid, file_key: &str, file_type: &str) -> ResumeRow {
        let now = Utc::now();
        let row = ResumeRow {
            id: Uuid::new_v4(),
            user_id,
            file_name: file_key.to_string(),
            file_key: file_key.to_string(),
            file_size: 1024,
            file_type: file_type.to_string(),
            status: ResumeStatus::Pending.as_str().to_string(),
            created_at: now,
            updated_at: now,
        };
        self.state.lock().unwrap().resumes.push(row.clone());
        row
    }

    pub fn status_of(&self, resume_id: Uuid) -> Option<ResumeStatus> {
        self.state
            .lock()
            .unwrap()
            .resumes
            .iter()
            .find(|r| r.id == resume_id)
            .and_then(|r| r.status())
    }

    /// Every status written for `resume_id`, oldest first.
    pub fn status_history(&self, resume_id: Uuid) -> Vec<ResumeStatus> {
        self.state
            .lock()
            .unwrap()
            .status_history
            .iter()
            .filter(|(id, _)| *id == resume_id)
            .map(|(_, s)| *s)
            .collect()
    }

    /// Stored analyses for `resume_id`, oldest first.
    pub fn analyses_for(&self, resume_id: Uuid) -> Vec<AnalysisRow> {
        self.state
            .lock()
            .unwrap()
            .analyses
            .iter()
            .filter(|a| a.resume_id == resume_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ResumeStore for InMemoryResumeStore {
    async fn create_resume(&self, resume: &NewResume) -> Result<ResumeRow, StoreError> {
        let mut row = self.seed_resume_for(resume.user_id, &resume.file_key, &resume.file_type);
        row.file_name = resume.file_name.clone();
        row.file_size = resume.file_size;

        let mut state = self.state.lock().unwrap();
        if let Some(stored) = state.resumes.iter_mut().find(|r| r.id == row.id) {
            *stored = row.clone();
        }
        Ok(row)
    }

    async fn find_resume(
        &self,
        resume_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ResumeRow>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .resumes
            .iter()
            .find(|r| r.id == resume_id && r.user_id == user_id)
            .cloned())
    }

    async fn list_resumes(&self, user_id: Uuid) -> Result<Vec<ResumeRow>, StoreError> {
        let mut rows: Vec<ResumeRow> = self
            .state
            .lock()
            .unwrap()
            .resumes
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.reverse();
        Ok(rows)
    }

    async fn update_resume_status(
        &self,
        resume_id: Uuid,
        status: ResumeStatus,
    ) -> Result<(), StoreError> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        let row = state
            .resumes
            .iter_mut()
            .find(|r| r.id == resume_id)
            .ok_or(StoreError::MissingResume(resume_id))?;
        row.status = status.as_str().to_string();
        row.updated_at = Utc::now();
        state.status_history.push((resume_id, status));
        Ok(())
    }

    async fn create_analysis(
        &self,
        resume_id: Uuid,
        result: &AnalysisResult,
    ) -> Result<Uuid, StoreError> {
        if self.fail_analysis_writes {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        let row = AnalysisRow {
            id: Uuid::new_v4(),
            resume_id,
            result: serde_json::to_value(result)?,
            score: result.resume_score as i32,
            created_at: Utc::now(),
        };
        let id = row.id;
        self.state.lock().unwrap().analyses.push(row);
        Ok(id)
    }

    async fn list_analyses(&self, resume_id: Uuid) -> Result<Vec<AnalysisRow>, StoreError> {
        let mut rows = self.analyses_for(resume_id);
        rows.reverse();
        Ok(rows)
    }

    async fn latest_analyses(&self, user_id: Uuid) -> Result<Vec<AnalysisRow>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .resumes
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter_map(|r| state.analyses.iter().rev().find(|a| a.resume_id == r.id))
            .cloned()
            .collect())
    }
}
