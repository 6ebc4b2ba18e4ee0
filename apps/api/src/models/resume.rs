use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Processing status of an uploaded resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResumeStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ResumeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResumeStatus::Pending => "PENDING",
            ResumeStatus::Processing => "PROCESSING",
            ResumeStatus::Completed => "COMPLETED",
            ResumeStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ResumeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResumeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ResumeStatus::Pending),
            "PROCESSING" => Ok(ResumeStatus::Processing),
            "COMPLETED" => Ok(ResumeStatus::Completed),
            "FAILED" => Ok(ResumeStatus::Failed),
            other => Err(format!("unknown resume status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub file_key: String,
    pub file_size: i64,
    pub file_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResumeRow {
    pub fn status(&self) -> Option<ResumeStatus> {
        self.status.parse().ok()
    }
}

/// One entry of a resume's append-only analysis history.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub result: Value,
    pub score: i32,
    pub created_at: DateTime<Utc>,
}

/// Fields required to register an uploaded file as a PENDING resume.
#[derive(Debug, Clone)]
pub struct NewResume {
    pub user_id: Uuid,
    pub file_name: String,
    pub file_key: String,
    pub file_size: i64,
    pub file_type: String,
}
