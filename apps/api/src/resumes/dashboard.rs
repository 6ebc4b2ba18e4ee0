use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::analysis::AnalysisResult;
use crate::models::resume::{AnalysisRow, ResumeRow, ResumeStatus};
use crate::resumes::handlers::UserIdQuery;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResume {
    pub id: Uuid,
    pub file_name: String,
    pub upload_date: DateTime<Utc>,
    pub resume_score: i64,
    pub ats_compatibility: String,
    /// Number of matched keywords in the latest analysis.
    pub skill_match: usize,
    pub keywords: Vec<String>,
    /// Grammar issues followed by formatting tips.
    pub suggestions: Vec<String>,
    pub status: String,
    pub file_key: String,
    pub file_type: String,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_resumes: usize,
    pub completed_analyses: usize,
    pub processing_analyses: usize,
    pub failed_analyses: usize,
    pub average_score: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub resumes: Vec<DashboardResume>,
    pub stats: DashboardStats,
}

/// Joins each resume with its latest analysis and aggregates the stats.
///
/// Resumes without an analysis count as score 0 in the average.
pub fn compute_dashboard(resumes: Vec<ResumeRow>, latest: Vec<AnalysisRow>) -> DashboardResponse {
    let mut by_resume: HashMap<Uuid, AnalysisRow> =
        latest.into_iter().map(|a| (a.resume_id, a)).collect();

    let mut stats = DashboardStats {
        total_resumes: resumes.len(),
        ..Default::default()
    };

    let entries: Vec<DashboardResume> = resumes
        .into_iter()
        .map(|resume| {
            match resume.status() {
                Some(ResumeStatus::Completed) => stats.completed_analyses += 1,
                Some(ResumeStatus::Processing) => stats.processing_analyses += 1,
                Some(ResumeStatus::Failed) => stats.failed_analyses += 1,
                _ => {}
            }
            let analysis = by_resume.remove(&resume.id);
            to_entry(resume, analysis)
        })
        .collect();

    if !entries.is_empty() {
        let total: i64 = entries.iter().map(|e| e.resume_score).sum();
        stats.average_score = (total as f64 / entries.len() as f64).round() as i64;
    }

    DashboardResponse {
        resumes: entries,
        stats,
    }
}

fn to_entry(resume: ResumeRow, analysis: Option<AnalysisRow>) -> DashboardResume {
    let score = analysis.as_ref().map(|a| i64::from(a.score)).unwrap_or(0);
    let result = analysis.and_then(|a| {
        serde_json::from_value::<AnalysisResult>(a.result)
            .map_err(|e| warn!("Stored analysis {} is unreadable: {e}", a.id))
            .ok()
    });

    let (ats, keywords, suggestions) = match result {
        Some(r) => {
            let ats = r
                .ats_compatibility
                .as_ref()
                .map(|a| a.label())
                .unwrap_or_else(|| "Unknown".to_string());
            let suggestions = r.grammar_issues.into_iter().chain(r.formatting_tips).collect();
            (ats, r.keywords_matched, suggestions)
        }
        None => ("Unknown".to_string(), Vec::new(), Vec::new()),
    };

    DashboardResume {
        id: resume.id,
        file_name: resume.file_name,
        upload_date: resume.created_at,
        resume_score: score,
        ats_compatibility: ats,
        skill_match: keywords.len(),
        keywords,
        suggestions,
        status: resume.status.to_lowercase(),
        file_key: resume.file_key,
        file_type: resume.file_type,
    }
}

/// GET /api/v1/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    let resumes = state.store.list_resumes(params.user_id).await?;
    let latest = state.store.latest_analyses(params.user_id).await?;
    Ok(Json(compute_dashboard(resumes, latest)))
}
