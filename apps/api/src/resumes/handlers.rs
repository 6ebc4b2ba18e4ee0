use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::mime::DocumentKind;
use crate::models::analysis::AnalysisResult;
use crate::models::resume::{AnalysisRow, NewResume, ResumeRow};
use crate::orchestrator::OrchestrationError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// Body of `POST /api/v1/resumes`. Every field is required; they are optional
/// here so that missing ones are reported together, by name.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResumeRequest {
    pub user_id: Option<Uuid>,
    pub file_name: Option<String>,
    pub file_key: Option<String>,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub file_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub upload_url: String,
    pub key: String,
}

/// Body of `POST /api/v1/analyze`. Fields are optional so that a missing one
/// is reported by name instead of as a generic deserialization failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub user_id: Option<Uuid>,
    pub resume_id: Option<Uuid>,
    pub file_key: Option<String>,
    /// Falls back to the type recorded on the resume.
    pub file_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: AnalysisResult,
}

#[derive(Debug, Serialize)]
pub struct ResumeDetailResponse {
    #[serde(flatten)]
    pub resume: ResumeRow,
    pub analyses: Vec<AnalysisRow>,
}

/// POST /api/v1/upload
/// Issues a presigned PUT URL under a fresh object key.
pub async fn handle_upload_url(
    State(state): State<AppState>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let Json(req) = payload?;
    let file_type = non_blank(req.file_type)
        .ok_or_else(|| AppError::Validation("Missing required fields: fileType".to_string()))?;

    let key = object_key_for(&file_type);
    let upload_url = state.storage.presign_upload(&key, &file_type).await?;
    info!("Issued upload URL for {key}");
    Ok(Json(UploadResponse { upload_url, key }))
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    payload: Result<Json<CreateResumeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ResumeRow>), AppError> {
    let Json(req) = payload?;
    let new_resume = validate_new_resume(req)?;
    let resume = state.store.create_resume(&new_resume).await?;
    Ok((StatusCode::CREATED, Json(resume)))
}

/// GET /api/v1/resumes
/// All of a user's resumes, newest first, each with its analyses.
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ResumeDetailResponse>>, AppError> {
    let resumes = state.store.list_resumes(params.user_id).await?;
    let mut out = Vec::with_capacity(resumes.len());
    for resume in resumes {
        let analyses = state.store.list_analyses(resume.id).await?;
        out.push(ResumeDetailResponse { resume, analyses });
    }
    Ok(Json(out))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ResumeDetailResponse>, AppError> {
    let resume = state
        .store
        .find_resume(resume_id, params.user_id)
        .await?
        .ok_or(OrchestrationError::NotFoundOrDenied)?;
    let analyses = state.store.list_analyses(resume.id).await?;
    Ok(Json(ResumeDetailResponse { resume, analyses }))
}

/// POST /api/v1/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let Json(req) = payload?;
    let file_key = req.file_key.as_deref().map(str::trim).unwrap_or_default();
    let mut missing = Vec::new();
    if req.user_id.is_none() {
        missing.push("userId");
    }
    if req.resume_id.is_none() {
        missing.push("resumeId");
    }
    if file_key.is_empty() {
        missing.push("fileKey");
    }
    let (Some(user_id), Some(resume_id), false) = (req.user_id, req.resume_id, file_key.is_empty())
    else {
        return Err(OrchestrationError::MissingInput(missing.join(", ")).into());
    };

    let resume = state
        .store
        .find_resume(resume_id, user_id)
        .await?
        .ok_or(OrchestrationError::NotFoundOrDenied)?;

    let file_type = req
        .file_type
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(resume.file_type.as_str());

    info!("Analyzing resume {resume_id} ({file_type})");
    let analysis = state
        .orchestrator
        .run(resume.id, file_key, Some(file_type))
        .await?;

    Ok(Json(AnalyzeResponse {
        success: true,
        analysis,
    }))
}

fn validate_new_resume(req: CreateResumeRequest) -> Result<NewResume, AppError> {
    let file_name = non_blank(req.file_name);
    let file_key = non_blank(req.file_key);
    let file_size = req.file_size.filter(|size| *size > 0);
    let file_type = non_blank(req.file_type);

    match (req.user_id, file_name, file_key, file_size, file_type) {
        (Some(user_id), Some(file_name), Some(file_key), Some(file_size), Some(file_type)) => {
            Ok(NewResume {
                user_id,
                file_name,
                file_key,
                file_size,
                file_type,
            })
        }
        (user_id, file_name, file_key, file_size, file_type) => {
            let missing: Vec<&str> = [
                ("userId", user_id.is_none()),
                ("fileName", file_name.is_none()),
                ("fileKey", file_key.is_none()),
                ("fileSize", file_size.is_none()),
                ("fileType", file_type.is_none()),
            ]
            .into_iter()
            .filter_map(|(name, absent)| absent.then_some(name))
            .collect();
            Err(AppError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Fresh object key, with an extension when the type is one we can analyze.
fn object_key_for(file_type: &str) -> String {
    let extension = match DocumentKind::resolve(Some(file_type), "") {
        Ok(DocumentKind::Pdf) => ".pdf",
        Ok(DocumentKind::Docx) => ".docx",
        Err(_) => "",
    };
    format!("uploads/{}{extension}", Uuid::new_v4())
}
