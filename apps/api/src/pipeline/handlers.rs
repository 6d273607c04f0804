use axum::{
    extract::{multipart::Multipart, Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::analysis::analyzer::AnalysisEnvelope;
use crate::analysis::encoder::UploadedFile;
use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::models::user::AuthUser;
use crate::pipeline::progress::{Progress, RunSnapshot};
use crate::pipeline::PipelineError;
use crate::state::AppState;

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct AnalyzeResumeResponse {
    pub resume_id: Uuid,
    pub redirect_to: String,
    pub progress: Progress,
}

/// Pulls the `file` part out of a multipart body. `Ok(None)` when no file was sent.
async fn read_uploaded_file(mut multipart: Multipart) -> Result<Option<UploadedFile>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let name = field.file_name().unwrap_or("resume").to_string();
        let media_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?;

        let file = UploadedFile::new(content, &media_type, &name);
        if !file.is_accepted_media_type() {
            return Err(AppError::Validation(format!(
                "Unsupported file type {media_type}. Please upload a PDF or DOCX file."
            )));
        }
        if file.content.is_empty() {
            return Err(AppError::Validation("The selected file is empty.".to_string()));
        }
        return Ok(Some(file));
    }
    Ok(None)
}

/// POST /api/v1/resumes/analyze
///
/// Preconditions run in order (AI configured, user, file) and the user's run is
/// only replaced once all of them pass.
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResumeResponse>, AppError> {
    let user_id = state.pipeline.authorize(user.map(|AuthUser(id)| id))?;
    let file = read_uploaded_file(multipart)
        .await?
        .ok_or(PipelineError::NoFile)?;

    let tracker = state.runs.begin(user_id);
    let resume_id = state
        .pipeline
        .run(Some(user_id), Some(file), &tracker)
        .await?;
    info!("Analysis ready at /results/{resume_id}");

    Ok(Json(AnalyzeResumeResponse {
        resume_id,
        redirect_to: format!("/results/{resume_id}"),
        progress: tracker.snapshot().progress,
    }))
}

/// POST /api/v1/analysis
pub async fn handle_analysis(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisEnvelope>, AppError> {
    let file = read_uploaded_file(multipart)
        .await?
        .ok_or_else(|| AppError::Validation("Please select a file to analyze.".to_string()))?;
    let result = state.analyzer.analyze(&file).await;
    Ok(Json(AnalysisEnvelope::from(result)))
}

/// GET /api/v1/runs/current
pub async fn handle_current_run(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Json<RunSnapshot> {
    Json(state.runs.latest(user_id).unwrap_or_default())
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeRow>, AppError> {
    let row = state
        .store
        .fetch_record(id)
        .await?
        .filter(|row| row.user_id == user_id)
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    Ok(Json(row))
}
