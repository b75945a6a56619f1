//! Axum route handlers for the coaching panels.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::coaching::prompts::{career_path_prompt, resume_feedback_prompt, roadmap_prompt};
use crate::errors::AppError;
use crate::pdf::{extract_resume_text, ExtractedText};
use crate::state::AppState;
use crate::upload::UploadForm;
use crate::views::PanelView;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

/// Every field is free text and may be empty.
#[derive(Debug, Deserialize)]
pub struct CareerPathRequest {
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub interests: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub experience: String,
}

#[derive(Debug, Deserialize)]
pub struct RoadmapRequest {
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub goal: String,
}

#[derive(Debug, Deserialize)]
pub struct ResumeFeedbackRequest {
    #[serde(default)]
    pub resume_text: String,
    #[serde(default)]
    pub job_role: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions/:id/career-paths
///
/// A successful suggestion becomes the session's "last career path", usable
/// as a mock interview source.
pub async fn handle_career_paths(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<CareerPathRequest>,
) -> Result<Json<PanelView>, AppError> {
    let mut session = state.sessions.acquire(session_id).await?;

    let prompt = career_path_prompt(
        &request.skills,
        &request.interests,
        &request.education,
        &request.experience,
    );
    let result = state.oracle.complete_prompt(&prompt).await;

    match &result {
        Ok(text) => {
            info!("Career paths suggested for session {}", session_id);
            session.last_career_path = Some(text.clone());
        }
        Err(e) => warn!("Career path suggestion failed for session {}: {}", session_id, e),
    }

    Ok(Json(PanelView::from_completion(&result)))
}

/// POST /api/v1/sessions/:id/roadmap
pub async fn handle_roadmap(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<RoadmapRequest>,
) -> Result<Json<PanelView>, AppError> {
    let mut session = state.sessions.acquire(session_id).await?;

    let prompt = roadmap_prompt(&request.skills, &request.goal);
    let result = state.oracle.complete_prompt(&prompt).await;

    match &result {
        Ok(text) => {
            info!("Roadmap generated for session {}", session_id);
            session.last_roadmap = Some(text.clone());
        }
        Err(e) => warn!("Roadmap generation failed for session {}: {}", session_id, e),
    }

    Ok(Json(PanelView::from_completion(&result)))
}

/// POST /api/v1/sessions/:id/resume-feedback
///
/// Pasted résumé text. An empty résumé is still sent to the oracle.
pub async fn handle_resume_feedback(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ResumeFeedbackRequest>,
) -> Result<Json<PanelView>, AppError> {
    let _session = state.sessions.acquire(session_id).await?;
    let view = resume_feedback(&state, session_id, &request.resume_text, &request.job_role).await;
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/resume-feedback/upload
///
/// Multipart: `resume` (PDF file), `job_role`, optional `resume_text`.
/// An uploaded PDF takes precedence over pasted text. A PDF that cannot be
/// read still produces feedback on empty text, with a warning attached.
pub async fn handle_resume_feedback_upload(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<PanelView>, AppError> {
    let _session = state.sessions.acquire(session_id).await?;
    let mut form = UploadForm::read(multipart, &["resume"]).await?;

    let resume = match form.take_file("resume") {
        Some(file) => extract_resume_text(file.bytes).await,
        None => ExtractedText {
            text: form.text("resume_text").to_string(),
            warning: None,
        },
    };

    let view = resume_feedback(&state, session_id, &resume.text, form.text("job_role")).await;
    Ok(Json(view.with_warning(resume.warning)))
}

async fn resume_feedback(state: &AppState, session_id: Uuid, resume_text: &str, job_role: &str) -> PanelView {
    let prompt = resume_feedback_prompt(resume_text, job_role);
    let result = state.oracle.complete_prompt(&prompt).await;
    if let Err(e) = &result {
        warn!("Resume feedback failed for session {}: {}", session_id, e);
    }
    PanelView::from_completion(&result)
}
