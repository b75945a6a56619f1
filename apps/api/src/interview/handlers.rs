//! Axum route handlers for the mock interview panel.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::machine::{
    FinishReason, InterviewContext, InterviewSession, InterviewState, InvalidTransition, Turn,
};
use crate::interview::service::{self, InterviewSource, QuestionOutcome};
use crate::pdf::extract_resume_text;
use crate::state::AppState;
use crate::upload::UploadForm;
use crate::views::render_completion;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

/// Snapshot of the interview after an action.
#[derive(Debug, Serialize)]
pub struct InterviewView {
    pub state: InterviewState,
    pub context: Option<InterviewContext>,
    pub step: u32,
    pub finished: bool,
    pub finish_reason: Option<FinishReason>,
    pub turns: Vec<Turn>,
    pub latest_question: Option<String>,
    /// Status line for the candidate (finish banner, transcription failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    /// Rendered oracle failure, "Error: …".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Résumé extraction warning from the upload variant of start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl InterviewView {
    fn of(interview: &InterviewSession) -> Self {
        let notice = match interview.finish_reason() {
            Some(FinishReason::Marker) => {
                Some("Interview finished! See the feedback and score above.".to_string())
            }
            Some(FinishReason::TurnLimit) => Some(format!(
                "Interview ended after {} questions without a closing score. Reset to start over.",
                interview.step()
            )),
            None => None,
        };
        Self {
            state: interview.state(),
            context: interview.context(),
            step: interview.step(),
            finished: interview.is_finished(),
            finish_reason: interview.finish_reason(),
            turns: interview.turns().to_vec(),
            latest_question: interview.latest_question().map(String::from),
            notice,
            error: None,
            warning: None,
        }
    }

    fn with_outcome(mut self, outcome: QuestionOutcome) -> Self {
        if outcome.is_err() {
            self.error = Some(render_completion(&outcome.map(|_| String::new())));
        }
        self
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/sessions/:id/interview
pub async fn handle_get_interview(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<InterviewView>, AppError> {
    let session = state.sessions.acquire(session_id).await?;
    Ok(Json(InterviewView::of(&session.interview)))
}

/// POST /api/v1/sessions/:id/interview/start
///
/// Body: `{"source": "resume", "resume_text", "position", "company"}`,
/// `{"source": "career_path"}` or `{"source": "roadmap"}`.
pub async fn handle_start(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(source): Json<InterviewSource>,
) -> Result<Json<InterviewView>, AppError> {
    let mut session = state.sessions.acquire(session_id).await?;
    let outcome = service::start(&mut session, &source, state.oracle.as_ref()).await?;
    Ok(Json(InterviewView::of(&session.interview).with_outcome(outcome)))
}

/// POST /api/v1/sessions/:id/interview/start/upload
///
/// Multipart: `resume` (PDF), `position`, `company`, optional `resume_text`.
pub async fn handle_start_upload(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<InterviewView>, AppError> {
    let mut session = state.sessions.acquire(session_id).await?;
    let mut form = UploadForm::read(multipart, &["resume"]).await?;

    let (resume_text, warning) = match form.take_file("resume") {
        Some(file) => {
            let extracted = extract_resume_text(file.bytes).await;
            (extracted.text, extracted.warning)
        }
        None => (form.text("resume_text").to_string(), None),
    };
    let source = InterviewSource::Resume {
        resume_text,
        position: form.text("position").to_string(),
        company: form.text("company").to_string(),
    };

    let outcome = service::start(&mut session, &source, state.oracle.as_ref()).await?;
    let mut view = InterviewView::of(&session.interview).with_outcome(outcome);
    view.warning = warning;
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/interview/next-question
pub async fn handle_next_question(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<InterviewView>, AppError> {
    let mut session = state.sessions.acquire(session_id).await?;
    let outcome = service::next_question(&mut session.interview, state.oracle.as_ref()).await?;
    Ok(Json(InterviewView::of(&session.interview).with_outcome(outcome)))
}

/// POST /api/v1/sessions/:id/interview/answer
pub async fn handle_answer(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<InterviewView>, AppError> {
    let mut session = state.sessions.acquire(session_id).await?;
    if request.answer.trim().is_empty() {
        return Err(AppError::Validation("answer cannot be empty".to_string()));
    }
    service::submit_answer(&mut session.interview, request.answer)?;
    Ok(Json(InterviewView::of(&session.interview)))
}

/// POST /api/v1/sessions/:id/interview/answer/audio
///
/// Multipart: `audio` (wav/mp3/m4a/ogg/webm). The transcript becomes the
/// candidate's answer. A failed or silent transcription is reported in
/// `notice` and nothing is appended.
pub async fn handle_audio_answer(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<InterviewView>, AppError> {
    let mut session = state.sessions.acquire(session_id).await?;
    if session.interview.state() != InterviewState::AwaitingAnswer {
        return Err(InvalidTransition {
            state: session.interview.state(),
            event: "submit an answer",
        }
        .into());
    }

    let mut form = UploadForm::read(multipart, &["audio"]).await?;
    let audio = form
        .take_file("audio")
        .ok_or_else(|| AppError::Validation("audio file is required".to_string()))?;

    match state.transcriber.transcribe(audio.bytes, &audio.file_name).await {
        Ok(transcript) => {
            info!("Session {} answered by voice ({} chars)", session_id, transcript.len());
            service::submit_answer(&mut session.interview, transcript)?;
            Ok(Json(InterviewView::of(&session.interview)))
        }
        Err(e) => {
            warn!("Transcription failed for session {}: {:?}", session_id, e);
            let mut view = InterviewView::of(&session.interview);
            view.notice = Some(e.to_string());
            Ok(Json(view))
        }
    }
}

/// POST /api/v1/sessions/:id/interview/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<InterviewView>, AppError> {
    let mut session = state.sessions.acquire(session_id).await?;
    service::reset(&mut session.interview);
    info!("Session {} reset its interview", session_id);
    Ok(Json(InterviewView::of(&session.interview)))
}
