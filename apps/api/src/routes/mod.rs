pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::coaching::handlers as coaching;
use crate::identity::handlers as identity;
use crate::interview::handlers as interview;
use crate::session::handlers as session;
use crate::state::AppState;

/// Résumé PDFs and recorded answers exceed axum's 2 MB default.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(session::handle_get_session).delete(session::handle_delete_session),
        )
        // Coaching panels
        .route(
            "/api/v1/sessions/:id/career-paths",
            post(coaching::handle_career_paths),
        )
        .route("/api/v1/sessions/:id/roadmap", post(coaching::handle_roadmap))
        .route(
            "/api/v1/sessions/:id/resume-feedback",
            post(coaching::handle_resume_feedback),
        )
        .route(
            "/api/v1/sessions/:id/resume-feedback/upload",
            post(coaching::handle_resume_feedback_upload),
        )
        // Mock interview
        .route(
            "/api/v1/sessions/:id/interview",
            get(interview::handle_get_interview),
        )
        .route(
            "/api/v1/sessions/:id/interview/start",
            post(interview::handle_start),
        )
        .route(
            "/api/v1/sessions/:id/interview/start/upload",
            post(interview::handle_start_upload),
        )
        .route(
            "/api/v1/sessions/:id/interview/next-question",
            post(interview::handle_next_question),
        )
        .route(
            "/api/v1/sessions/:id/interview/answer",
            post(interview::handle_answer),
        )
        .route(
            "/api/v1/sessions/:id/interview/answer/audio",
            post(interview::handle_audio_answer),
        )
        .route(
            "/api/v1/sessions/:id/interview/reset",
            post(interview::handle_reset),
        )
        // Accounts
        .route(
            "/api/v1/sessions/:id/identity",
            get(identity::handle_whoami),
        )
        .route(
            "/api/v1/sessions/:id/identity/sign-up",
            post(identity::handle_sign_up),
        )
        .route(
            "/api/v1/sessions/:id/identity/sign-in",
            post(identity::handle_sign_in),
        )
        .route(
            "/api/v1/sessions/:id/identity/sign-out",
            post(identity::handle_sign_out),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
