//! Axum route handlers for account sign-up, sign-in and sign-out.
//!
//! Provider failures come back as `ok: false` with a friendly message, never as an HTTP error.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::identity::{Identity, IdentityClient, IdentityError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AccountView {
    pub ok: bool,
    pub message: String,
    pub identity: Option<Identity>,
}

impl AccountView {
    fn failed(error: &IdentityError, identity: Option<Identity>) -> Self {
        Self {
            ok: false,
            message: error.friendly_message(),
            identity,
        }
    }
}

fn provider(state: &AppState) -> Result<&IdentityClient, IdentityError> {
    state.identity.as_ref().ok_or(IdentityError::NotConfigured)
}

/// GET /api/v1/sessions/:id/identity
pub async fn handle_whoami(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Identity>, AppError> {
    let session = state.sessions.acquire(session_id).await?;
    session.identity.clone().map(Json).ok_or(AppError::Unauthorized)
}

/// POST /api/v1/sessions/:id/identity/sign-up
pub async fn handle_sign_up(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SignUpRequest>,
) -> Result<Json<AccountView>, AppError> {
    let mut session = state.sessions.acquire(session_id).await?;

    let result = match provider(&state) {
        Ok(client) => {
            client
                .sign_up(&request.email, &request.password, &request.display_name)
                .await
        }
        Err(e) => Err(e),
    };

    let view = match result {
        Ok(outcome) if outcome.signed_in => {
            session.identity = Some(outcome.identity);
            AccountView {
                ok: true,
                message: "Account created. You are signed in.".to_string(),
                identity: session.identity.clone(),
            }
        }
        Ok(_) => AccountView {
            ok: true,
            message: "Account created. Check your email to confirm it, then sign in.".to_string(),
            identity: session.identity.clone(),
        },
        Err(e) => {
            warn!("Sign-up failed for session {}: {}", session_id, e);
            AccountView::failed(&e, session.identity.clone())
        }
    };
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/identity/sign-in
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<AccountView>, AppError> {
    let mut session = state.sessions.acquire(session_id).await?;

    let result = match provider(&state) {
        Ok(client) => client.sign_in(&request.email, &request.password).await,
        Err(e) => Err(e),
    };

    let view = match result {
        Ok(identity) => {
            info!("Session {} signed in as {}", session_id, identity.user_id);
            let message = format!("Welcome, {}!", identity.display_name);
            session.identity = Some(identity);
            AccountView {
                ok: true,
                message,
                identity: session.identity.clone(),
            }
        }
        Err(e) => {
            warn!("Sign-in failed for session {}: {}", session_id, e);
            AccountView::failed(&e, session.identity.clone())
        }
    };
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/identity/sign-out
pub async fn handle_sign_out(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<AccountView>, AppError> {
    let mut session = state.sessions.acquire(session_id).await?;
    session.identity = None;
    Ok(Json(AccountView {
        ok: true,
        message: "Signed out.".to_string(),
        identity: None,
    }))
}
