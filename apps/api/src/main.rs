mod coaching;
mod config;
mod errors;
mod identity;
mod interview;
mod llm_client;
mod pdf;
mod routes;
mod session;
mod state;
#[cfg(test)]
mod test_support;
mod transcription;
mod upload;
mod views;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::identity::IdentityClient;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::session::{spawn_sweeper, SessionStore};
use crate::state::AppState;
use crate::transcription::TranscriptionClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing completion key)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SkillBridge API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize completion client
    let llm = LlmClient::new(
        &config.completion_api_key,
        &config.site_url,
        &config.site_name,
        config.completion_timeout,
    )?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize transcription client (voice answers degrade gracefully without a key)
    let transcriber = TranscriptionClient::new(
        config.transcription_api_key.clone(),
        config.transcription_poll_interval,
    );
    if !transcriber.is_configured() {
        warn!("ASSEMBLYAI_API_KEY not set; voice answers are disabled");
    }

    // Initialize identity provider client (accounts are optional)
    let identity = config.identity.as_ref().map(IdentityClient::new);
    match &config.identity {
        Some(identity_config) => info!("Identity provider: {}", identity_config.url),
        None => info!("Identity provider not configured; accounts are disabled"),
    }

    // Session store plus idle sweeper
    let sessions = SessionStore::new(config.interview_max_questions);
    spawn_sweeper(
        sessions.clone(),
        config.session_idle_ttl,
        config.session_sweep_interval,
    );
    info!(
        "Sessions expire after {}s idle; interview cap {} questions",
        config.session_idle_ttl.as_secs(),
        config.interview_max_questions
    );

    // Build app state
    let state = AppState {
        sessions,
        oracle: Arc::new(llm),
        transcriber,
        identity,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
