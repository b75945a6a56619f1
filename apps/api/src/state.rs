use std::sync::Arc;

use crate::identity::IdentityClient;
use crate::llm_client::Oracle;
use crate::session::SessionStore;
use crate::transcription::TranscriptionClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    /// Chat-completion backend. Default: `LlmClient` (OpenRouter).
    pub oracle: Arc<dyn Oracle>,
    pub transcriber: TranscriptionClient,
    /// `None` when the identity provider is not configured.
    pub identity: Option<IdentityClient>,
}
