//! JSON views returned by the panel endpoints.
//!
//! Client failures reach this layer as typed errors; this is where they turn
//! into the "Error: …" text shown in place of a result.

use serde::Serialize;

use crate::llm_client::CompletionError;

pub fn render_completion(result: &Result<String, CompletionError>) -> String {
    match result {
        Ok(text) => text.clone(),
        Err(e) => format!("Error: {e}"),
    }
}

/// Result of a single-shot coaching action (career paths, roadmap, résumé feedback).
#[derive(Debug, Serialize)]
pub struct PanelView {
    pub ok: bool,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl PanelView {
    pub fn from_completion(result: &Result<String, CompletionError>) -> Self {
        Self {
            ok: result.is_ok(),
            text: render_completion(result),
            warning: None,
        }
    }

    pub fn with_warning(mut self, warning: Option<String>) -> Self {
        self.warning = warning;
        self
    }
}
