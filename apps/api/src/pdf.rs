//! Résumé PDF text extraction.
//!
//! Extraction never blocks a request: any failure degrades to empty text plus a
//! warning the view shows next to the result.

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("{0}")]
    Unreadable(#[from] pdf_extract::OutputError),

    #[error("the PDF extractor aborted on this file")]
    Aborted,
}

/// Text pulled from an uploaded résumé, with a warning when extraction failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub warning: Option<String>,
}

/// Runs the extractor on the blocking pool. A panic inside the extractor
/// surfaces as `PdfError::Aborted`.
pub async fn extract_text(bytes: Bytes) -> Result<String, PdfError> {
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|_| PdfError::Aborted)?
        .map_err(PdfError::from)
}

pub async fn extract_resume_text(bytes: Bytes) -> ExtractedText {
    let size = bytes.len();
    match extract_text(bytes).await {
        Ok(text) => {
            debug!("Extracted {} chars from {} byte PDF", text.len(), size);
            ExtractedText {
                text,
                warning: None,
            }
        }
        Err(e) => {
            warn!("PDF extraction failed for {} byte upload: {}", size, e);
            ExtractedText {
                text: String::new(),
                warning: Some(format!("Failed to read PDF: {e}")),
            }
        }
    }
}
