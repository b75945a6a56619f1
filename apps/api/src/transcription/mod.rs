//! Speech-to-text for spoken interview answers (AssemblyAI REST API).
//!
//! Flow: upload audio → start transcript job → poll until the job settles.
//! Polling is unbounded; the remote job is trusted to reach a terminal status.

use std::time::Duration;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

const ASSEMBLYAI_BASE_URL: &str = "https://api.assemblyai.com/v2";

/// Each variant displays as the sentence shown to the candidate in place of a transcript.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranscriptionError {
    #[error("AssemblyAI API key not set.")]
    NotConfigured,

    #[error("Failed to upload audio for transcription.")]
    Upload,

    #[error("Failed to start transcription.")]
    Start,

    #[error("Failed to check transcription status.")]
    Poll,

    #[error("Transcription failed.")]
    Failed,

    #[error("No speech was detected in the recording.")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptJob {
    id: String,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum JobStatus {
    Queued,
    Processing,
    Completed,
    Error,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct TranscriptPoll {
    status: JobStatus,
    text: Option<String>,
    error: Option<String>,
}

#[derive(Clone)]
pub struct TranscriptionClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    poll_interval: Duration,
}

impl TranscriptionClient {
    pub fn new(api_key: Option<String>, poll_interval: Duration) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: ASSEMBLYAI_BASE_URL.to_string(),
            poll_interval,
        }
    }

    /// Overrides the API base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Transcribes raw audio bytes. Returns `NotConfigured` without touching
    /// the network when no API key is set.
    pub async fn transcribe(&self, audio: Bytes, file_name: &str) -> Result<String, TranscriptionError> {
        let api_key = self.api_key.as_deref().ok_or(TranscriptionError::NotConfigured)?;

        let audio_url = self.upload(api_key, audio, file_name).await?;
        let job_id = self.start(api_key, &audio_url).await?;
        info!("Transcription job {} started", job_id);
        self.wait_for(api_key, &job_id).await
    }

    async fn upload(&self, api_key: &str, audio: Bytes, file_name: &str) -> Result<String, TranscriptionError> {
        debug!("Uploading {} bytes of audio", audio.len());
        let form = Form::new().part("file", Part::bytes(audio.to_vec()).file_name(file_name.to_string()));

        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .header("authorization", api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!("Audio upload request failed: {e}");
                TranscriptionError::Upload
            })?;

        if !response.status().is_success() {
            warn!("Audio upload returned {}", response.status());
            return Err(TranscriptionError::Upload);
        }

        response
            .json::<UploadResponse>()
            .await
            .map(|r| r.upload_url)
            .map_err(|e| {
                warn!("Audio upload response unreadable: {e}");
                TranscriptionError::Upload
            })
    }

    async fn start(&self, api_key: &str, audio_url: &str) -> Result<String, TranscriptionError> {
        let response = self
            .client
            .post(format!("{}/transcript", self.base_url))
            .header("authorization", api_key)
            .json(&json!({ "audio_url": audio_url }))
            .send()
            .await
            .map_err(|e| {
                warn!("Transcript request failed: {e}");
                TranscriptionError::Start
            })?;

        if !response.status().is_success() {
            warn!("Transcript request returned {}", response.status());
            return Err(TranscriptionError::Start);
        }

        response
            .json::<TranscriptJob>()
            .await
            .map(|job| job.id)
            .map_err(|e| {
                warn!("Transcript response unreadable: {e}");
                TranscriptionError::Start
            })
    }

    async fn wait_for(&self, api_key: &str, job_id: &str) -> Result<String, TranscriptionError> {
        let url = format!("{}/transcript/{}", self.base_url, job_id);
        loop {
            let poll = self
                .client
                .get(&url)
                .header("authorization", api_key)
                .send()
                .await
                .map_err(|e| {
                    warn!("Polling job {job_id} failed: {e}");
                    TranscriptionError::Poll
                })?
                .json::<TranscriptPoll>()
                .await
                .map_err(|e| {
                    warn!("Poll response for job {job_id} unreadable: {e}");
                    TranscriptionError::Poll
                })?;

            match poll.status {
                JobStatus::Completed => {
                    let text = poll.text.unwrap_or_default();
                    if text.trim().is_empty() {
                        warn!("Transcription job {} completed without speech", job_id);
                        return Err(TranscriptionError::Empty);
                    }
                    info!("Transcription job {} completed", job_id);
                    return Ok(text);
                }
                JobStatus::Error | JobStatus::Failed => {
                    warn!(
                        "Transcription job {} failed: {}",
                        job_id,
                        poll.error.as_deref().unwrap_or("no detail")
                    );
                    return Err(TranscriptionError::Failed);
                }
                JobStatus::Queued | JobStatus::Processing | JobStatus::Unknown => {
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{any, body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer, key: Option<&str>) -> TranscriptionClient {
        TranscriptionClient::new(key.map(String::from), Duration::from_millis(10))
            .with_base_url(format!("{}/v2", server.uri()))
    }

    #[tokio::test]
    async fn test_missing_key_short_circuits_without_network() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = test_client(&server, None);
        assert!(!client.is_configured());
        let err = client
            .transcribe(Bytes::from_static(b"RIFF"), "answer.wav")
            .await
            .unwrap_err();
        assert_eq!(err, TranscriptionError::NotConfigured);
        assert_eq!(err.to_string(), "AssemblyAI API key not set.");
    }

    #[tokio::test]
    async fn test_upload_start_and_poll_until_completed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/upload"))
            .and(header("authorization", "aai-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"upload_url": "https://cdn.test/audio/1"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v2/transcript"))
            .and(body_json(json!({"audio_url": "https://cdn.test/audio/1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "t1", "status": "queued"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/transcript/t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "processing", "text": null})))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/transcript/t1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "completed", "text": "I led the migration."})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server, Some("aai-key"));
        let text = client
            .transcribe(Bytes::from_static(b"RIFF....WAVE"), "answer.wav")
            .await
            .unwrap();
        assert_eq!(text, "I led the migration.");
    }

    #[tokio::test]
    async fn test_failed_upload_stops_before_starting_job() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/upload"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v2/transcript"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "never"})))
            .expect(0)
            .mount(&server)
            .await;

        let client = test_client(&server, Some("aai-key"));
        let err = client
            .transcribe(Bytes::from_static(b"RIFF"), "answer.wav")
            .await
            .unwrap_err();
        assert_eq!(err, TranscriptionError::Upload);
    }

    #[tokio::test]
    async fn test_rejected_job_maps_to_start_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"upload_url": "u"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v2/transcript"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "bad audio_url"})))
            .mount(&server)
            .await;

        let client = test_client(&server, Some("aai-key"));
        let err = client
            .transcribe(Bytes::from_static(b"RIFF"), "answer.wav")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to start transcription.");
    }

    #[tokio::test]
    async fn test_error_status_maps_to_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"upload_url": "u"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v2/transcript"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "t9"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/transcript/t9"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "error", "error": "Audio file is empty"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server, Some("aai-key"));
        let err = client
            .transcribe(Bytes::from_static(b"RIFF"), "answer.wav")
            .await
            .unwrap_err();
        assert_eq!(err, TranscriptionError::Failed);
        assert_eq!(err.to_string(), "Transcription failed.");
    }

    async fn mount_upload_and_start(server: &MockServer, job_id: &str) {
        Mock::given(method("POST"))
            .and(path("/v2/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"upload_url": "u"})))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v2/transcript"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": job_id})))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_completed_without_text_maps_to_empty() {
        for text in [json!(null), json!(""), json!("  \n ")] {
            let server = MockServer::start().await;
            mount_upload_and_start(&server, "t2").await;
            Mock::given(method("GET"))
                .and(path("/v2/transcript/t2"))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!({"status": "completed", "text": text})),
                )
                .mount(&server)
                .await;

            let client = test_client(&server, Some("aai-key"));
            let err = client
                .transcribe(Bytes::from_static(b"RIFF"), "silence.wav")
                .await
                .unwrap_err();
            assert_eq!(err, TranscriptionError::Empty);
            assert_eq!(err.to_string(), "No speech was detected in the recording.");
        }
    }

    #[tokio::test]
    async fn test_unreadable_poll_response_maps_to_poll_error() {
        let server = MockServer::start().await;
        mount_upload_and_start(&server, "t3").await;
        Mock::given(method("GET"))
            .and(path("/v2/transcript/t3"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server, Some("aai-key"));
        let err = client
            .transcribe(Bytes::from_static(b"RIFF"), "answer.wav")
            .await
            .unwrap_err();
        assert_eq!(err, TranscriptionError::Poll);
        assert_eq!(err.to_string(), "Failed to check transcription status.");
    }
}
