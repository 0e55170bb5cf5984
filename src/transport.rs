//! HTTP transport for the inference backend
//!
//! One call, one request: `POST {base_url}/upload` with a multipart form whose
//! only field is `file`. The response body is returned untouched; turning it
//! into a result is the normalizer's job.

use reqwest::multipart;
use reqwest::Client;
use std::path::PathBuf;

use crate::config::ServerConfig;
use crate::selection::VideoFile;

/// Longest slice of a non-JSON error body kept in a message
const MAX_ERROR_BODY: usize = 200;

/// Errors that can occur while talking to the backend
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("could not read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },
}

/// Something that can deliver a video to the backend and hand back the body.
///
/// The controller is generic over this so tests can swap in a fake.
#[allow(async_fn_in_trait)]
pub trait UploadTransport {
    async fn upload(&self, video: &VideoFile) -> Result<String, TransportError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: String,
    http: Client,
}

impl HttpTransport {
    pub fn new(server: &ServerConfig) -> Result<Self, TransportError> {
        let http = Client::builder().timeout(server.timeout()).build()?;

        Ok(Self {
            endpoint: server.upload_url(),
            http,
        })
    }

    /// Returns the upload URL this transport posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl UploadTransport for HttpTransport {
    async fn upload(&self, video: &VideoFile) -> Result<String, TransportError> {
        let bytes = tokio::fs::read(&video.path)
            .await
            .map_err(|source| TransportError::ReadFile {
                path: video.path.clone(),
                source,
            })?;

        tracing::info!(
            endpoint = %self.endpoint,
            file = %video.file_name,
            bytes = bytes.len(),
            "uploading video"
        );

        let part = multipart::Part::bytes(bytes)
            .file_name(video.file_name.clone())
            .mime_str(video.mime_type)?;
        let form = multipart::Form::new().part("file", part);

        let response = self.http.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            tracing::debug!(status = status.as_u16(), bytes = body.len(), "upload response");
            Ok(body)
        } else {
            Err(TransportError::UnexpectedStatus {
                status: status.as_u16(),
                message: error_message(&body),
            })
        }
    }
}

/// Pull a readable message out of an error response.
///
/// The backend answers rejected uploads with `{"error": "..."}`.
pub fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "(empty body)".to_string();
    }
    match trimmed.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
