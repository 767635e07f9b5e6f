//! Recognition service reached over HTTP.

use super::{OcrResponse, RecognitionService};
use crate::error::SubmitError;
use crate::form::UploadFile;
use tracing::{debug, info};

/// Endpoint path the service exposes for sheet recognition.
pub const DEFAULT_ENDPOINT: &str = "/inec-ocr";

pub struct HttpRecognitionService {
    url: String,
    client: reqwest::Client,
}

impl HttpRecognitionService {
    /// `base_url` should be like `http://localhost:8000` (no trailing slash needed).
    pub fn new(client: reqwest::Client, base_url: &str, endpoint: &str) -> Self {
        let url = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        Self { url, client }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl RecognitionService for HttpRecognitionService {
    fn name(&self) -> &str {
        "http"
    }

    async fn recognize(&self, file: &UploadFile) -> Result<OcrResponse, SubmitError> {
        use reqwest::multipart::{Form, Part};

        info!(
            "HttpRecognitionService: posting {} ({} bytes) to {}",
            file.file_name,
            file.data.len(),
            self.url
        );

        let part = Part::bytes(file.data.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;

        let form = Form::new().part("file", part);

        let response = self.client.post(&self.url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubmitError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let raw = response.bytes().await?;
        debug!(
            "HttpRecognitionService: response ({} bytes): {}",
            raw.len(),
            String::from_utf8_lossy(&raw[..raw.len().min(500)])
        );

        OcrResponse::from_slice(&raw)
    }
}
