use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AnnotationError, Result};
use crate::models::PageImage;
use crate::service::encode::encode_page;
use crate::service::provider::AnnotationService;
use crate::service::wire::{classify_response, ProcessImageRequest, ProcessImageResponse};
use crate::PresubmitError;

const PROCESS_IMAGE_PATH: &str = "/api/process-image";

pub struct HttpAnnotationClient {
    client: Client,
    endpoint: String,
    auth_token: String,
    jpeg_quality: u8,
}

impl HttpAnnotationClient {
    pub fn new(
        base_url: &str,
        auth_token: String,
        timeout: Duration,
        jpeg_quality: u8,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PresubmitError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(HttpAnnotationClient {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), PROCESS_IMAGE_PATH),
            auth_token,
            jpeg_quality,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnnotationService for HttpAnnotationClient {
    async fn submit(
        &self,
        image: &PageImage,
        symbols: &[String],
    ) -> std::result::Result<ProcessImageResponse, AnnotationError> {
        // JPEG encoding is CPU bound; keep it off the I/O threads.
        let page = image.clone();
        let quality = self.jpeg_quality;
        let payload = tokio::task::spawn_blocking(move || encode_page(&page, quality))
            .await
            .map_err(|e| {
                tracing::warn!("Page encoding task failed: {}", e);
                AnnotationError::InvalidImage
            })??;

        let request = ProcessImageRequest {
            image: &payload,
            symbols,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.auth_token))
            .json(&request)
            .send()
            .await
            .map_err(|e| AnnotationError::NetworkError(format!("Failed to send request: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| AnnotationError::NetworkError(format!("Failed to read response: {}", e)))?;

        tracing::debug!("Annotation service answered {} ({} bytes)", status, body.len());
        classify_response(status, &body)
    }
}
