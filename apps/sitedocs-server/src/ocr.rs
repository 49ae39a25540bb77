//! OCR provider seam
//!
//! Text detection is delegated to an external vision service. Handlers
//! only see the [`OcrProvider`] trait, so tests can swap in a fake.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_VISION_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR request failed: {0}")]
    Request(String),

    #[error("OCR provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Malformed OCR response: {0}")]
    Response(String),
}

/// Something that can read the text off an image
#[async_trait]
pub trait OcrProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Full detected text, or `None` when the image has no readable text
    async fn detect_text(&self, image: &[u8]) -> Result<Option<String>, OcrError>;
}

/// Google Cloud Vision `TEXT_DETECTION`
pub struct GoogleVisionProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GoogleVisionProvider {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: Option<String>,
        timeout: Duration,
    ) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OcrError::Request(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_VISION_ENDPOINT.to_string()),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl OcrProvider for GoogleVisionProvider {
    fn name(&self) -> &str {
        "google-vision"
    }

    async fn detect_text(&self, image: &[u8]) -> Result<Option<String>, OcrError> {
        info!("Running text detection on {} byte image", image.len());

        let body = serde_json::json!({
            "requests": [{
                "image": { "content": STANDARD.encode(image) },
                "features": [{ "type": "TEXT_DETECTION" }]
            }]
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| OcrError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(OcrError::Provider {
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }

        let parsed: AnnotateResponse = resp
            .json()
            .await
            .map_err(|e| OcrError::Response(e.to_string()))?;

        text_from_response(parsed)
    }
}

#[derive(Debug, Default, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    full_text_annotation: Option<FullTextAnnotation>,
    #[serde(default)]
    text_annotations: Vec<EntityAnnotation>,
    error: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct FullTextAnnotation {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct EntityAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

/// Prefer the page-level annotation, fall back to the first entity
fn text_from_response(resp: AnnotateResponse) -> Result<Option<String>, OcrError> {
    let Some(first) = resp.responses.into_iter().next() else {
        debug!("Vision response had no entries");
        return Ok(None);
    };

    if let Some(status) = first.error {
        return Err(OcrError::Provider {
            status: status.code.clamp(0, u16::MAX as i32) as u16,
            message: status.message,
        });
    }

    let text = first
        .full_text_annotation
        .map(|a| a.text)
        .filter(|t| !t.trim().is_empty())
        .or_else(|| {
            first
                .text_annotations
                .into_iter()
                .next()
                .map(|a| a.description)
                .filter(|t| !t.trim().is_empty())
        });

    Ok(text)
}
