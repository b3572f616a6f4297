//! Text extraction from images (OCR collaborator).
//!
//! Failures are not errors here: any problem reaching or parsing the OCR
//! service yields `None`, which callers treat as "no text to check".

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::config::OcrConfig;

/// Image handed to a [`TextExtractor`].
#[derive(Debug, Clone)]
pub enum ImageInput {
    /// Publicly fetchable image URL.
    Url {
        url: String,
        language: Option<String>,
    },
    /// Uploaded image bytes.
    Bytes {
        data: Vec<u8>,
        file_name: String,
        language: Option<String>,
    },
}

impl ImageInput {
    pub fn language(&self) -> Option<&str> {
        match self {
            Self::Url { language, .. } | Self::Bytes { language, .. } => language.as_deref(),
        }
    }
}

/// Capability `extract(image) -> text | failure`.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, image: &ImageInput) -> Option<String>;
}

#[derive(Deserialize)]
struct OcrResponse {
    #[serde(rename = "ParsedResults", default)]
    parsed_results: Vec<OcrParsedResult>,
    #[serde(rename = "IsErroredOnProcessing", default)]
    is_errored: bool,
    #[serde(rename = "ErrorMessage", default)]
    error_message: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct OcrParsedResult {
    #[serde(rename = "ParsedText", default)]
    parsed_text: Option<String>,
}

/// OCR.space-compatible extractor (`POST` multipart form).
pub struct OcrSpaceExtractor {
    client: Client,
    config: OcrConfig,
}

impl OcrSpaceExtractor {
    pub fn new(config: OcrConfig, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    fn form(&self, image: &ImageInput) -> Form {
        let language = image
            .language()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(&self.config.language)
            .to_string();
        let form = Form::new()
            .text("apikey", self.config.api_key.clone())
            .text("language", language)
            .text("isOverlayRequired", "false");
        match image {
            ImageInput::Url { url, .. } => form.text("url", url.clone()),
            ImageInput::Bytes {
                data, file_name, ..
            } => form.part(
                "file",
                Part::bytes(data.clone()).file_name(file_name.clone()),
            ),
        }
    }
}

#[async_trait]
impl TextExtractor for OcrSpaceExtractor {
    async fn extract(&self, image: &ImageInput) -> Option<String> {
        let started = Instant::now();
        let resp = match self
            .client
            .post(&self.config.url)
            .multipart(self.form(image))
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(error) => {
                tracing::warn!(
                    event = "factcheck.ocr.request_failed",
                    url = %self.config.url,
                    elapsed_ms = started.elapsed().as_millis(),
                    error = %error,
                    "ocr request failed"
                );
                return None;
            }
        };
        if !resp.status().is_success() {
            tracing::warn!(
                event = "factcheck.ocr.non_success_status",
                status = %resp.status(),
                elapsed_ms = started.elapsed().as_millis(),
                "ocr service returned non-success status"
            );
            return None;
        }
        let parsed: OcrResponse = match resp.json().await {
            Ok(parsed) => parsed,
            Err(error) => {
                tracing::warn!(
                    event = "factcheck.ocr.decode_failed",
                    error = %error,
                    "ocr response could not be decoded"
                );
                return None;
            }
        };
        if parsed.is_errored {
            tracing::warn!(
                event = "factcheck.ocr.processing_error",
                error = ?parsed.error_message,
                "ocr service reported a processing error"
            );
        }
        let text = parsed
            .parsed_results
            .into_iter()
            .next()
            .and_then(|result| result.parsed_text)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        tracing::debug!(
            event = "factcheck.ocr.completed",
            elapsed_ms = started.elapsed().as_millis(),
            chars = text.as_ref().map_or(0, |value| value.chars().count()),
            "ocr extraction finished"
        );
        text
    }
}
