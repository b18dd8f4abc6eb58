// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Async client for the Mistral OCR endpoint.

use std::future::Future;
use std::time::Duration;

use digitize_core::config::OcrSettings;
use digitize_core::error::{DigitizeError, Result};
use tracing::{debug, error, info, instrument};

use crate::service::OcrService;
use crate::wire::{OcrRequest, OcrResponse};

/// Sends images to the OCR endpoint and returns the recognised Markdown.
///
/// One HTTP client (and its connection pool) is shared by every request.
pub struct MistralOcrClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl MistralOcrClient {
    /// Build a client from settings. A missing API key is not an error here;
    /// every recognition attempt reports it instead, so the service can start
    /// and answer validation errors without credentials.
    pub fn new(settings: &OcrSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| DigitizeError::Config(format!("cannot build OCR HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone().filter(|k| !k.is_empty()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    #[instrument(skip(self, image), fields(endpoint = %self.endpoint, image_len = image.len()))]
    async fn request_markdown(&self, image: &[u8]) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or(DigitizeError::MissingCredentials)?;

        let body = OcrRequest::for_image(&self.model, image);
        debug!(model = %self.model, "sending OCR request");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DigitizeError::OcrTransport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| DigitizeError::OcrTransport(format!("reading response body: {e}")))?;

        if status != reqwest::StatusCode::OK {
            error!(status = status.as_u16(), "OCR request rejected");
            return Err(DigitizeError::OcrStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let parsed = OcrResponse::parse(&bytes)?;
        let pages = parsed.pages.len();
        let markdown = parsed.into_markdown()?;
        info!(pages, markdown_len = markdown.len(), "OCR complete");
        Ok(markdown)
    }
}

impl OcrService for MistralOcrClient {
    fn recognize(&self, image: &[u8]) -> impl Future<Output = Result<String>> + Send {
        self.request_markdown(image)
    }
}
