// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JSON request and response bodies of the OCR endpoint.

use base64::Engine;
use digitize_core::error::{DigitizeError, Result};
use serde::{Deserialize, Serialize};

/// Separator placed between the Markdown of consecutive OCR pages.
pub const PAGE_SEPARATOR: &str = "\n\n";

#[derive(Debug, Serialize)]
pub struct OcrRequest<'a> {
    pub model: &'a str,
    pub document: DocumentRef,
}

/// Inline document reference: the image travels as a base64 data URL.
#[derive(Debug, Serialize)]
pub struct DocumentRef {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub image_url: String,
}

impl<'a> OcrRequest<'a> {
    /// Every upload is labelled `image/jpeg`; the service sniffs the real
    /// format itself.
    pub fn for_image(model: &'a str, image: &[u8]) -> Self {
        let payload = base64::engine::general_purpose::STANDARD.encode(image);
        Self {
            model,
            document: DocumentRef {
                kind: "image_url",
                image_url: format!("data:image/jpeg;base64,{payload}"),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OcrResponse {
    #[serde(default)]
    pub pages: Vec<OcrPage>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct OcrPage {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub markdown: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl OcrResponse {
    /// Parse a success-status body.
    pub fn parse(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| DigitizeError::OcrResponse(e.to_string()))
    }

    /// The recognised Markdown, pages in response order.
    pub fn into_markdown(self) -> Result<String> {
        if let Some(error) = self.error {
            return Err(DigitizeError::OcrApi(error.message));
        }
        if self.pages.is_empty() {
            return Err(DigitizeError::NoOcrPages);
        }

        let markdown = self
            .pages
            .iter()
            .map(|p| p.markdown.as_str())
            .collect::<Vec<_>>()
            .join(PAGE_SEPARATOR);

        if markdown.is_empty() {
            return Err(DigitizeError::EmptyOcrText);
        }
        Ok(markdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_shape() {
        let request = OcrRequest::for_image("mistral-ocr-2505", b"abc");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "mistral-ocr-2505",
                "document": {
                    "type": "image_url",
                    "image_url": "data:image/jpeg;base64,YWJj"
                }
            })
        );
    }

    #[test]
    fn pages_are_joined_in_order() {
        let response = OcrResponse::parse(
            br##"{"pages":[{"index":0,"markdown":"# One"},{"index":1,"markdown":"two"}],"model":"m"}"##,
        )
        .unwrap();
        assert_eq!(response.into_markdown().unwrap(), "# One\n\ntwo");
    }

    #[test]
    fn api_error_wins_over_pages() {
        let response = OcrResponse::parse(
            br#"{"pages":[{"markdown":"x"}],"error":{"message":"quota exceeded","type":"rate_limit"}}"#,
        )
        .unwrap();
        match response.into_markdown().unwrap_err() {
            DigitizeError::OcrApi(message) => assert_eq!(message, "quota exceeded"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn no_pages() {
        let response = OcrResponse::parse(br#"{"pages":[]}"#).unwrap();
        assert!(matches!(
            response.into_markdown(),
            Err(DigitizeError::NoOcrPages)
        ));
    }

    #[test]
    fn only_empty_pages() {
        let response = OcrResponse::parse(br#"{"pages":[{"markdown":""}]}"#).unwrap();
        assert!(matches!(
            response.into_markdown(),
            Err(DigitizeError::EmptyOcrText)
        ));
    }

    #[test]
    fn garbage_body() {
        assert!(matches!(
            OcrResponse::parse(b"<html>"),
            Err(DigitizeError::OcrResponse(_))
        ));
    }
}
