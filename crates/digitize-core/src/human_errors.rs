// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Caller-facing error reports.
//
// Every technical error is mapped to a short headline plus optional details,
// an HTTP status, and the pipeline stage so clients can tell configuration
// problems apart from bad input.

use serde::Serialize;

use crate::error::{DigitizeError, Stage};

/// A caller-facing error report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanError {
    /// Short headline (the `error` field of the JSON body).
    pub message: String,
    /// Underlying cause, if any (the `details` field).
    pub details: Option<String>,
    /// HTTP status code to answer with.
    pub status: u16,
    /// Stage that failed.
    pub stage: Stage,
}

/// Wire shape of an error response: `{"error": ..., "details": ...}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl HumanError {
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.message.clone(),
            details: self.details.clone(),
        }
    }
}

/// Convert a `DigitizeError` into a report a client can display.
pub fn humanize_error(err: &DigitizeError) -> HumanError {
    match err {
        DigitizeError::Batch {
            position,
            filename,
            source,
        } => humanize_batch_error(*position, filename, source),

        DigitizeError::InvalidFileType(_) => validation(
            "Invalid file type. Only JPEG, PNG, GIF, and WebP images are allowed",
            None,
        ),

        DigitizeError::FileTooLarge { limit, .. } => validation(
            &format!("File size too large. Maximum size is {} MB", limit >> 20),
            None,
        ),

        DigitizeError::NotAnImage(detected) => validation(
            &format!("File is not a valid image. Detected type: {detected}"),
            None,
        ),

        DigitizeError::MissingField(field) => validation(
            "No image file provided",
            Some(format!("missing form field `{field}`")),
        ),

        DigitizeError::EmptyBatch => validation("No images provided", None),

        DigitizeError::TooManyFiles { limit, .. } => validation(
            &format!("Too many images. Maximum is {limit} images per request"),
            None,
        ),

        DigitizeError::MalformedUpload(detail) => {
            validation("Failed to parse form data", Some(detail.clone()))
        }

        DigitizeError::RequestTooLarge { limit } => HumanError {
            message: "Request too large".into(),
            details: Some(format!("request bodies are limited to {} MB", limit >> 20)),
            status: 413,
            stage: Stage::Validation,
        },

        DigitizeError::MissingCredentials
        | DigitizeError::OcrTransport(_)
        | DigitizeError::OcrStatus { .. }
        | DigitizeError::OcrResponse(_)
        | DigitizeError::OcrApi(_)
        | DigitizeError::NoOcrPages
        | DigitizeError::EmptyOcrText => HumanError {
            message: "Failed to process image with OCR".into(),
            details: Some(err.to_string()),
            status: 500,
            stage: Stage::Ocr,
        },

        DigitizeError::FontLoad(_) | DigitizeError::Measure(_) | DigitizeError::Output(_) => {
            HumanError {
                message: "Failed to generate PDF".into(),
                details: Some(err.to_string()),
                status: 500,
                stage: Stage::Render,
            }
        }

        DigitizeError::Config(_)
        | DigitizeError::Server(_)
        | DigitizeError::Io(_)
        | DigitizeError::Serialization(_) => HumanError {
            message: "Internal server error".into(),
            details: Some(err.to_string()),
            status: 500,
            stage: Stage::Internal,
        },
    }
}

fn validation(message: &str, details: Option<String>) -> HumanError {
    HumanError {
        message: message.to_string(),
        details,
        status: 400,
        stage: Stage::Validation,
    }
}

/// Batch failures name the offending image in the headline.
fn humanize_batch_error(position: usize, filename: &str, source: &DigitizeError) -> HumanError {
    let inner = humanize_error(source);
    let message = match source {
        DigitizeError::InvalidFileType(_) => format!(
            "Invalid file type for image {position} ({filename}). Only JPEG, PNG, GIF, and WebP images are allowed"
        ),
        DigitizeError::FileTooLarge { limit, .. } => format!(
            "File size too large for image {position} ({filename}). Maximum size is {} MB per image",
            limit >> 20
        ),
        DigitizeError::NotAnImage(detected) => format!(
            "File {position} ({filename}) is not a valid image. Detected type: {detected}"
        ),
        _ if inner.stage == Stage::Ocr => {
            format!("Failed to process image {position} ({filename}) with OCR")
        }
        _ => format!("{} (image {position}, {filename})", inner.message),
    };
    HumanError { message, ..inner }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        let human = humanize_error(&DigitizeError::InvalidFileType("doc.pdf".into()));
        assert_eq!(human.status, 400);
        assert_eq!(human.stage, Stage::Validation);
        assert!(human.details.is_none());
    }

    #[test]
    fn ocr_errors_keep_cause_in_details() {
        let err = DigitizeError::OcrStatus {
            status: 401,
            body: "unauthorized".into(),
        };
        let human = humanize_error(&err);
        assert_eq!(human.status, 500);
        assert_eq!(human.stage, Stage::Ocr);
        assert_eq!(human.message, "Failed to process image with OCR");
        assert!(human.details.unwrap().contains("401"));
    }

    #[test]
    fn render_errors_are_distinct_from_ocr_errors() {
        let human = humanize_error(&DigitizeError::FontLoad("no such file".into()));
        assert_eq!(human.stage, Stage::Render);
        assert_eq!(human.message, "Failed to generate PDF");
        assert!(human.details.unwrap().starts_with("failed to add font"));
    }

    #[test]
    fn batch_errors_name_the_image() {
        let err = DigitizeError::InvalidFileType("notes.txt".into()).in_batch(2, "notes.txt");
        let human = humanize_error(&err);
        assert_eq!(human.status, 400);
        assert!(human.message.starts_with("Invalid file type for image 2 (notes.txt)"));

        let err = DigitizeError::EmptyOcrText.in_batch(4, "page.jpg");
        let human = humanize_error(&err);
        assert_eq!(human.message, "Failed to process image 4 (page.jpg) with OCR");
        assert_eq!(human.status, 500);
    }

    #[test]
    fn body_omits_missing_details() {
        let json = serde_json::to_string(&humanize_error(&DigitizeError::EmptyBatch).body())
            .unwrap();
        assert_eq!(json, r#"{"error":"No images provided"}"#);
    }
}
