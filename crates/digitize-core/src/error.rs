// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Digitize.

use thiserror::Error;

/// Top-level error type for all Digitize operations.
///
/// Variants are grouped by the stage that produced them: upload validation,
/// the upstream OCR call, and layout/rendering. [`DigitizeError::stage`]
/// recovers the grouping for callers that need to report it.
#[derive(Debug, Error)]
pub enum DigitizeError {
    // -- Upload validation --
    #[error("invalid file type: {0}")]
    InvalidFileType(String),

    #[error("file too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("file is not a valid image; detected type: {0}")]
    NotAnImage(String),

    #[error("missing form field: {0}")]
    MissingField(String),

    #[error("no images provided")]
    EmptyBatch,

    #[error("too many images: {count} exceeds the maximum of {limit}")]
    TooManyFiles { count: usize, limit: usize },

    #[error("malformed upload: {0}")]
    MalformedUpload(String),

    #[error("request body exceeds the {limit} byte limit")]
    RequestTooLarge { limit: usize },

    // -- Upstream OCR --
    #[error("OCR credentials are not configured (set MISTRAL_API_KEY)")]
    MissingCredentials,

    #[error("OCR request failed: {0}")]
    OcrTransport(String),

    #[error("OCR service returned status {status}: {body}")]
    OcrStatus { status: u16, body: String },

    #[error("OCR response could not be parsed: {0}")]
    OcrResponse(String),

    #[error("OCR service error: {0}")]
    OcrApi(String),

    #[error("no pages returned from OCR service")]
    NoOcrPages,

    #[error("no markdown content found in OCR pages")]
    EmptyOcrText,

    // -- Layout / rendering --
    #[error("failed to add font: {0}")]
    FontLoad(String),

    #[error("failed to measure text: {0}")]
    Measure(String),

    #[error("failed to write output: {0}")]
    Output(String),

    // -- Batch context --
    #[error("image {position} ({filename}): {source}")]
    Batch {
        position: usize,
        filename: String,
        #[source]
        source: Box<DigitizeError>,
    },

    // -- Service plumbing --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The pipeline stage an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Rejected before any OCR or rendering was attempted.
    Validation,
    /// The upstream OCR call failed.
    Ocr,
    /// Font loading, text measurement, or PDF output failed.
    Render,
    /// Configuration, I/O, or server plumbing.
    Internal,
}

impl DigitizeError {
    /// Wrap an error with the 1-based position and filename of a batch entry.
    pub fn in_batch(self, position: usize, filename: impl Into<String>) -> Self {
        Self::Batch {
            position,
            filename: filename.into(),
            source: Box::new(self),
        }
    }

    /// The stage that produced this error. Batch wrappers report the stage of
    /// the error they wrap.
    pub fn stage(&self) -> Stage {
        match self {
            Self::InvalidFileType(_)
            | Self::FileTooLarge { .. }
            | Self::NotAnImage(_)
            | Self::MissingField(_)
            | Self::EmptyBatch
            | Self::TooManyFiles { .. }
            | Self::MalformedUpload(_)
            | Self::RequestTooLarge { .. } => Stage::Validation,

            Self::MissingCredentials
            | Self::OcrTransport(_)
            | Self::OcrStatus { .. }
            | Self::OcrResponse(_)
            | Self::OcrApi(_)
            | Self::NoOcrPages
            | Self::EmptyOcrText => Stage::Ocr,

            Self::FontLoad(_) | Self::Measure(_) | Self::Output(_) => Stage::Render,

            Self::Batch { source, .. } => source.stage(),

            Self::Config(_) | Self::Server(_) | Self::Io(_) | Self::Serialization(_) => {
                Stage::Internal
            }
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DigitizeError>;
