// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Upload validation: extension, size, batch count, and content sniffing.
//
// Checks run cheapest first so that a bad upload is rejected before any bytes
// are inspected.

use digitize_core::ImageKind;
use digitize_core::config::UploadLimits;
use digitize_core::error::{DigitizeError, Result};
use image::ImageFormat;
use tracing::{debug, instrument, warn};

/// An upload that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedImage {
    /// Kind claimed by the filename.
    pub kind: ImageKind,
    /// MIME type detected from the leading bytes.
    pub detected_mime: &'static str,
}

/// Validate one uploaded file.
#[instrument(skip(data, limits), fields(data_len = data.len()))]
pub fn validate_image(filename: &str, data: &[u8], limits: &UploadLimits) -> Result<ValidatedImage> {
    let kind = ImageKind::from_filename(filename).ok_or_else(|| {
        warn!("Rejected upload with unsupported extension");
        DigitizeError::InvalidFileType(filename.to_string())
    })?;

    let size = data.len() as u64;
    if size > limits.max_file_bytes {
        warn!(size, limit = limits.max_file_bytes, "Rejected oversized upload");
        return Err(DigitizeError::FileTooLarge {
            size,
            limit: limits.max_file_bytes,
        });
    }

    let detected_mime = sniff_mime(data);
    if !detected_mime.starts_with("image/") {
        warn!(detected = detected_mime, "Upload content is not an image");
        return Err(DigitizeError::NotAnImage(detected_mime.to_string()));
    }

    debug!(?kind, detected_mime, "Upload accepted");
    Ok(ValidatedImage {
        kind,
        detected_mime,
    })
}

/// Check the number of files in a batch request.
pub fn validate_batch_count(count: usize, limits: &UploadLimits) -> Result<()> {
    if count == 0 {
        return Err(DigitizeError::EmptyBatch);
    }
    if count > limits.max_batch_files {
        return Err(DigitizeError::TooManyFiles {
            count,
            limit: limits.max_batch_files,
        });
    }
    Ok(())
}

/// Best-effort MIME type from magic bytes.
///
/// Only PNG, JPEG, GIF, WebP, BMP and ICO signatures count as images. Weaker
/// magics (the two-byte PNM headers, for one) also start ordinary text, so
/// they are ignored. Anything else is reported as `text/plain` when it is
/// valid UTF-8 and `application/octet-stream` otherwise.
pub fn sniff_mime(data: &[u8]) -> &'static str {
    match image::guess_format(data).ok().and_then(format_mime) {
        Some(mime) => mime,
        None if data.is_empty() => "application/octet-stream",
        None if std::str::from_utf8(data).is_ok() => "text/plain",
        None => "application/octet-stream",
    }
}

fn format_mime(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Bmp => Some("image/bmp"),
        ImageFormat::Ico => Some("image/x-icon"),
        _ => None,
    }
}
