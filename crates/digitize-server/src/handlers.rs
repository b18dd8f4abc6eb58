// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Endpoint handlers: upload validation, OCR, and PDF rendering.

use std::sync::Arc;

use digitize_core::config::UploadLimits;
use digitize_core::error::{DigitizeError, Result};
use digitize_document::PdfWriter;
use digitize_document::image::validate::{validate_batch_count, validate_image};
use digitize_ocr::OcrService;
use tracing::{debug, info, instrument};

use crate::http::{HttpRequest, HttpResponse};
use crate::multipart::{self, Part};
use crate::routes::{self, Route};

/// Form field of the single-image endpoint.
pub const IMAGE_FIELD: &str = "image";
/// Form field of the batch endpoint.
pub const IMAGES_FIELD: &str = "images";
/// Download name of a batch PDF.
pub const BATCH_FILENAME: &str = "multiple_images.pdf";

/// Everything a handler needs, shared by all connections.
pub struct AppState<O> {
    pub writer: Arc<PdfWriter>,
    pub ocr: O,
    pub limits: UploadLimits,
}

impl<O: OcrService> AppState<O> {
    pub fn new(writer: PdfWriter, ocr: O, limits: UploadLimits) -> Self {
        Self {
            writer: Arc::new(writer),
            ocr,
            limits,
        }
    }
}

/// Route a request and turn any failure into its JSON error response.
pub async fn dispatch<O: OcrService>(state: &AppState<O>, request: &HttpRequest) -> HttpResponse {
    let result = match routes::resolve(&request.method, request.path()) {
        Route::ProcessImage => process_image(state, request).await,
        Route::ProcessMultipleImages => process_multiple_images(state, request).await,
        Route::MethodNotAllowed => return HttpResponse::method_not_allowed(),
        Route::NotFound => return HttpResponse::not_found(),
    };
    result.unwrap_or_else(|e| HttpResponse::from_error(&e))
}

/// One image in, one PDF out, named after the upload.
#[instrument(skip_all)]
pub async fn process_image<O: OcrService>(
    state: &AppState<O>,
    request: &HttpRequest,
) -> Result<HttpResponse> {
    let parts = form_parts(request)?;
    let part = multipart::files(&parts, IMAGE_FIELD)
        .into_iter()
        .next()
        .ok_or_else(|| DigitizeError::MissingField(IMAGE_FIELD.into()))?;
    let filename = part.filename.as_deref().unwrap_or_default();

    validate_image(filename, &part.data, &state.limits)?;
    info!(filename, bytes = part.data.len(), "Processing image");

    let markdown = state.ocr.recognize(&part.data).await?;
    let pdf = render_pdf(&state.writer, vec![markdown]).await?;

    Ok(HttpResponse::pdf(pdf, &format!("{}.pdf", file_stem(filename))))
}

/// Up to the batch limit of images in, one combined PDF out.
///
/// Every upload is validated before the first OCR call so a bad file late in
/// the batch costs no OCR work.
#[instrument(skip_all)]
pub async fn process_multiple_images<O: OcrService>(
    state: &AppState<O>,
    request: &HttpRequest,
) -> Result<HttpResponse> {
    let parts = form_parts(request)?;
    let uploads = multipart::files(&parts, IMAGES_FIELD);
    validate_batch_count(uploads.len(), &state.limits)?;

    for (index, part) in uploads.iter().enumerate() {
        let filename = part.filename.as_deref().unwrap_or_default();
        validate_image(filename, &part.data, &state.limits)
            .map_err(|e| e.in_batch(index + 1, filename))?;
    }
    info!(count = uploads.len(), "Processing image batch");

    let mut documents = Vec::with_capacity(uploads.len());
    for (index, part) in uploads.iter().enumerate() {
        let filename = part.filename.as_deref().unwrap_or_default();
        let markdown = state
            .ocr
            .recognize(&part.data)
            .await
            .map_err(|e| e.in_batch(index + 1, filename))?;
        debug!(position = index + 1, markdown_len = markdown.len(), "Image recognised");
        documents.push(markdown);
    }

    let pdf = render_pdf(&state.writer, documents).await?;
    Ok(HttpResponse::pdf(pdf, BATCH_FILENAME))
}

fn form_parts(request: &HttpRequest) -> Result<Vec<Part>> {
    let content_type = request.header("content-type").ok_or_else(|| {
        DigitizeError::MalformedUpload("request has no Content-Type".into())
    })?;
    let boundary = multipart::boundary(content_type)?;
    multipart::parse(&request.body, &boundary)
}

/// Layout and PDF serialisation are CPU-bound and run off the async workers.
async fn render_pdf(writer: &Arc<PdfWriter>, documents: Vec<String>) -> Result<Vec<u8>> {
    let writer = Arc::clone(writer);
    tokio::task::spawn_blocking(move || writer.render_markdowns(&documents))
        .await
        .map_err(|e| DigitizeError::Server(format!("render task failed: {e}")))?
}

/// Filename without its final extension.
fn file_stem(filename: &str) -> &str {
    filename
        .rsplit_once('.')
        .map_or(filename, |(stem, _)| stem)
}
