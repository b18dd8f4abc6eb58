// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// digitize-ocr: turns image bytes into Markdown via a remote OCR service.
//
// The rest of the system only sees the `OcrService` trait; `MistralOcrClient`
// is the production implementation.

pub mod mistral;
pub mod service;
pub mod wire;

pub use mistral::MistralOcrClient;
pub use service::OcrService;
