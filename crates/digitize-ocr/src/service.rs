// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The OCR boundary.

use std::future::Future;

use digitize_core::error::Result;

/// Recognises the text in an image and returns it as Markdown.
pub trait OcrService: Send + Sync {
    fn recognize(&self, image: &[u8]) -> impl Future<Output = Result<String>> + Send;
}
