// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// digitize-server: the HTTP upload service: multipart images in, OCR via an
// `OcrService`, paginated PDFs out.

pub mod handlers;
pub mod http;
pub mod multipart;
pub mod routes;
pub mod server;

pub use handlers::AppState;
pub use server::{DigitizeServer, ServerStatus};
