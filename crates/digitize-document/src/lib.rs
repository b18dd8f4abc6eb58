// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// digitize-document: Markdown layout and PDF generation for Digitize.
//
// Provides the inline-markup recognizer, the line layout engine and pagination
// controller, glyph metrics, the printpdf page sink, and validation of
// uploaded images. Text set in the built-in PDF fonts goes through `winansi`.

pub mod image;
pub mod layout;
pub mod markup;
pub mod pdf;
pub mod winansi;

// Re-export the primary entry points so callers can use
// `digitize_document::PdfWriter` etc.
pub use self::image::validate::{validate_batch_count, validate_image};
pub use layout::{PageGeometry, PlacementCommand, combine, render};
pub use markup::{LineKind, LinkSpan, classify};
pub use pdf::{FontResource, PdfWriter, render_markdown_to_pdf, render_markdowns_to_pdf};
