// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: font resources, the printpdf page sink, and the writer that
// renders Markdown into PDF bytes.

pub mod fonts;
pub mod sink;
pub mod writer;

pub use fonts::FontResource;
pub use sink::PdfPageSink;
pub use writer::{PdfWriter, render_markdown_to_pdf, render_markdowns_to_pdf};
