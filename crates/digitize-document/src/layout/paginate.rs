// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pagination controller: folds the line layout engine over a whole document
// and forwards its commands to a page sink.

use digitize_core::error::Result;
use tracing::{debug, instrument};

use super::command::{FontSpec, PlacementCommand};
use super::engine::layout_line;
use super::geometry::PageGeometry;
use super::metrics::GlyphMetrics;
use super::sink::PageSink;
use crate::markup::{classify, split_lines};

/// Separator placed between documents by [`combine`].
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

/// Summary of a finished render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    pub lines: usize,
    pub pages: usize,
}

/// Lay out `markdown` onto `sink`.
///
/// The sink is told about the first page before anything else and receives
/// the body font before the first line. A failing metrics provider or sink
/// aborts the render; whatever the sink holds at that point is not a valid
/// document.
#[instrument(skip_all, fields(markdown_len = markdown.len()))]
pub fn render(
    markdown: &str,
    geometry: &PageGeometry,
    metrics: &dyn GlyphMetrics,
    sink: &mut dyn PageSink,
) -> Result<RenderStats> {
    sink.new_page()?;
    sink.emit(&PlacementCommand::SetFont(FontSpec::body()))?;

    let mut cursor = geometry.origin();
    let mut pages = 1;
    let lines = split_lines(markdown);

    for raw in &lines {
        let kind = classify(raw);
        let layout = layout_line(&kind, cursor, geometry, metrics)?;
        for command in &layout.commands {
            match command {
                PlacementCommand::NewPage => {
                    sink.new_page()?;
                    pages += 1;
                }
                other => sink.emit(other)?,
            }
        }
        cursor = layout.cursor;
    }

    debug!(lines = lines.len(), pages, "Layout complete");
    Ok(RenderStats {
        lines: lines.len(),
        pages,
    })
}

/// Join several Markdown documents so that each boundary reads as one blank
/// line. Document boundaries never force a page break on their own.
pub fn combine<S: AsRef<str>>(documents: &[S]) -> String {
    documents
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(DOCUMENT_SEPARATOR)
}
