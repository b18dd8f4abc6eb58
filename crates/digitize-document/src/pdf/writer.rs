// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer: renders Markdown text into paginated PDF documents.

use std::path::Path;

use digitize_core::PaperSize;
use digitize_core::error::{DigitizeError, Result};
use tracing::{info, instrument};

use super::fonts::FontResource;
use super::sink::PdfPageSink;
use crate::layout::geometry::PageGeometry;
use crate::layout::metrics::GlyphMetrics;
use crate::layout::paginate::{combine, render};

const DEFAULT_TITLE: &str = "Digitized document";

/// Renders Markdown to PDF bytes.
///
/// Fonts are validated and their metrics built once, when the writer is
/// created; every render after that reuses them.
pub struct PdfWriter {
    fonts: FontResource,
    metrics: Box<dyn GlyphMetrics>,
    geometry: PageGeometry,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: String,
}

impl PdfWriter {
    /// Create a writer on A4 paper.
    pub fn new(fonts: FontResource) -> Result<Self> {
        let metrics = fonts.metrics()?;
        Ok(Self {
            fonts,
            metrics,
            geometry: PageGeometry::a4(),
            title: DEFAULT_TITLE.to_string(),
        })
    }

    /// Set the paper size. Margins and line height stay the same.
    pub fn set_paper_size(&mut self, paper_size: PaperSize) {
        self.geometry = PageGeometry::for_paper(paper_size);
    }

    pub fn set_geometry(&mut self, geometry: PageGeometry) {
        self.geometry = geometry;
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Render one Markdown document.
    #[instrument(skip(self, markdown), fields(markdown_len = markdown.len()))]
    pub fn render_markdown(&self, markdown: &str) -> Result<Vec<u8>> {
        let mut sink = PdfPageSink::new(&self.title, &self.geometry, &self.fonts)?;
        let stats = render(markdown, &self.geometry, self.metrics.as_ref(), &mut sink)?;
        let bytes = sink.finish()?;
        info!(
            lines = stats.lines,
            pages = stats.pages,
            bytes = bytes.len(),
            "Rendered Markdown PDF"
        );
        Ok(bytes)
    }

    /// Render several Markdown documents, in order, into one PDF.
    #[instrument(skip_all, fields(documents = documents.len()))]
    pub fn render_markdowns<S: AsRef<str>>(&self, documents: &[S]) -> Result<Vec<u8>> {
        self.render_markdown(&combine(documents))
    }

    /// Render a Markdown document and write it to `path`.
    pub fn write_markdown_to_file(&self, markdown: &str, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.render_markdown(markdown)?;
        std::fs::write(path.as_ref(), &bytes).map_err(|e| {
            DigitizeError::Output(format!("{}: {e}", path.as_ref().display()))
        })?;
        info!("Wrote Markdown PDF to {}", path.as_ref().display());
        Ok(())
    }
}

/// Render one Markdown document to PDF bytes on A4 paper.
pub fn render_markdown_to_pdf(markdown: &str, fonts: &FontResource) -> Result<Vec<u8>> {
    PdfWriter::new(fonts.clone())?.render_markdown(markdown)
}

/// Render several Markdown documents into one PDF on A4 paper.
pub fn render_markdowns_to_pdf<S: AsRef<str>>(
    documents: &[S],
    fonts: &FontResource,
) -> Result<Vec<u8>> {
    PdfWriter::new(fonts.clone())?.render_markdowns(documents)
}
