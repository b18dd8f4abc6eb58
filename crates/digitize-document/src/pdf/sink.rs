// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF page sink: translates placement commands into `printpdf` 0.8 page
// operations.
//
// printpdf 0.8 is data-oriented: each page is a `PdfPage` holding a `Vec<Op>`,
// and the document is serialised once at the end via `PdfDocument::save()`.
// Layout coordinates are top-left based; PDF user space is bottom-left based,
// so every y is flipped against the page height here.
//
// printpdf writes built-in font text as UTF-8 bytes under a WinAnsi font
// dictionary, so built-in text is encoded here and shown with a raw `Tj`.

use digitize_core::error::{DigitizeError, Result};
use digitize_core::pt_to_mm;
use printpdf::{
    Actions, BuiltinFont, DictItem, FontId, LinkAnnotation, Mm, Op, ParsedFont, PdfDocument,
    PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, Rect, TextItem,
};
use tracing::{debug, warn};

use super::fonts::FontResource;
use crate::layout::command::{FontSpec, FontStyle, PlacementCommand};
use crate::layout::geometry::PageGeometry;
use crate::layout::sink::PageSink;
use crate::winansi;

/// Fonts registered with the document.
enum FaceSet {
    Builtin,
    Embedded { regular: FontId, bold: FontId },
}

/// Builds a PDF from placement commands.
pub struct PdfPageSink {
    doc: PdfDocument,
    faces: FaceSet,
    page_width: Mm,
    page_height: Mm,
    /// Page height in points, for flipping y.
    flip_height: f32,
    finished_pages: Vec<PdfPage>,
    /// Operations of the page being written; `None` before the first page.
    current: Option<Vec<Op>>,
    font: FontSpec,
    position: (f32, f32),
}

impl PdfPageSink {
    /// Create an empty document and register its fonts.
    pub fn new(title: &str, geometry: &PageGeometry, fonts: &FontResource) -> Result<Self> {
        let mut doc = PdfDocument::new(title);

        let faces = match fonts {
            FontResource::Builtin => FaceSet::Builtin,
            FontResource::Embedded { regular, bold } => {
                let regular_id = register_font(&mut doc, regular, "regular")?;
                let bold_id = match bold {
                    Some(bytes) => register_font(&mut doc, bytes, "bold")?,
                    None => regular_id.clone(),
                };
                FaceSet::Embedded {
                    regular: regular_id,
                    bold: bold_id,
                }
            }
        };

        Ok(Self {
            doc,
            faces,
            page_width: Mm(pt_to_mm(geometry.page_width)),
            page_height: Mm(pt_to_mm(geometry.page_height)),
            flip_height: geometry.page_height,
            finished_pages: Vec::new(),
            current: None,
            font: FontSpec::body(),
            position: (geometry.margin_x, geometry.top_margin),
        })
    }

    /// Pages started so far.
    pub fn page_count(&self) -> usize {
        self.finished_pages.len() + usize::from(self.current.is_some())
    }

    /// Serialise the document.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        self.close_page();
        if self.finished_pages.is_empty() {
            return Err(DigitizeError::Output("document has no pages".into()));
        }

        let page_count = self.finished_pages.len();
        self.doc.with_pages(self.finished_pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        // Raw operators are only written when the save is not `secure`.
        let options = PdfSaveOptions {
            secure: false,
            ..PdfSaveOptions::default()
        };
        let bytes = self.doc.save(&options, &mut warnings);
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "PDF serialisation produced warnings");
        }
        if bytes.is_empty() {
            return Err(DigitizeError::Output("PDF serialisation produced no bytes".into()));
        }

        debug!(pages = page_count, bytes = bytes.len(), "PDF serialised");
        Ok(bytes)
    }

    fn close_page(&mut self) {
        if let Some(ops) = self.current.take() {
            self.finished_pages
                .push(PdfPage::new(self.page_width, self.page_height, ops));
        }
    }

    fn ops(&mut self) -> Result<&mut Vec<Op>> {
        self.current
            .as_mut()
            .ok_or_else(|| DigitizeError::Output("command issued before the first page".into()))
    }

    fn draw_text(&mut self, text: &str) -> Result<()> {
        let (x, y) = self.position;
        let pos = Point {
            x: Pt(x),
            y: Pt(self.flip_height - y),
        };
        let size = Pt(self.font.size);

        let text_ops = match &self.faces {
            FaceSet::Builtin => {
                let font = builtin_face(self.font.style);
                let encoded = winansi::encode(text)?;
                vec![
                    Op::SetFontSizeBuiltinFont { size, font },
                    // Empty: only puts the font in the page resources.
                    Op::WriteTextBuiltinFont {
                        items: Vec::new(),
                        font,
                    },
                    Op::Unknown {
                        key: "Tj".to_string(),
                        value: vec![DictItem::String {
                            data: encoded,
                            literal: false,
                        }],
                    },
                ]
            }
            FaceSet::Embedded { regular, bold } => {
                let font = match self.font.style {
                    FontStyle::Regular => regular.clone(),
                    FontStyle::Bold => bold.clone(),
                };
                vec![
                    Op::SetFontSize {
                        size,
                        font: font.clone(),
                    },
                    Op::WriteText {
                        items: vec![TextItem::Text(text.to_string())],
                        font,
                    },
                ]
            }
        };

        let ops = self.ops()?;
        ops.push(Op::StartTextSection);
        ops.push(Op::SetTextCursor { pos });
        ops.extend(text_ops);
        ops.push(Op::EndTextSection);
        Ok(())
    }

    fn add_link(&mut self, url: &str, x: f32, y: f32, width: f32, height: f32) -> Result<()> {
        // Rect wants the lower-left corner in PDF space.
        let rect = Rect {
            x: Pt(x),
            y: Pt(self.flip_height - y - height),
            width: Pt(width),
            height: Pt(height),
        };
        let link = LinkAnnotation::new(rect, Actions::Uri(url.to_string()), None, None, None);
        self.ops()?.push(Op::LinkAnnotation { link });
        Ok(())
    }
}

impl PageSink for PdfPageSink {
    fn new_page(&mut self) -> Result<()> {
        self.close_page();
        self.current = Some(Vec::new());
        Ok(())
    }

    fn emit(&mut self, command: &PlacementCommand) -> Result<()> {
        match command {
            PlacementCommand::SetFont(spec) => {
                self.font = *spec;
                Ok(())
            }
            PlacementCommand::MoveCursor { x, y } => {
                self.position = (*x, *y);
                Ok(())
            }
            PlacementCommand::DrawText(text) => self.draw_text(text),
            PlacementCommand::AddLinkRegion {
                url,
                x,
                y,
                width,
                height,
            } => self.add_link(url, *x, *y, *width, *height),
            PlacementCommand::NewPage => self.new_page(),
        }
    }
}

fn register_font(doc: &mut PdfDocument, bytes: &[u8], face: &str) -> Result<FontId> {
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let parsed = ParsedFont::from_bytes(bytes, 0, &mut warnings)
        .ok_or_else(|| DigitizeError::FontLoad(format!("{face} face could not be parsed")))?;
    Ok(doc.add_font(&parsed))
}

fn builtin_face(style: FontStyle) -> BuiltinFont {
    match style {
        FontStyle::Regular => BuiltinFont::Courier,
        FontStyle::Bold => BuiltinFont::CourierBold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_before_first_page_is_an_output_error() {
        let mut sink =
            PdfPageSink::new("t", &PageGeometry::a4(), &FontResource::Builtin).unwrap();
        let err = sink
            .emit(&PlacementCommand::DrawText("early".into()))
            .unwrap_err();
        assert!(err.to_string().starts_with("failed to write output"));
    }

    #[test]
    fn finishing_without_pages_fails() {
        let sink = PdfPageSink::new("t", &PageGeometry::a4(), &FontResource::Builtin).unwrap();
        assert!(sink.finish().is_err());
    }

    #[test]
    fn page_count_tracks_new_pages() {
        let mut sink =
            PdfPageSink::new("t", &PageGeometry::a4(), &FontResource::Builtin).unwrap();
        assert_eq!(sink.page_count(), 0);
        sink.new_page().unwrap();
        sink.emit(&PlacementCommand::DrawText("one".into())).unwrap();
        sink.new_page().unwrap();
        assert_eq!(sink.page_count(), 2);
        let bytes = sink.finish().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn unparseable_embedded_font_fails() {
        let fonts = FontResource::Embedded {
            regular: std::sync::Arc::from(&b"nope"[..]),
            bold: None,
        };
        let err = PdfPageSink::new("t", &PageGeometry::a4(), &fonts).err().unwrap();
        assert!(matches!(err, DigitizeError::FontLoad(_)));
    }
}
