// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Glyph-metrics providers: rendered text widths for the layout engine.

use std::collections::HashMap;
use std::sync::Arc;

use digitize_core::error::{DigitizeError, Result};
use ttf_parser::Face;

use super::command::{FontSpec, FontStyle};
use crate::winansi;

/// Measures the rendered width of a string.
///
/// Implementations are immutable once built and may be shared between
/// concurrent renders.
pub trait GlyphMetrics: Send + Sync {
    /// Width of `text` in points when set in `font`.
    fn text_width(&self, font: &FontSpec, text: &str) -> Result<f32>;
}

/// Every character advances by the same fraction of an em.
///
/// Exact for the PDF base-14 Courier faces (600/1000 em). Text is measured
/// as the WinAnsi bytes those faces draw, so a character they cannot show is
/// a measurement error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    pub advance_em: f32,
}

impl MonospaceMetrics {
    pub fn courier() -> Self {
        Self { advance_em: 0.6 }
    }
}

impl GlyphMetrics for MonospaceMetrics {
    fn text_width(&self, font: &FontSpec, text: &str) -> Result<f32> {
        let glyphs = winansi::encode(text)?.len();
        Ok(glyphs as f32 * self.advance_em * font.size)
    }
}

/// Advance widths of one face, keyed by character.
#[derive(Debug, Clone)]
struct FaceAdvances {
    units_per_em: f32,
    advances: HashMap<char, u16>,
}

impl FaceAdvances {
    fn from_face(face: &Face<'_>) -> Result<Self> {
        let units_per_em = f32::from(face.units_per_em());
        if units_per_em <= 0.0 {
            return Err(DigitizeError::FontLoad("font has zero units per em".into()));
        }

        let mut advances = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|code_point| {
                    let Some(ch) = char::from_u32(code_point) else {
                        return;
                    };
                    if advances.contains_key(&ch) {
                        return;
                    }
                    // Glyph 0 is .notdef.
                    let glyph = match face.glyph_index(ch) {
                        Some(glyph) if glyph.0 != 0 => glyph,
                        _ => return,
                    };
                    if let Some(advance) = face.glyph_hor_advance(glyph) {
                        advances.insert(ch, advance);
                    }
                });
            }
        }

        Ok(Self {
            units_per_em,
            advances,
        })
    }

    fn text_width(&self, size: f32, text: &str) -> Result<f32> {
        let mut total: u32 = 0;
        for ch in text.chars() {
            let advance = self.advances.get(&ch).ok_or_else(|| {
                DigitizeError::Measure(format!(
                    "{ch:?} (U+{:04X}) has no glyph in the font",
                    u32::from(ch)
                ))
            })?;
            total += u32::from(*advance);
        }
        Ok(total as f32 * size / self.units_per_em)
    }
}

/// Horizontal advances read from TrueType/OpenType `hmtx` tables.
///
/// The faces are parsed once, on construction; measuring afterwards is a
/// table lookup per character.
#[derive(Debug, Clone)]
pub struct TrueTypeMetrics {
    regular: FaceAdvances,
    /// `None` when headings reuse the regular face.
    bold: Option<FaceAdvances>,
}

impl TrueTypeMetrics {
    pub fn new(regular: Arc<[u8]>, bold: Option<Arc<[u8]>>) -> Result<Self> {
        let regular = parse_face("regular", &regular)?;
        let bold = bold.map(|data| parse_face("bold", &data)).transpose()?;
        Ok(Self { regular, bold })
    }

    fn face(&self, style: FontStyle) -> &FaceAdvances {
        match (style, &self.bold) {
            (FontStyle::Bold, Some(bold)) => bold,
            _ => &self.regular,
        }
    }
}

fn parse_face(name: &str, data: &[u8]) -> Result<FaceAdvances> {
    let face =
        Face::parse(data, 0).map_err(|e| DigitizeError::FontLoad(format!("{name} face: {e}")))?;
    FaceAdvances::from_face(&face)
}

impl GlyphMetrics for TrueTypeMetrics {
    fn text_width(&self, font: &FontSpec, text: &str) -> Result<f32> {
        self.face(font.style).text_width(font.size, text)
    }
}
