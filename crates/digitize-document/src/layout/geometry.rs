// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page geometry and the layout cursor.
//
// All values are PDF points with the origin at the top-left corner of the
// page and y growing downward. The cursor's y is a text baseline.

use digitize_core::PaperSize;

/// Fixed page metrics for one document render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    /// Left (and right) text margin.
    pub margin_x: f32,
    /// Baseline of the first line on every page.
    pub top_margin: f32,
    pub bottom_margin: f32,
    pub line_height: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageGeometry {
    /// A4 portrait with the standard margins.
    pub fn a4() -> Self {
        Self {
            page_width: 595.0,
            page_height: 842.0,
            margin_x: 30.0,
            top_margin: 40.0,
            bottom_margin: 50.0,
            line_height: 20.0,
        }
    }

    /// Standard margins on the given paper size.
    pub fn for_paper(paper: PaperSize) -> Self {
        let (page_width, page_height) = paper.dimensions_pt();
        Self {
            page_width,
            page_height,
            ..Self::a4()
        }
    }

    /// Widest run of text that fits between the side margins.
    pub fn max_text_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin_x
    }

    /// Lowest baseline a draw may start at without a page break.
    pub fn break_threshold(&self) -> f32 {
        self.page_height - self.bottom_margin
    }

    /// Where text starts on a fresh page.
    pub fn origin(&self) -> Cursor {
        Cursor {
            x: self.margin_x,
            y: self.top_margin,
        }
    }
}

/// Current write position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub x: f32,
    pub y: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_defaults() {
        let g = PageGeometry::a4();
        assert_eq!(g.max_text_width(), 535.0);
        assert_eq!(g.break_threshold(), 792.0);
        assert_eq!(g.origin(), Cursor { x: 30.0, y: 40.0 });
    }

    #[test]
    fn letter_keeps_margins() {
        let g = PageGeometry::for_paper(PaperSize::Letter);
        assert_eq!(g.page_width, 612.0);
        assert_eq!(g.margin_x, 30.0);
        assert_eq!(g.line_height, 20.0);
    }
}
