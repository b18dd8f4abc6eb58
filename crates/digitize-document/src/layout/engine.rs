// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line layout engine: turns one classified line into placement commands.
//
// The engine is a pure function of (line, cursor, geometry, metrics): it takes
// the cursor by value and hands back the advanced one, so a single line can be
// laid out in isolation from any starting position.

use digitize_core::error::Result;

use super::command::{FontSpec, PlacementCommand};
use super::geometry::{Cursor, PageGeometry};
use super::metrics::GlyphMetrics;
use crate::markup::{LineKind, LinkSpan};

/// Link hit-regions extend this far left and right of the label.
const LINK_PAD_X: f32 = 2.5;
/// Top of a link region, measured up from the baseline.
const LINK_RISE: f32 = 12.0;
const LINK_HEIGHT: f32 = 15.0;

/// Output of laying out one line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineLayout {
    pub commands: Vec<PlacementCommand>,
    pub cursor: Cursor,
}

/// Lay out one classified line starting at `cursor`.
pub fn layout_line(
    line: &LineKind,
    cursor: Cursor,
    geometry: &PageGeometry,
    metrics: &dyn GlyphMetrics,
) -> Result<LineLayout> {
    let mut builder = LineBuilder {
        commands: Vec::new(),
        cursor,
        geometry,
    };

    match line {
        // Blank lines never check for overflow themselves.
        LineKind::Blank => builder.cursor.y += geometry.line_height * 0.5,
        LineKind::Header { level, text } => builder.header(*level, text),
        LineKind::LinkLine { text, spans } => builder.link_line(text, spans, metrics)?,
        LineKind::Plain(text) => builder.plain(text, metrics)?,
    }

    Ok(LineLayout {
        commands: builder.commands,
        cursor: builder.cursor,
    })
}

struct LineBuilder<'g> {
    commands: Vec<PlacementCommand>,
    cursor: Cursor,
    geometry: &'g PageGeometry,
}

impl LineBuilder<'_> {
    /// Break the page if the baseline has moved past the bottom margin.
    fn ensure_room(&mut self) {
        if self.cursor.y > self.geometry.break_threshold() {
            self.commands.push(PlacementCommand::NewPage);
            self.cursor = self.geometry.origin();
        }
    }

    fn draw_at(&mut self, x: f32, text: &str) {
        self.commands.push(PlacementCommand::MoveCursor { x, y: self.cursor.y });
        self.commands.push(PlacementCommand::DrawText(text.to_string()));
    }

    fn header(&mut self, level: u8, text: &str) {
        self.ensure_room();
        self.commands
            .push(PlacementCommand::SetFont(FontSpec::heading(level)));
        self.draw_at(self.geometry.margin_x, text);
        self.cursor.y += self.geometry.line_height * 1.5;
        self.commands.push(PlacementCommand::SetFont(FontSpec::body()));
    }

    fn link_line(
        &mut self,
        text: &str,
        spans: &[LinkSpan],
        metrics: &dyn GlyphMetrics,
    ) -> Result<()> {
        self.ensure_room();
        let body = FontSpec::body();
        let mut x = self.geometry.margin_x;
        let mut consumed = 0;

        for span in spans {
            let before = &text[consumed..span.start];
            if !before.is_empty() {
                self.draw_at(x, before);
                x += metrics.text_width(&body, before)?;
            }

            let width = metrics.text_width(&body, &span.label)?;
            self.draw_at(x, &span.label);
            self.commands.push(PlacementCommand::AddLinkRegion {
                url: span.url.clone(),
                x: x - LINK_PAD_X,
                y: self.cursor.y - LINK_RISE,
                width: width + 2.0 * LINK_PAD_X,
                height: LINK_HEIGHT,
            });
            x += width;
            consumed = span.end;
        }

        // Trailing text is drawn but never measured.
        let trailing = &text[consumed..];
        if !trailing.is_empty() {
            self.draw_at(x, trailing);
        }

        self.cursor.x = self.geometry.margin_x;
        self.cursor.y += self.geometry.line_height;
        Ok(())
    }

    fn plain(&mut self, text: &str, metrics: &dyn GlyphMetrics) -> Result<()> {
        let body = FontSpec::body();
        let max_width = self.geometry.max_text_width();

        if metrics.text_width(&body, text)? <= max_width {
            self.flush(text);
            return Ok(());
        }

        let mut current = String::new();
        for word in text.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };

            if metrics.text_width(&body, &candidate)? > max_width {
                if !current.is_empty() {
                    self.flush(&current);
                }
                // An over-wide word stands alone; it is never split.
                current = word.to_string();
            } else {
                current = candidate;
            }
        }

        if !current.is_empty() {
            self.flush(&current);
        }
        Ok(())
    }

    /// Draw one output line at the left margin and move to the next baseline.
    fn flush(&mut self, text: &str) {
        self.ensure_room();
        self.draw_at(self.geometry.margin_x, text);
        self.cursor.x = self.geometry.margin_x;
        self.cursor.y += self.geometry.line_height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::metrics::MonospaceMetrics;
    use crate::markup::classify;

    /// One point per character, whatever the font.
    struct CharCount;

    impl GlyphMetrics for CharCount {
        fn text_width(&self, _font: &FontSpec, text: &str) -> Result<f32> {
            Ok(text.chars().count() as f32)
        }
    }

    fn drawn_texts(commands: &[PlacementCommand]) -> Vec<&str> {
        commands
            .iter()
            .filter_map(|c| match c {
                PlacementCommand::DrawText(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn blank_advances_half_a_line_without_commands() {
        let g = PageGeometry::a4();
        let start = Cursor { x: 30.0, y: 100.0 };
        let out = layout_line(&LineKind::Blank, start, &g, &CharCount).unwrap();
        assert!(out.commands.is_empty());
        assert_eq!(out.cursor.y, 110.0);
    }

    #[test]
    fn blank_past_threshold_does_not_break() {
        let g = PageGeometry::a4();
        let start = Cursor { x: 30.0, y: 900.0 };
        let out = layout_line(&LineKind::Blank, start, &g, &CharCount).unwrap();
        assert!(out.commands.is_empty());
        assert_eq!(out.cursor.y, 910.0);
    }

    #[test]
    fn header_command_sequence() {
        let g = PageGeometry::a4();
        let out = layout_line(&classify("## Intro"), g.origin(), &g, &CharCount).unwrap();
        assert_eq!(
            out.commands,
            vec![
                PlacementCommand::SetFont(FontSpec::heading(2)),
                PlacementCommand::MoveCursor { x: 30.0, y: 40.0 },
                PlacementCommand::DrawText("Intro".into()),
                PlacementCommand::SetFont(FontSpec::body()),
            ]
        );
        assert_eq!(out.cursor.y, 70.0);
    }

    #[test]
    fn header_past_threshold_breaks_first() {
        let g = PageGeometry::a4();
        let start = Cursor { x: 30.0, y: 800.0 };
        let out = layout_line(&classify("# Late"), start, &g, &CharCount).unwrap();
        assert_eq!(out.commands[0], PlacementCommand::NewPage);
        assert_eq!(
            out.commands[2],
            PlacementCommand::MoveCursor { x: 30.0, y: 40.0 }
        );
        assert_eq!(out.cursor.y, 70.0);
    }

    #[test]
    fn link_region_geometry() {
        let g = PageGeometry::a4();
        let metrics = MonospaceMetrics::courier();
        let out = layout_line(
            &classify("see [site](http://x)"),
            g.origin(),
            &g,
            &metrics,
        )
        .unwrap();

        let see_width = metrics.text_width(&FontSpec::body(), "see ").unwrap();
        let site_width = metrics.text_width(&FontSpec::body(), "site").unwrap();
        let region = out
            .commands
            .iter()
            .find_map(|c| match c {
                PlacementCommand::AddLinkRegion {
                    url,
                    x,
                    y,
                    width,
                    height,
                } => Some((url.clone(), *x, *y, *width, *height)),
                _ => None,
            })
            .unwrap();

        assert_eq!(region.0, "http://x");
        assert!((region.1 - (30.0 + see_width - 2.5)).abs() < 1e-4);
        assert_eq!(region.2, 40.0 - 12.0);
        assert!((region.3 - (site_width + 5.0)).abs() < 1e-4);
        assert_eq!(region.4, 15.0);
        assert_eq!(drawn_texts(&out.commands), vec!["see ", "site"]);
        assert_eq!(out.cursor.y, 60.0);
    }

    #[test]
    fn link_line_draws_segments_in_order() {
        let g = PageGeometry::a4();
        let out = layout_line(
            &classify("a [b](u1) c [d](u2) e"),
            g.origin(),
            &g,
            &CharCount,
        )
        .unwrap();
        assert_eq!(drawn_texts(&out.commands), vec!["a ", "b", " c ", "d", " e"]);

        let xs: Vec<f32> = out
            .commands
            .iter()
            .filter_map(|c| match c {
                PlacementCommand::MoveCursor { x, .. } => Some(*x),
                _ => None,
            })
            .collect();
        assert_eq!(xs, vec![30.0, 32.0, 33.0, 36.0, 37.0]);
    }

    #[test]
    fn short_plain_line_is_one_run() {
        let g = PageGeometry::a4();
        let out = layout_line(&classify("hello"), g.origin(), &g, &CharCount).unwrap();
        assert_eq!(drawn_texts(&out.commands), vec!["hello"]);
        assert_eq!(out.cursor.y, 60.0);
    }

    #[test]
    fn long_plain_line_wraps_greedily() {
        let g = PageGeometry {
            page_width: 20.0,
            margin_x: 0.0,
            ..PageGeometry::a4()
        };
        // max width 20 chars
        let text = "aaaa bbbb cccc dddd eeee ffff";
        let out = layout_line(&classify(text), g.origin(), &g, &CharCount).unwrap();
        assert_eq!(
            drawn_texts(&out.commands),
            vec!["aaaa bbbb cccc dddd", "eeee ffff"]
        );
        assert_eq!(out.cursor.y, 80.0);
    }

    #[test]
    fn over_wide_word_is_emitted_alone() {
        let g = PageGeometry {
            page_width: 10.0,
            margin_x: 0.0,
            ..PageGeometry::a4()
        };
        let text = "ab supercalifragilistic cd";
        let out = layout_line(&classify(text), g.origin(), &g, &CharCount).unwrap();
        assert_eq!(
            drawn_texts(&out.commands),
            vec!["ab", "supercalifragilistic", "cd"]
        );
    }

    #[test]
    fn wrapping_breaks_pages_mid_paragraph() {
        let g = PageGeometry {
            page_width: 4.0,
            margin_x: 0.0,
            page_height: 100.0,
            bottom_margin: 20.0,
            top_margin: 40.0,
            line_height: 20.0,
        };
        // threshold 80: baselines 40, 60, 80 fit; the 4th line breaks.
        let out = layout_line(&classify("aaa bbb ccc ddd"), g.origin(), &g, &CharCount)
            .unwrap();
        let breaks = out
            .commands
            .iter()
            .filter(|c| **c == PlacementCommand::NewPage)
            .count();
        assert_eq!(breaks, 1);
        assert_eq!(
            out.commands[out.commands.len() - 3],
            PlacementCommand::NewPage
        );
        assert_eq!(
            out.commands[out.commands.len() - 2],
            PlacementCommand::MoveCursor { x: 0.0, y: 40.0 }
        );
        assert_eq!(out.cursor.y, 60.0);
    }

    #[test]
    fn text_after_the_last_link_is_not_measured() {
        use digitize_core::error::DigitizeError;

        struct RejectsTail;
        impl GlyphMetrics for RejectsTail {
            fn text_width(&self, _font: &FontSpec, text: &str) -> Result<f32> {
                if text.contains("tail") {
                    return Err(DigitizeError::Measure("tail".into()));
                }
                Ok(text.chars().count() as f32)
            }
        }

        let g = PageGeometry::a4();
        let out = layout_line(&classify("go [here](http://x) tail"), g.origin(), &g, &RejectsTail)
            .unwrap();
        assert_eq!(drawn_texts(&out.commands), vec!["go ", "here", " tail"]);
        assert_eq!(out.cursor.x, g.margin_x);
        assert_eq!(out.cursor.y, g.top_margin + g.line_height);
    }
}
