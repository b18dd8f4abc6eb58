// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Placement commands: the only vocabulary the layout engine speaks toward a
// page sink.

/// Family name of the single face set registered with a sink.
pub const BODY_FAMILY: &str = "body";

/// Body text size in points.
pub const BODY_SIZE: f32 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
}

/// A font selection: family, style, and size in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub family: &'static str,
    pub style: FontStyle,
    pub size: f32,
}

impl FontSpec {
    /// Regular body text.
    pub fn body() -> Self {
        Self {
            family: BODY_FAMILY,
            style: FontStyle::Regular,
            size: BODY_SIZE,
        }
    }

    /// Bold heading font for the given level (1 to 6): 22pt for level 1 down to
    /// 12pt for level 6.
    pub fn heading(level: u8) -> Self {
        let size = (24.0 - 2.0 * f32::from(level)).max(12.0);
        Self {
            family: BODY_FAMILY,
            style: FontStyle::Bold,
            size,
        }
    }
}

/// One instruction for a page sink.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementCommand {
    SetFont(FontSpec),
    /// Position the next text run's baseline start.
    MoveCursor { x: f32, y: f32 },
    DrawText(String),
    /// Clickable rectangle; `y` is the top edge in top-left page coordinates.
    AddLinkRegion {
        url: String,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    NewPage,
}
