// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout module: geometry, placement commands, glyph metrics, the per-line
// layout engine, and the pagination controller that drives it.

pub mod command;
pub mod engine;
pub mod geometry;
pub mod metrics;
pub mod paginate;
pub mod sink;

pub use command::{FontSpec, FontStyle, PlacementCommand};
pub use engine::{LineLayout, layout_line};
pub use geometry::{Cursor, PageGeometry};
pub use metrics::{GlyphMetrics, MonospaceMetrics, TrueTypeMetrics};
pub use paginate::{RenderStats, combine, render};
pub use sink::{PageSink, RecordingSink, SinkEvent};
