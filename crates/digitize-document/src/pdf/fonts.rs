// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Font resources handed to the PDF writer.

use std::path::Path;
use std::sync::Arc;

use digitize_core::AppConfig;
use digitize_core::error::{DigitizeError, Result};
use tracing::info;

use crate::layout::metrics::{GlyphMetrics, MonospaceMetrics, TrueTypeMetrics};

/// The face set a document is set in.
#[derive(Debug, Clone)]
pub enum FontResource {
    /// PDF base-14 Courier and Courier-Bold. Nothing is embedded.
    Builtin,
    /// TrueType faces embedded into the document. Headings use `bold` when
    /// given, otherwise the regular face.
    Embedded {
        regular: Arc<[u8]>,
        bold: Option<Arc<[u8]>>,
    },
}

impl FontResource {
    /// Load TrueType faces from disk.
    pub fn from_paths(regular: &Path, bold: Option<&Path>) -> Result<Self> {
        let regular_bytes = read_font(regular)?;
        let bold_bytes = bold.map(read_font).transpose()?;
        info!(
            regular = %regular.display(),
            bold = ?bold,
            "Loaded font files"
        );
        Ok(Self::Embedded {
            regular: regular_bytes,
            bold: bold_bytes,
        })
    }

    /// Pick the faces named in the configuration, or the built-in set when no
    /// font path is configured.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        match &config.font_path {
            Some(regular) => Self::from_paths(regular, config.bold_font_path.as_deref()),
            None => Ok(Self::Builtin),
        }
    }

    /// Metrics matching these faces.
    pub fn metrics(&self) -> Result<Box<dyn GlyphMetrics>> {
        match self {
            Self::Builtin => Ok(Box::new(MonospaceMetrics::courier())),
            Self::Embedded { regular, bold } => Ok(Box::new(TrueTypeMetrics::new(
                Arc::clone(regular),
                bold.clone(),
            )?)),
        }
    }
}

fn read_font(path: &Path) -> Result<Arc<[u8]>> {
    std::fs::read(path)
        .map(Arc::from)
        .map_err(|e| DigitizeError::FontLoad(format!("{}: {e}", path.display())))
}
