// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.
//
// Settings come from an optional JSON file (path in `DIGITIZE_CONFIG`) and are
// then overridden field by field from the environment. A `.env` file in the
// working directory, when present, seeds the environment first.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DigitizeError, Result};
use crate::types::PaperSize;

/// Default endpoint of the remote OCR service.
pub const DEFAULT_OCR_ENDPOINT: &str = "https://api.mistral.ai/v1/ocr";

/// Default OCR model name.
pub const DEFAULT_OCR_MODEL: &str = "mistral-ocr-2505";

/// Limits applied to uploads before any OCR or rendering happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadLimits {
    /// Per-file size ceiling in bytes.
    pub max_file_bytes: u64,
    /// Maximum number of files in one batch request.
    pub max_batch_files: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: 10 << 20,
            max_batch_files: 10,
        }
    }
}

/// Settings for the remote OCR service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Bearer token. Never serialized back out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_OCR_ENDPOINT.to_string(),
            model: DEFAULT_OCR_MODEL.to_string(),
            timeout_secs: 120,
        }
    }
}

/// Top-level application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: String,
    /// TrueType font for body text. Without one the built-in Courier faces
    /// are used.
    pub font_path: Option<PathBuf>,
    /// TrueType font for headings. Falls back to `font_path`.
    pub bold_font_path: Option<PathBuf>,
    /// Paper size of generated documents.
    pub paper_size: PaperSize,
    pub upload: UploadLimits,
    pub ocr: OcrSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            font_path: None,
            bold_font_path: None,
            paper_size: PaperSize::A4,
            upload: UploadLimits::default(),
            ocr: OcrSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `DIGITIZE_CONFIG` (if set) and the process
    /// environment, after reading `.env` from the working directory.
    pub fn load() -> Result<Self> {
        load_env_file(Path::new(".env"))?;
        let base = match std::env::var("DIGITIZE_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Read a JSON configuration file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            DigitizeError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Apply overrides from a key lookup (the environment in production).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(addr) = lookup("DIGITIZE_BIND") {
            self.bind_addr = addr;
        }
        if let Some(path) = lookup("DIGITIZE_FONT_PATH") {
            self.font_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("DIGITIZE_BOLD_FONT_PATH") {
            self.bold_font_path = Some(PathBuf::from(path));
        }
        if let Some(name) = lookup("DIGITIZE_PAPER_SIZE") {
            self.paper_size = PaperSize::from_name(&name)
                .ok_or_else(|| DigitizeError::Config(format!("unknown paper size `{name}`")))?;
        }
        if let Some(key) = lookup("MISTRAL_API_KEY").filter(|k| !k.is_empty()) {
            self.ocr.api_key = Some(key);
        }
        if let Some(endpoint) = lookup("DIGITIZE_OCR_ENDPOINT") {
            self.ocr.endpoint = endpoint;
        }
        if let Some(model) = lookup("DIGITIZE_OCR_MODEL") {
            self.ocr.model = model;
        }
        if let Some(secs) = lookup("DIGITIZE_OCR_TIMEOUT_SECS") {
            self.ocr.timeout_secs = secs.parse().map_err(|_| {
                DigitizeError::Config(format!("DIGITIZE_OCR_TIMEOUT_SECS is not a number: `{secs}`"))
            })?;
        }
        Ok(self)
    }
}

/// Export the variables of a dotenv file into the process environment.
///
/// Variables already set in the environment win. Returns `false` when the
/// file does not exist.
pub fn load_env_file(path: &Path) -> Result<bool> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(DigitizeError::Config(format!(
            "cannot load {}: {e}",
            path.display()
        ))),
    }
}
