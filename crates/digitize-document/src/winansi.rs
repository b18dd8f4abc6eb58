// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// WinAnsi text for the PDF base-14 faces.
//
// The base-14 fonts are single-byte fonts declared with `/WinAnsiEncoding`,
// which is Windows-1252 for every character it defines. Text set in them is
// measured and written as these bytes, one glyph per byte.

use digitize_core::error::{DigitizeError, Result};
use encoding_rs::WINDOWS_1252;

/// Encode `text` as WinAnsi bytes.
///
/// A character outside the encoding fails with [`DigitizeError::Measure`]
/// naming it.
pub fn encode(text: &str) -> Result<Vec<u8>> {
    let (bytes, _, had_errors) = WINDOWS_1252.encode(text);
    if !had_errors {
        return Ok(bytes.into_owned());
    }

    let missing = text
        .chars()
        .find(|ch| !is_encodable(*ch))
        .unwrap_or(char::REPLACEMENT_CHARACTER);
    Err(DigitizeError::Measure(format!(
        "{missing:?} (U+{:04X}) has no glyph in the built-in PDF fonts",
        u32::from(missing)
    )))
}

pub fn is_encodable(ch: char) -> bool {
    let mut buf = [0u8; 4];
    let (_, _, had_errors) = WINDOWS_1252.encode(ch.encode_utf8(&mut buf));
    !had_errors
}
