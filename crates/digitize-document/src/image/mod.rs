// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: validation of uploaded image files.

pub mod validate;

pub use validate::{ValidatedImage, sniff_mime, validate_batch_count, validate_image};
