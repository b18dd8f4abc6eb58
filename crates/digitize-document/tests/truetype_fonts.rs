// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Measuring and embedding a real TrueType face.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use digitize_core::DigitizeError;
use digitize_document::layout::{FontSpec, FontStyle, GlyphMetrics, TrueTypeMetrics};
use digitize_document::{FontResource, render_markdown_to_pdf};
use lopdf::{Document, Object};

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/Montserrat-Regular.ttf")
}

fn montserrat() -> Arc<[u8]> {
    Arc::from(std::fs::read(fixture()).unwrap())
}

fn size(size: f32) -> FontSpec {
    FontSpec {
        size,
        ..FontSpec::body()
    }
}

#[test]
fn advances_come_from_the_font() {
    let metrics = TrueTypeMetrics::new(montserrat(), None).unwrap();

    // 1000 units per em; s=488 i=269 t=406 e=604.
    let site = metrics.text_width(&size(14.0), "site").unwrap();
    assert!((site - 1767.0 * 14.0 / 1000.0).abs() < 1e-3, "{site}");

    // H=813 i=269 space=262.
    let hi = metrics.text_width(&size(10.0), "Hi Hi").unwrap();
    assert!((hi - (2.0 * 1082.0 + 262.0) * 10.0 / 1000.0).abs() < 1e-3, "{hi}");

    assert_eq!(metrics.text_width(&size(14.0), "").unwrap(), 0.0);
}

#[test]
fn accented_latin_is_measured() {
    let metrics = TrueTypeMetrics::new(montserrat(), None).unwrap();
    let plain = metrics.text_width(&size(10.0), "e").unwrap();
    let accented = metrics.text_width(&size(10.0), "\u{e9}").unwrap();
    assert!((plain - accented).abs() < 1e-3);
}

#[test]
fn bold_falls_back_to_the_regular_face() {
    let metrics = TrueTypeMetrics::new(montserrat(), None).unwrap();
    let bold = FontSpec {
        style: FontStyle::Bold,
        ..size(12.0)
    };
    assert_eq!(
        metrics.text_width(&bold, "site").unwrap(),
        metrics.text_width(&size(12.0), "site").unwrap()
    );
}

#[test]
fn missing_glyph_is_a_measure_error() {
    let metrics = TrueTypeMetrics::new(montserrat(), None).unwrap();
    let err = metrics.text_width(&size(14.0), "漢字").unwrap_err();
    assert!(matches!(err, DigitizeError::Measure(_)));
    assert!(err.to_string().starts_with("failed to measure text"), "{err}");
}

/// Count dictionaries carrying `key` anywhere in the object graph.
fn dictionaries_with(doc: &Document, key: &[u8]) -> usize {
    fn walk(object: &Object, key: &[u8]) -> usize {
        match object {
            Object::Dictionary(dict) => {
                usize::from(dict.has(key)) + dict.iter().map(|(_, v)| walk(v, key)).sum::<usize>()
            }
            Object::Stream(stream) => walk(&Object::Dictionary(stream.dict.clone()), key),
            Object::Array(items) => items.iter().map(|v| walk(v, key)).sum(),
            _ => 0,
        }
    }
    doc.objects.values().map(|o| walk(o, key)).sum()
}

#[test]
fn embedded_face_is_written_into_the_pdf() {
    let fonts = FontResource::from_paths(&fixture(), None).unwrap();
    let bytes = render_markdown_to_pdf(
        "# Receipt\n\nPaid at the caf\u{e9}, see [site](https://shop.example) for details.",
        &fonts,
    )
    .unwrap();

    let doc = Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
    assert!(dictionaries_with(&doc, b"FontFile2") >= 1);
}

#[test]
fn embedded_face_rejects_text_it_cannot_draw() {
    let fonts = FontResource::from_paths(&fixture(), None).unwrap();
    let err = render_markdown_to_pdf("Total: 漢字", &fonts).unwrap_err();
    assert!(matches!(err, DigitizeError::Measure(_)));
}
