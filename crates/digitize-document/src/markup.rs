// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Inline-markup recognizer: classifies one logical line of OCR Markdown as
// blank, heading, plain text, or text with inline `[label](url)` links.
//
// Only two constructs are recognised:
//
//   - ATX headings: 1 to 6 leading `#`, at least one ASCII whitespace character,
//     then non-empty text.
//   - Inline links: `[label](url)`, matched leftmost-first and minimally. The
//     label is the shortest non-empty run up to the first `]`, the URL the
//     shortest non-empty run up to the first `)`. A URL containing a literal
//     `)` is therefore cut short at that character.
//
// Headings win over links: link markup inside a heading stays literal text.

/// A single `[label](url)` occurrence within a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpan {
    /// Text between the brackets.
    pub label: String,
    /// Target between the parentheses.
    pub url: String,
    /// Byte offset of the opening `[`.
    pub start: usize,
    /// Byte offset one past the closing `)`.
    pub end: usize,
}

/// Classification of one logical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Header { level: u8, text: String },
    Plain(String),
    LinkLine { text: String, spans: Vec<LinkSpan> },
}

/// Split a Markdown document into trimmed logical lines.
pub fn split_lines(markdown: &str) -> Vec<&str> {
    markdown.split('\n').map(str::trim).collect()
}

/// Classify a raw line. Surrounding whitespace is ignored.
pub fn classify(raw_line: &str) -> LineKind {
    let line = raw_line.trim();
    if line.is_empty() {
        return LineKind::Blank;
    }

    if let Some((level, text)) = parse_header(line) {
        return LineKind::Header {
            level,
            text: text.to_string(),
        };
    }

    let spans = find_links(line);
    if spans.is_empty() {
        LineKind::Plain(line.to_string())
    } else {
        LineKind::LinkLine {
            text: line.to_string(),
            spans,
        }
    }
}

/// Match `^#{1,6}\s+(.+)$` on an already-trimmed line.
fn parse_header(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }

    let rest = &line[hashes..];
    let text = rest.trim_start_matches(|c: char| c.is_ascii_whitespace());
    if text.len() == rest.len() || text.is_empty() {
        return None;
    }
    Some((hashes as u8, text))
}

/// Find every `[label](url)` span, left to right, without overlaps.
pub fn find_links(line: &str) -> Vec<LinkSpan> {
    let bytes = line.as_bytes();
    let mut spans = Vec::new();
    let mut pos = 0;

    while let Some(offset) = line[pos..].find('[') {
        let open = pos + offset;
        match match_link_at(line, open) {
            Some(span) => {
                pos = span.end;
                spans.push(span);
            }
            None => pos = open + 1,
        }
        if pos >= bytes.len() {
            break;
        }
    }

    spans
}

/// Try to match a link whose `[` sits at byte offset `open`.
fn match_link_at(line: &str, open: usize) -> Option<LinkSpan> {
    let label_start = open + 1;
    let label_len = line[label_start..].find(']')?;
    if label_len == 0 {
        return None;
    }
    let close_bracket = label_start + label_len;

    let paren = close_bracket + 1;
    if line.as_bytes().get(paren) != Some(&b'(') {
        return None;
    }

    let url_start = paren + 1;
    let url_len = line[url_start..].find(')')?;
    if url_len == 0 {
        return None;
    }
    let close_paren = url_start + url_len;

    Some(LinkSpan {
        label: line[label_start..close_bracket].to_string(),
        url: line[url_start..close_paren].to_string(),
        start: open,
        end: close_paren + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(label: &str, url: &str, start: usize, end: usize) -> LinkSpan {
        LinkSpan {
            label: label.into(),
            url: url.into(),
            start,
            end,
        }
    }

    #[test]
    fn blank_lines() {
        assert_eq!(classify(""), LineKind::Blank);
        assert_eq!(classify("   \t  "), LineKind::Blank);
    }

    #[test]
    fn header_levels() {
        assert_eq!(
            classify("# Title"),
            LineKind::Header {
                level: 1,
                text: "Title".into()
            }
        );
        assert_eq!(
            classify("  ###\t  Deep heading  "),
            LineKind::Header {
                level: 3,
                text: "Deep heading".into()
            }
        );
        assert_eq!(
            classify("###### six"),
            LineKind::Header {
                level: 6,
                text: "six".into()
            }
        );
    }

    #[test]
    fn not_headers() {
        assert_eq!(classify("####### seven"), LineKind::Plain("####### seven".into()));
        assert_eq!(classify("#hashtag"), LineKind::Plain("#hashtag".into()));
        assert_eq!(classify("#"), LineKind::Plain("#".into()));
        assert_eq!(classify("##   "), LineKind::Plain("##".into()));
    }

    #[test]
    fn header_takes_precedence_over_links() {
        assert_eq!(
            classify("# [a](b) text"),
            LineKind::Header {
                level: 1,
                text: "[a](b) text".into()
            }
        );
    }

    #[test]
    fn single_link_with_surrounding_text() {
        let kind = classify("see [site](http://x) now");
        assert_eq!(
            kind,
            LineKind::LinkLine {
                text: "see [site](http://x) now".into(),
                spans: vec![span("site", "http://x", 4, 20)],
            }
        );
    }

    #[test]
    fn multiple_links_in_order() {
        let spans = find_links("[a](1) and [b](2)");
        assert_eq!(spans, vec![span("a", "1", 0, 6), span("b", "2", 11, 17)]);
    }

    #[test]
    fn malformed_links_fall_back_to_plain() {
        assert_eq!(classify("[](x)"), LineKind::Plain("[](x)".into()));
        assert_eq!(classify("[a]()"), LineKind::Plain("[a]()".into()));
        assert_eq!(classify("[a] (b)"), LineKind::Plain("[a] (b)".into()));
        assert_eq!(classify("[a](b"), LineKind::Plain("[a](b".into()));
    }

    #[test]
    fn scan_resumes_after_failed_bracket() {
        let spans = find_links("[broken [ok](u)");
        assert_eq!(spans, vec![span("broken [ok", "u", 0, 15)]);

        let spans = find_links("[x] then [y](z)");
        assert_eq!(spans, vec![span("y", "z", 9, 15)]);
    }

    #[test]
    fn url_stops_at_first_close_paren() {
        let spans = find_links("[wiki](https://en.wikipedia.org/wiki/Rust_(language))");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].url, "https://en.wikipedia.org/wiki/Rust_(language");
    }

    #[test]
    fn offsets_are_byte_ranges() {
        let line = "café [é](ü)";
        let spans = find_links(line);
        assert_eq!(&line[spans[0].start..spans[0].end], "[é](ü)");
    }

    #[test]
    fn classification_is_deterministic() {
        for line in ["# a", "x [y](z)", "plain", ""] {
            assert_eq!(classify(line), classify(line));
        }
    }

    #[test]
    fn split_lines_trims_each_line() {
        assert_eq!(split_lines("  a \r\n\n b"), vec!["a", "", "b"]);
    }
}
