// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `multipart/form-data` bodies (RFC 7578), parsed in memory.

use digitize_core::error::{DigitizeError, Result};

use crate::http::find_subsequence;

/// One form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    /// Final path component of the client-supplied filename, if the part is
    /// a file.
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Extract the boundary from a `Content-Type` header value.
pub fn boundary(content_type: &str) -> Result<String> {
    let (mime, params) = content_type
        .split_once(';')
        .unwrap_or((content_type, ""));
    if !mime.trim().eq_ignore_ascii_case("multipart/form-data") {
        return Err(malformed(format!(
            "expected multipart/form-data, got `{}`",
            mime.trim()
        )));
    }

    parse_params(params)
        .into_iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("boundary"))
        .map(|(_, v)| v)
        .filter(|b| !b.is_empty())
        .ok_or_else(|| malformed("multipart boundary missing".into()))
}

/// Split a body into its parts.
pub fn parse(body: &[u8], boundary: &str) -> Result<Vec<Part>> {
    let delimiter = format!("--{boundary}");
    let part_end = format!("\r\n{delimiter}");

    let mut pos = find_subsequence(body, delimiter.as_bytes())
        .ok_or_else(|| malformed("opening boundary not found".into()))?
        + delimiter.len();
    let mut parts = Vec::new();

    loop {
        let rest = &body[pos..];
        if rest.starts_with(b"--") {
            break;
        }
        let rest = rest
            .strip_prefix(b"\r\n".as_slice())
            .ok_or_else(|| malformed("boundary not followed by CRLF".into()))?;
        pos += 2;

        let header_len = find_subsequence(rest, b"\r\n\r\n")
            .ok_or_else(|| malformed("part headers not terminated".into()))?;
        let headers = std::str::from_utf8(&rest[..header_len])
            .map_err(|_| malformed("part headers are not UTF-8".into()))?;

        let data_start = pos + header_len + 4;
        let data_len = find_subsequence(&body[data_start..], part_end.as_bytes())
            .ok_or_else(|| malformed("part not terminated by a boundary".into()))?;

        parts.push(part_from_headers(
            headers,
            body[data_start..data_start + data_len].to_vec(),
        )?);
        pos = data_start + data_len + part_end.len();
    }

    Ok(parts)
}

/// File parts submitted under `field`, in submission order.
pub fn files<'a>(parts: &'a [Part], field: &str) -> Vec<&'a Part> {
    parts
        .iter()
        .filter(|p| p.name == field && p.filename.is_some())
        .collect()
}

fn part_from_headers(headers: &str, data: Vec<u8>) -> Result<Part> {
    let mut disposition = None;
    let mut content_type = None;

    for line in headers.split("\r\n") {
        let Some((name, value)) = line.split_once(':') else {
            return Err(malformed(format!("malformed part header `{line}`")));
        };
        if name.trim().eq_ignore_ascii_case("content-disposition") {
            disposition = Some(value.trim().to_string());
        } else if name.trim().eq_ignore_ascii_case("content-type") {
            content_type = Some(value.trim().to_string());
        }
    }

    let disposition =
        disposition.ok_or_else(|| malformed("part without Content-Disposition".into()))?;
    let (kind, params) = disposition
        .split_once(';')
        .unwrap_or((disposition.as_str(), ""));
    if !kind.trim().eq_ignore_ascii_case("form-data") {
        return Err(malformed(format!("unexpected disposition `{}`", kind.trim())));
    }

    let params = parse_params(params);
    let param = |key: &str| {
        params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.clone())
    };

    let name = param("name").ok_or_else(|| malformed("part without a name".into()))?;
    let filename = param("filename").map(|f| base_name(&f).to_string());

    Ok(Part {
        name,
        filename,
        content_type,
        data,
    })
}

/// `; key=value; key="quoted; value"` pairs. Backslash escapes are honoured
/// inside quotes.
fn parse_params(input: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| *c == ';' || c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' || c == ';' {
                break;
            }
            key.push(c);
            chars.next();
        }

        let mut value = String::new();
        if chars.peek() == Some(&'=') {
            chars.next();
            if chars.peek() == Some(&'"') {
                chars.next();
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                value.push(escaped);
                            }
                        }
                        '"' => break,
                        _ => value.push(c),
                    }
                }
            } else {
                while let Some(&c) = chars.peek() {
                    if c == ';' {
                        break;
                    }
                    value.push(c);
                    chars.next();
                }
                value = value.trim().to_string();
            }
        }

        out.push((key.trim().to_string(), value));
    }

    out
}

/// Strip any directory a client put in front of the filename.
fn base_name(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
}

fn malformed(detail: String) -> DigitizeError {
    DigitizeError::MalformedUpload(detail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(boundary: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        for (name, filename, data) in parts {
            out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            match filename {
                Some(f) => out.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\nContent-Type: image/png\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => out.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            out.extend_from_slice(data);
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        out
    }

    #[test]
    fn boundary_from_header() {
        assert_eq!(
            boundary("multipart/form-data; boundary=----abc123").unwrap(),
            "----abc123"
        );
        assert_eq!(
            boundary("Multipart/Form-Data; charset=utf-8; boundary=\"a b\"").unwrap(),
            "a b"
        );
        assert!(boundary("application/json").is_err());
        assert!(boundary("multipart/form-data").is_err());
    }

    #[test]
    fn parses_files_and_fields() {
        let raw = body(
            "XyZ",
            &[
                ("note", None, b"hello"),
                ("images", Some("one.png"), b"\x89PNG\r\n\x1a\nbinary\r\n--not-a-boundary"),
                ("images", Some("two.jpg"), b""),
            ],
        );
        let parts = parse(&raw, "XyZ").unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].name, "note");
        assert_eq!(parts[0].filename, None);
        assert_eq!(parts[0].data, b"hello");
        assert_eq!(parts[1].data, b"\x89PNG\r\n\x1a\nbinary\r\n--not-a-boundary");
        assert_eq!(parts[1].content_type.as_deref(), Some("image/png"));
        assert!(parts[2].data.is_empty());

        let images = files(&parts, "images");
        assert_eq!(images.len(), 2);
        assert_eq!(images[1].filename.as_deref(), Some("two.jpg"));
        assert!(files(&parts, "note").is_empty());
    }

    #[test]
    fn preamble_is_ignored() {
        let mut raw = b"preamble text\r\n".to_vec();
        raw.extend(body("b", &[("image", Some("a.gif"), b"GIF89a")]));
        let parts = parse(&raw, "b").unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].data, b"GIF89a");
    }

    #[test]
    fn directory_is_stripped_from_filename() {
        let raw = body("b", &[("image", Some("C:\\\\scans\\\\page.png"), b"x")]);
        let parts = parse(&raw, "b").unwrap();
        assert_eq!(parts[0].filename.as_deref(), Some("page.png"));
    }

    #[test]
    fn quoted_filename_may_contain_semicolons() {
        let params = parse_params("; name=\"image\"; filename=\"a;b.png\"");
        assert_eq!(
            params,
            vec![
                ("name".to_string(), "image".to_string()),
                ("filename".to_string(), "a;b.png".to_string())
            ]
        );
    }

    #[test]
    fn missing_boundary_is_malformed() {
        assert!(matches!(
            parse(b"no boundaries here", "zzz"),
            Err(DigitizeError::MalformedUpload(_))
        ));
    }

    #[test]
    fn unterminated_part_is_malformed() {
        let raw = b"--b\r\nContent-Disposition: form-data; name=\"image\"\r\n\r\nnever ends";
        assert!(matches!(
            parse(raw, "b"),
            Err(DigitizeError::MalformedUpload(_))
        ));
    }
}
