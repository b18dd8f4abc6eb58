// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Minimal HTTP/1.1 framing: one request per connection, bodies framed by
// Content-Length, responses always `Connection: close`.

use digitize_core::error::{DigitizeError, Result};
use digitize_core::human_errors::humanize_error;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, warn};

/// Ceiling on the request line plus headers.
const MAX_HEADER_BYTES: usize = 16 * 1024;

/// A parsed request with its full body.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    /// Request target as sent, including any query string.
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Case-insensitive header lookup; first occurrence wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Target without the query string.
    pub fn path(&self) -> &str {
        self.target
            .split_once('?')
            .map_or(self.target.as_str(), |(path, _)| path)
    }
}

/// Read one request. Returns `Ok(None)` when the peer closes the connection
/// without sending anything.
pub async fn read_request<R>(reader: &mut R, max_body: usize) -> Result<Option<HttpRequest>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(8192);
    let mut chunk = [0u8; 8192];

    let header_end = loop {
        if let Some(pos) = find_subsequence(&buf, b"\r\n\r\n") {
            break pos;
        }
        if buf.len() > MAX_HEADER_BYTES {
            return Err(DigitizeError::MalformedUpload(
                "request headers too large".into(),
            ));
        }
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            if buf.is_empty() {
                return Ok(None);
            }
            return Err(DigitizeError::MalformedUpload(
                "connection closed before end of headers".into(),
            ));
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = std::str::from_utf8(&buf[..header_end])
        .map_err(|_| DigitizeError::MalformedUpload("request head is not UTF-8".into()))?;
    let mut lines = head.split("\r\n");

    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let (method, target) = match (parts.next(), parts.next(), parts.next()) {
        (Some(method), Some(target), Some(version)) if version.starts_with("HTTP/1.") => {
            (method.to_string(), target.to_string())
        }
        _ => {
            return Err(DigitizeError::MalformedUpload(format!(
                "malformed request line `{request_line}`"
            )));
        }
    };

    let mut headers = Vec::new();
    for line in lines {
        let (name, value) = line.split_once(':').ok_or_else(|| {
            DigitizeError::MalformedUpload(format!("malformed header line `{line}`"))
        })?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    let mut request = HttpRequest {
        method,
        target,
        headers,
        body: Vec::new(),
    };

    if request
        .header("transfer-encoding")
        .is_some_and(|v| v.to_ascii_lowercase().contains("chunked"))
    {
        return Err(DigitizeError::MalformedUpload(
            "chunked request bodies are not supported".into(),
        ));
    }

    let content_length = match request.header("content-length") {
        Some(value) => value.parse::<usize>().map_err(|_| {
            DigitizeError::MalformedUpload(format!("invalid Content-Length `{value}`"))
        })?,
        None => 0,
    };
    if content_length > max_body {
        return Err(DigitizeError::RequestTooLarge { limit: max_body });
    }

    let mut body = buf.split_off(header_end + 4);
    if body.len() < content_length {
        let missing = (content_length - body.len()) as u64;
        body.reserve(missing as usize);
        (&mut *reader).take(missing).read_to_end(&mut body).await?;
    }
    if body.len() < content_length {
        return Err(DigitizeError::MalformedUpload(format!(
            "request body ended after {} of {content_length} bytes",
            body.len()
        )));
    }
    body.truncate(content_length);
    request.body = body;

    Ok(Some(request))
}

/// A response ready to be written.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_else(|_| b"{}".to_vec());
        Self {
            status,
            headers: vec![("Content-Type".into(), "application/json".into())],
            body,
        }
    }

    /// A PDF download named `filename`.
    pub fn pdf(bytes: Vec<u8>, filename: &str) -> Self {
        Self {
            status: 200,
            headers: vec![
                ("Content-Type".into(), "application/pdf".into()),
                (
                    "Content-Disposition".into(),
                    format!("attachment; filename=\"{}\"", quote_filename(filename)),
                ),
            ],
            body: bytes,
        }
    }

    /// The JSON error report for `err`, logged at a level matching its status.
    pub fn from_error(err: &DigitizeError) -> Self {
        let human = humanize_error(err);
        if human.status >= 500 {
            error!(error = %err, status = human.status, stage = ?human.stage, "Request failed");
        } else {
            warn!(error = %err, status = human.status, "Request rejected");
        }
        Self::json(human.status, &human.body())
    }

    pub fn not_found() -> Self {
        Self::json(404, &serde_json::json!({ "error": "Not found" }))
    }

    pub fn method_not_allowed() -> Self {
        let mut response = Self::json(405, &serde_json::json!({ "error": "Method not allowed" }));
        response.headers.push(("Allow".into(), "POST".into()));
        response
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Serialise status line, headers, and body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status, reason_phrase(self.status));
        for (name, value) in &self.headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        head.push_str("Connection: close\r\n\r\n");

        let mut out = head.into_bytes();
        out.extend_from_slice(&self.body);
        out
    }
}

/// Write a response and flush.
pub async fn write_response<W>(writer: &mut W, response: &HttpResponse) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(&response.to_bytes())
        .await
        .map_err(|e| DigitizeError::Server(format!("write response: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| DigitizeError::Server(format!("flush: {e}")))?;
    Ok(())
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "",
    }
}

/// Make a filename safe to embed in a quoted header parameter.
fn quote_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_control())
        .flat_map(|c| match c {
            '"' | '\\' => vec!['\\', c],
            _ => vec![c],
        })
        .collect()
}

/// Find the first occurrence of `needle` in `haystack`.
pub(crate) fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
