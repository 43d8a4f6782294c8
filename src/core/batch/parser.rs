//! Multipart response parsing
//!
//! A single forward pass over the response body. Any structural deviation is
//! a fatal [`BatchError::Protocol`] carrying the byte offset it was found at;
//! no partial results are returned.

use crate::core::http::RawResponse;
use crate::utils::error::{BatchError, Result};
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

const CRLF: &[u8] = b"\r\n";
const BLANK_LINE: &[u8] = b"\r\n\r\n";

/// Boundary declared by a `multipart/mixed` content type
///
/// The boundary parameter may be quoted. Any other media type, or a missing
/// or empty boundary, is an error.
pub fn boundary_from_content_type(content_type: Option<&str>) -> Result<String> {
    let content_type =
        content_type.ok_or_else(|| BatchError::ContentType("header is missing".to_string()))?;

    let mut params = content_type.split(';');
    let media_type = params.next().unwrap_or_default().trim();
    if !media_type.eq_ignore_ascii_case("multipart/mixed") {
        return Err(BatchError::ContentType(content_type.to_string()));
    }

    params
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|boundary| !boundary.is_empty())
        .ok_or_else(|| BatchError::ContentType(content_type.to_string()))
}

/// Split a batch response body into one raw response per part, in order
pub fn parse_batch_response(body: &[u8], boundary: &str) -> Result<Vec<RawResponse>> {
    let delimiter = format!("--{}", boundary);
    let delimiter = delimiter.as_bytes();
    let mut scanner = Scanner::new(body);
    let mut responses = Vec::new();

    scanner.consume(delimiter)?;
    loop {
        if scanner.look_ahead(b"--") {
            break;
        }
        if scanner.at_end() {
            return Err(scanner.error("body ends without a closing delimiter"));
        }

        let part_end = scanner
            .find(delimiter)
            .ok_or_else(|| scanner.error("missing delimiter after part"))?;

        let headers_end = scanner
            .find(BLANK_LINE)
            .filter(|&pos| pos < part_end)
            .ok_or_else(|| scanner.error("part headers are not terminated"))?;
        scanner.seek(headers_end + BLANK_LINE.len());

        responses.push(parse_http_response(&mut scanner, part_end)?);

        scanner.seek(part_end);
        scanner.consume(delimiter)?;
    }

    Ok(responses)
}

/// Status line, header lines, blank line, then the body up to `end`
fn parse_http_response(scanner: &mut Scanner<'_>, end: usize) -> Result<RawResponse> {
    let status_offset = scanner.position();
    let status_line = scanner.take_line(end)?;
    let (major_version, minor_version, status, reason) = parse_status_line(status_line)
        .map_err(|message| BatchError::protocol(status_offset, message))?;

    let mut headers = HeaderMap::new();
    loop {
        if scanner.look_ahead(CRLF) {
            scanner.consume(CRLF)?;
            break;
        }
        let line_offset = scanner.position();
        let line = scanner.take_line(end)?;
        let (name, value) =
            parse_header_line(line).map_err(|message| BatchError::protocol(line_offset, message))?;
        headers.append(name, value);
    }

    Ok(RawResponse {
        major_version,
        minor_version,
        status,
        reason,
        headers,
        body: Bytes::copy_from_slice(scanner.slice_to(end)),
    })
}

fn parse_status_line(
    line: &[u8],
) -> std::result::Result<(u16, u16, StatusCode, String), String> {
    let line = std::str::from_utf8(line).map_err(|_| "status line is not UTF-8".to_string())?;
    let rest = line
        .strip_prefix("HTTP/")
        .ok_or_else(|| format!("expected HTTP status line, found '{}'", line))?;

    let (version, rest) = rest
        .split_once(' ')
        .ok_or_else(|| format!("malformed status line '{}'", line))?;
    let (major, minor) = version
        .split_once('.')
        .ok_or_else(|| format!("malformed HTTP version '{}'", version))?;
    let major = major
        .parse::<u16>()
        .map_err(|_| format!("malformed HTTP version '{}'", version))?;
    let minor = minor
        .parse::<u16>()
        .map_err(|_| format!("malformed HTTP version '{}'", version))?;

    let (code, reason) = rest.split_once(' ').unwrap_or((rest, ""));
    let status = code
        .parse::<u16>()
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or_else(|| format!("invalid status code '{}'", code))?;

    Ok((major, minor, status, reason.to_string()))
}

fn parse_header_line(line: &[u8]) -> std::result::Result<(HeaderName, HeaderValue), String> {
    let separator = line
        .iter()
        .position(|&b| b == b':')
        .ok_or_else(|| format!("header line without ':' '{}'", String::from_utf8_lossy(line)))?;
    let (name, value) = (&line[..separator], &line[separator + 1..]);

    let name = HeaderName::from_bytes(name)
        .map_err(|_| format!("invalid header name '{}'", String::from_utf8_lossy(name)))?;
    let value = value.strip_prefix(b" ").unwrap_or(value);
    let value = HeaderValue::from_bytes(value)
        .map_err(|_| format!("invalid value for header '{}'", name))?;
    Ok((name, value))
}

/// Cursor over the response body
struct Scanner<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.data.len());
    }

    fn error(&self, message: &str) -> BatchError {
        BatchError::protocol(self.pos, message)
    }

    /// Whether the remaining input starts with `literal`. Does not move.
    fn look_ahead(&self, literal: &[u8]) -> bool {
        self.data[self.pos..].starts_with(literal)
    }

    /// Step over `literal` or fail
    fn consume(&mut self, literal: &[u8]) -> Result<()> {
        if self.look_ahead(literal) {
            self.pos += literal.len();
            Ok(())
        } else {
            Err(self.error(&format!(
                "expected '{}'",
                String::from_utf8_lossy(literal)
            )))
        }
    }

    /// Absolute offset of the next `literal` at or after the cursor. Does not move.
    fn find(&self, literal: &[u8]) -> Option<usize> {
        if literal.is_empty() {
            return Some(self.pos);
        }
        self.data[self.pos..]
            .windows(literal.len())
            .position(|window| window == literal)
            .map(|offset| self.pos + offset)
    }

    /// Bytes up to the next CRLF, which must occur before `end`; moves past it
    fn take_line(&mut self, end: usize) -> Result<&'a [u8]> {
        let line_end = self
            .find(CRLF)
            .filter(|&pos| pos + CRLF.len() <= end)
            .ok_or_else(|| self.error("header block is not terminated before the next delimiter"))?;
        let line = &self.data[self.pos..line_end];
        self.pos = line_end + CRLF.len();
        Ok(line)
    }

    fn slice_to(&self, end: usize) -> &'a [u8] {
        &self.data[self.pos..end.max(self.pos)]
    }
}
