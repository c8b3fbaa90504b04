//! Parsing of a complete message head (start line plus header block).
//!
//! The grammar is the lenient line-oriented one peers of this library speak:
//!
//! 1. The head is split on `\n`; every line is trimmed, so `\r\n` and bare `\n`
//!    endings are both accepted.
//! 2. At least four lines are required: the start line, one header, the blank
//!    separator and whatever follows it.
//! 3. Every header line is split at its first `:`. Names are trimmed and lower-cased,
//!    values are trimmed. A later duplicate name replaces the earlier value.
//! 4. Bytes after the blank separator are returned untouched as the start of the body.
//!
//! All functions here are pure, they only look at the bytes passed in.

use http::{Method, Version, header};
use memchr::memchr_iter;
use tracing::{trace, warn};

use crate::ensure;
use crate::protocol::{FramingMode, HeaderFields, ParseError, Query, reason_phrase, split_target};

/// Minimum number of `\n` separated lines of a valid head
const MIN_HEAD_LINES: usize = 4;

/// Request line fields of a parsed request head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    /// path part of the target, without the query
    pub target: String,
    pub query: Query,
    pub version: Version,
}

/// Status line fields of a parsed response head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub version: Version,
    pub status: u16,
    pub reason: String,
}

/// A parsed head together with any body bytes that followed the blank line.
#[derive(Debug)]
pub struct ParsedHead<'a, L> {
    pub line: L,
    pub headers: HeaderFields,
    pub body: Option<&'a [u8]>,
}

/// Parses `METHOD target VERSION` followed by the header block.
pub fn parse_request_head(raw: &[u8]) -> Result<ParsedHead<'_, RequestLine>, ParseError> {
    let (start_line, headers, body) = split_head(raw)?;

    let mut parts = start_line.split(' ').filter(|s| !s.is_empty());
    let (Some(method), Some(target), Some(version), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ParseError::malformed_head(format!("invalid request line {start_line:?}")));
    };

    let method = Method::from_bytes(method.as_bytes())
        .map_err(|_e| ParseError::malformed_head(format!("invalid method {method:?}")))?;
    let (path, query) = split_target(target)?;
    let version = parse_version(version)?;

    let line = RequestLine { method, target: path.to_string(), query, version };
    Ok(ParsedHead { line, headers, body })
}

/// Parses `VERSION code [reason...]` followed by the header block.
///
/// A multi-word reason phrase is rejoined with single spaces; a missing one is
/// derived from the status code.
pub fn parse_response_head(raw: &[u8]) -> Result<ParsedHead<'_, StatusLine>, ParseError> {
    let (start_line, headers, body) = split_head(raw)?;

    let mut parts = start_line.split(' ').filter(|s| !s.is_empty());
    let (Some(version), Some(code)) = (parts.next(), parts.next()) else {
        return Err(ParseError::malformed_head(format!("invalid status line {start_line:?}")));
    };

    let version = parse_version(version)?;
    let status = code.parse::<u16>().map_err(|_e| ParseError::malformed_head(format!("invalid status code {code:?}")))?;
    let reason = parts.collect::<Vec<_>>().join(" ");
    let reason = if reason.is_empty() { reason_phrase(status).to_string() } else { reason };

    let line = StatusLine { version, status, reason };
    Ok(ParsedHead { line, headers, body })
}

/// Determines how the body of a message with `headers` is framed.
///
/// `transfer-encoding` ending in `chunked` takes precedence over `content-length`.
pub fn framing_mode(headers: &HeaderFields) -> Result<FramingMode, ParseError> {
    let chunked = headers.get(header::TRANSFER_ENCODING).is_some_and(is_chunked);
    let content_length = headers.get(header::CONTENT_LENGTH);

    match (chunked, content_length) {
        (true, None) => Ok(FramingMode::Chunked),
        (true, Some(_)) => {
            warn!("transfer-encoding and content-length both present, using chunked framing");
            Ok(FramingMode::Chunked)
        }
        (false, Some(value)) => {
            let length = value
                .trim()
                .parse::<u64>()
                .map_err(|_e| ParseError::invalid_content_length(format!("value {value} is not u64")))?;
            Ok(FramingMode::FixedLength(length))
        }
        (false, None) => Ok(FramingMode::Unset),
    }
}

/// Returns the offset just past the blank line that ends the head in `buf`, if any.
///
/// A blank line is a line made only of ASCII whitespace, so `\r\n\r\n`, `\n\n` and
/// `\r\n \r\n` all terminate a head. The first line is never treated as blank.
pub fn find_head_end(buf: &[u8]) -> Option<usize> {
    let mut line_start = None;
    for lf in memchr_iter(b'\n', buf) {
        if let Some(start) = line_start
            && buf[start..lf].iter().all(u8::is_ascii_whitespace)
        {
            return Some(lf + 1);
        }
        line_start = Some(lf + 1);
    }
    None
}

fn split_head(raw: &[u8]) -> Result<(&str, HeaderFields, Option<&[u8]>), ParseError> {
    let line_count = memchr_iter(b'\n', raw).count() + 1;
    ensure!(
        line_count >= MIN_HEAD_LINES,
        ParseError::malformed_head(format!("expect at least {MIN_HEAD_LINES} lines, found {line_count}"))
    );

    let mut lines = LineIter { buf: raw, pos: 0 };
    let start_line = lines
        .next()
        .map(|(line, _)| {
            std::str::from_utf8(line).map(str::trim).map_err(|_e| ParseError::malformed_head("start line is not utf-8"))
        })
        .transpose()?
        .ok_or_else(|| ParseError::malformed_head("empty head"))?;
    ensure!(!start_line.is_empty(), ParseError::malformed_head("empty start line"));

    let mut headers = HeaderFields::new();
    for (line, next) in lines.by_ref() {
        let line = line_str(line)?;
        if line.is_empty() {
            let body = if next < raw.len() { Some(&raw[next..]) } else { None };
            trace!(head_size = next, "parsed head");
            return Ok((start_line, headers, body));
        }

        let Some((name, value)) = line.split_once(':') else {
            return Err(ParseError::malformed_header(line));
        };
        let name = name.trim();
        ensure!(!name.is_empty(), ParseError::malformed_header(line));
        headers.insert(name, value.trim());
    }

    Err(ParseError::malformed_head("missing blank line after headers"))
}

fn parse_version(version: &str) -> Result<Version, ParseError> {
    match version {
        "HTTP/1.1" => Ok(Version::HTTP_11),
        "HTTP/1.0" => Ok(Version::HTTP_10),
        // http2 and http3 are not spoken over this framing
        v => Err(ParseError::malformed_head(format!("unsupported http version {v:?}"))),
    }
}

fn line_str(line: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(line)
        .map(str::trim)
        .map_err(|_e| ParseError::malformed_header(String::from_utf8_lossy(line)))
}

/// Checks if the transfer-encoding value indicates chunked encoding.
///
/// chunked must be the last coding if present.
fn is_chunked(value: &str) -> bool {
    value.rsplit(',').next().is_some_and(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
}

/// Yields each `\n` separated line of `buf` and the offset where the next line starts.
struct LineIter<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for LineIter<'a> {
    type Item = (&'a [u8], usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos > self.buf.len() {
            return None;
        }
        let rest = &self.buf[self.pos..];
        let (line, next) = match memchr::memchr(b'\n', rest) {
            Some(lf) => (&rest[..lf], self.pos + lf + 1),
            None => (rest, self.buf.len() + 1),
        };
        self.pos = next;
        Some((line, next))
    }
}
