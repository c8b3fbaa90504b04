//! Serialization of a message head and body to wire bytes.
//!
//! The start line is followed by every header as `name: value\r\n` in insertion
//! order, then the blank line. The body is appended only when a positive content
//! length has been declared; this layer never produces chunked output.

use bytes::{BufMut, BytesMut};
use http::{Method, Version};

use crate::protocol::{HeaderFields, Query};

/// Initial buffer size allocated for head serialization
const INIT_HEAD_SIZE: usize = 1024;

/// Writes `METHOD target[?query] VERSION\r\n`.
pub fn encode_request_line(method: &Method, target: &str, query: &Query, version: Version, dst: &mut BytesMut) {
    dst.reserve(INIT_HEAD_SIZE);
    dst.put_slice(method.as_str().as_bytes());
    dst.put_u8(b' ');
    dst.put_slice(target.as_bytes());
    if !query.is_empty() {
        dst.put_u8(b'?');
        dst.put_slice(query.encode().as_bytes());
    }
    dst.put_u8(b' ');
    dst.put_slice(version_str(version).as_bytes());
    dst.put_slice(b"\r\n");
}

/// Writes `VERSION code reason\r\n`.
pub fn encode_status_line(version: Version, status: u16, reason: &str, dst: &mut BytesMut) {
    dst.reserve(INIT_HEAD_SIZE);
    dst.put_slice(version_str(version).as_bytes());
    dst.put_u8(b' ');
    dst.put_slice(status.to_string().as_bytes());
    dst.put_u8(b' ');
    dst.put_slice(reason.as_bytes());
    dst.put_slice(b"\r\n");
}

/// Writes the header block and its terminating blank line.
pub fn encode_headers(headers: &HeaderFields, dst: &mut BytesMut) {
    for (name, value) in headers {
        dst.put_slice(name.as_bytes());
        dst.put_slice(b": ");
        dst.put_slice(value.as_bytes());
        dst.put_slice(b"\r\n");
    }
    dst.put_slice(b"\r\n");
}

/// Appends `body` if `content_length` declares a positive length.
pub fn encode_body(content_length: Option<u64>, body: &[u8], dst: &mut BytesMut) {
    if content_length.is_some_and(|length| length > 0) {
        dst.extend_from_slice(body);
    }
}

pub fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "HTTP/1.1",
    }
}
