//! HTTP codec module for incremental message framing
//!
//! This module turns arbitrarily split reads into complete messages and messages back
//! into wire bytes.
//!
//! # Architecture
//!
//! - Head handling via the [`head`] module:
//!   - [`HeadDecoder`]: waits for the blank line that ends a head
//!   - [`parse_request_head`] / [`parse_response_head`]: pure head parsers
//!   - encoding helpers used by `to_wire`
//!
//! - Body handling via the [`body`] module:
//!   - [`BodyAssembler`]: per-message buffer plus body decoder state machine
//!   - [`PayloadDecoder`]: content-length, chunked or no body
//!
//! # Example
//!
//! ```
//! use archer_http::codec::parse_request_head;
//!
//! let raw = b"GET /a?x=1 HTTP/1.1\r\nhost: h\r\ncontent-type: text/plain\r\n\r\n";
//! let head = parse_request_head(raw).unwrap();
//! assert_eq!(head.line.target, "/a");
//! assert_eq!(head.headers.get("Host"), Some("h"));
//! ```

pub mod body;
pub mod head;

pub use body::{BodyAssembler, PayloadDecoder};
pub use head::{
    HeadDecoder, MAX_HEAD_BYTES, ParsedHead, RequestLine, StatusLine, encode_body, encode_headers, encode_request_line,
    encode_status_line, find_head_end, framing_mode, parse_request_head, parse_response_head, version_str,
};
