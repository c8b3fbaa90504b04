//! Message head processing: detection, parsing and serialization.
//!
//! # Components
//!
//! - [`HeadDecoder`]: waits for a complete head in a growing buffer
//! - [`parse_request_head`] / [`parse_response_head`]: pure parsers over a complete head
//! - [`framing_mode`]: picks the body framing from the parsed headers
//! - head encoding functions used by `to_wire`

mod head_decoder;
mod head_encoder;
mod head_parser;

pub use head_decoder::{HeadDecoder, MAX_HEAD_BYTES};
pub use head_encoder::{encode_body, encode_headers, encode_request_line, encode_status_line, version_str};
pub use head_parser::{
    ParsedHead, RequestLine, StatusLine, find_head_end, framing_mode, parse_request_head, parse_response_head,
};
