//! Incremental HTTP/1.1 message framing over an opaque byte stream
//!
//! This crate reconstructs HTTP requests and responses from arbitrarily split reads
//! and serializes them back to wire bytes. The parsing core is sans-IO: a transport
//! hands it the bytes read on a connection and receives writes through a
//! [`connection::Channel`]. Tokio TCP transports for a server and a one-shot client
//! are included.
//!
//! # Features
//!
//! - Head parsing tolerant of `\r\n` and bare `\n` line endings
//! - Fixed-length and chunked bodies, split anywhere across reads
//! - Ordered, case-insensitive headers
//! - Per-connection state that survives partial reads
//! - Typed results separating "need more bytes" from malformed input
//!
//! # Example
//!
//! ```
//! use archer_http::protocol::{FeedStatus, Request};
//!
//! let mut request = Request::new();
//! let status = request.feed(b"POST /a?x=1 HTTP/1.1\r\ncontent-type: text/plain\r\ncontent-length: 5\r\n\r\nhel").unwrap();
//! assert_eq!(status, FeedStatus::Incomplete);
//!
//! let status = request.feed(b"lo").unwrap();
//! assert_eq!(status, FeedStatus::Complete);
//! assert_eq!(request.target(), "/a");
//! assert_eq!(request.query().get("x"), Some("1"));
//! assert_eq!(request.body(), b"hello");
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: message entities, headers and the error taxonomy
//! - [`codec`]: head detection and parsing, body decoders, wire serialization
//! - [`connection`]: connection ids, the transport [`connection::Channel`] and the registry
//! - [`handler`]: request handler trait and utilities
//! - [`server`]: configuration, the server event loop and its TCP transport
//! - [`client`]: the client call state machine and its TCP transport
//!
//! # Error Handling
//!
//! - [`protocol::ParseError`]: malformed incoming messages
//! - [`protocol::SendError`]: failures writing to the transport
//! - [`protocol::HttpError`]: top-level error reported to the server's error handler
//! - [`server::ConfigError`] and [`client::ClientError`]
//!
//! # Limitations
//!
//! - HTTP/1.0 and HTTP/1.1 only
//! - No TLS support
//! - No pipelining: bytes received after a complete message are discarded
//! - Trailer fields after a chunked body are rejected
//! - Maximum head size: 8KB by default

pub mod client;
pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod server;

mod utils;
pub(crate) use utils::ensure;
