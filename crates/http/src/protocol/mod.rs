//! Core HTTP protocol abstractions and implementations.
//!
//! This module provides the fundamental building blocks for HTTP message handling:
//!
//! - [`Request`] and [`Response`]: mutable message entities that are parsed
//!   incrementally with `feed` and serialized with `to_wire`
//! - [`HeaderFields`]: ordered header storage with lower-cased names
//! - [`Query`]: decoded query parameters of a request target
//! - [`FramingMode`], [`FeedStatus`], [`PayloadItem`]: framing and progress types
//! - [`HttpError`], [`ParseError`], [`SendError`]: the error taxonomy
//!
//! Parsing never blocks and never uses errors for flow control: a message that needs
//! more bytes reports [`FeedStatus::Incomplete`], a malformed one returns a [`ParseError`].

mod error;
mod header;
mod message;
mod query;
mod request;
mod response;
mod status;

pub use error::{HttpError, ParseError, SendError};
pub use header::HeaderFields;
pub use message::{FeedStatus, FramingMode, PayloadItem};
pub use query::{Query, split_target};
pub use request::{ALLOWED_METHODS, Request, is_allowed_method};
pub use response::{Response, SERVER_NAME};
pub use status::{DEFAULT_REASON, reason_phrase};
