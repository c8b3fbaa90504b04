use std::error::Error;
use std::io;
use thiserror::Error;

/// Top level error surfaced to a connection's error callback.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError { source: ParseError },

    #[error("send error: {source}")]
    SendError {
        #[from]
        source: SendError,
    },

    #[error("handler error: {source}")]
    HandlerError { source: Box<dyn Error + Send + Sync> },

    #[error("transport error: {reason}")]
    TransportError { reason: String },
}

impl HttpError {
    pub fn response(source: ParseError) -> Self {
        Self::ResponseError { source }
    }

    pub fn handler<E: Into<Box<dyn Error + Send + Sync>>>(e: E) -> Self {
        Self::HandlerError { source: e.into() }
    }

    pub fn transport<S: ToString>(str: S) -> Self {
        Self::TransportError { reason: str.to_string() }
    }
}

/// Terminal failures while assembling an incoming message.
///
/// "Need more bytes" is never an error, see [`FeedStatus`](crate::protocol::FeedStatus).
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed head: {reason}")]
    MalformedHead { reason: String },

    #[error("malformed header line: {line:?}")]
    MalformedHeader { line: String },

    #[error("malformed chunk: {reason}")]
    MalformedChunk { reason: String },

    #[error("method not allowed: {method}")]
    MethodNotAllowed { method: String },

    #[error("missing content-type header")]
    UnsupportedContentType,

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("head size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHead { current_size: usize, max_size: usize },

    #[error("trailer fields after the last chunk are not supported: {line:?}")]
    UnsupportedTrailer { line: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn malformed_head<S: ToString>(str: S) -> Self {
        Self::MalformedHead { reason: str.to_string() }
    }

    pub fn malformed_header<S: ToString>(line: S) -> Self {
        Self::MalformedHeader { line: line.to_string() }
    }

    pub fn malformed_chunk<S: ToString>(str: S) -> Self {
        Self::MalformedChunk { reason: str.to_string() }
    }

    pub fn method_not_allowed<S: ToString>(method: S) -> Self {
        Self::MethodNotAllowed { method: method.to_string() }
    }

    pub fn unsupported_content_type() -> Self {
        Self::UnsupportedContentType
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn too_large_head(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHead { current_size, max_size }
    }

    pub fn unsupported_trailer<S: ToString>(line: S) -> Self {
        Self::UnsupportedTrailer { line: line.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// Returns true if the buffered partial body of the message must be dropped.
    pub fn is_chunk_error(&self) -> bool {
        matches!(self, Self::MalformedChunk { .. } | Self::UnsupportedTrailer { .. })
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("connection closed")]
    Closed,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts_into_parse_error() {
        let err: ParseError = io::Error::new(io::ErrorKind::UnexpectedEof, "eof").into();
        assert!(matches!(err, ParseError::Io { .. }));
        assert!(!err.is_chunk_error());
        assert!(matches!(ParseError::io(io::ErrorKind::BrokenPipe), ParseError::Io { .. }));
    }
}
