use bytes::{Buf, Bytes};

/// Represents an item produced by a body decoder.
///
/// Decoders yield either a data chunk or signal that the body is complete (EOF).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem<Data: Buf = Bytes> {
    /// A chunk of payload data
    Chunk(Data),
    /// Marks the end of the payload stream
    Eof,
}

impl<D: Buf> PayloadItem<D> {
    /// Returns true if this item represents the end of the payload stream
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }

    /// Returns true if this item contains chunk data
    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, PayloadItem::Chunk(_))
    }
}

impl PayloadItem {
    /// Returns a reference to the contained bytes if this is a Chunk
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }

    /// Consumes the PayloadItem and returns the contained bytes if this is a Chunk
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }
}

/// How a message declares where its body ends.
///
/// - `Unset`: no framing header, the message carries no body
/// - `FixedLength`: exactly `n` bytes, taken from `content-length`
/// - `Chunked`: `transfer-encoding: chunked`
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum FramingMode {
    #[default]
    Unset,
    FixedLength(u64),
    Chunked,
}

impl FramingMode {
    /// Returns true if the body uses chunked transfer encoding
    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self, FramingMode::Chunked)
    }

    /// Returns true if no framing was declared
    #[inline]
    pub fn is_unset(&self) -> bool {
        matches!(self, FramingMode::Unset)
    }
}

/// Outcome of feeding bytes into an incoming message.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    /// More bytes are needed before the message is complete
    Incomplete,
    /// The head and the whole declared body have been assembled
    Complete,
}

impl FeedStatus {
    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self, FeedStatus::Complete)
    }
}

impl From<bool> for FeedStatus {
    fn from(complete: bool) -> Self {
        if complete { FeedStatus::Complete } else { FeedStatus::Incomplete }
    }
}
