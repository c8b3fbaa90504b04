//! Decoder implementation for HTTP chunked transfer encoding.
//!
//! A chunked body is a series of `<hex-size>CRLF<bytes>CRLF` chunks ended by a
//! zero-size chunk. This decoder works line by line over a growing buffer:
//!
//! - a size line is only parsed once its `\n` has arrived
//! - a chunk is only consumed once all of its bytes have arrived, so a split chunk is
//!   never handed out partially
//! - the CR and LF after chunk data are each optional and may arrive in a later read
//! - the body ends at the empty line after the terminal chunk, any other line there is
//!   a trailer field and is rejected

use crate::ensure;
use crate::protocol::{ParseError, PayloadItem};
use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;
use ChunkedState::*;

/// Longest size line (size, whitespace and extensions) accepted before giving up
const MAX_SIZE_LINE: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: ChunkedState,
}

impl ChunkedDecoder {
    /// Creates a new ChunkedDecoder, ready to read the size of the first chunk.
    pub fn new() -> Self {
        Self { state: Size }
    }
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    /// Waiting for a complete size line and the chunk it announces
    Size,
    /// Skip an optional CR after chunk data
    BodyCr,
    /// Skip an optional LF after chunk data
    BodyLf,
    /// Terminal chunk seen, waiting for the empty line that ends the body
    LastChunk,
    /// Terminal chunk seen
    End,
}

impl Decoder for ChunkedDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    /// Decodes chunked transfer encoded data from the input buffer.
    ///
    /// # Returns
    /// - `Ok(Some(PayloadItem::Chunk(bytes)))` with one whole chunk
    /// - `Ok(Some(PayloadItem::Eof))` once the terminal chunk is processed
    /// - `Ok(None)` when more data is needed
    /// - `Err(ParseError)` if the chunked encoding is invalid
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.state {
                End => {
                    trace!("finished reading chunked data");
                    return Ok(Some(PayloadItem::Eof));
                }

                BodyCr => match src.first().copied() {
                    None => return Ok(None),
                    Some(b'\r') => {
                        src.advance(1);
                        self.state = BodyLf;
                    }
                    Some(b'\n') => {
                        src.advance(1);
                        self.state = Size;
                    }
                    Some(_) => self.state = Size,
                },

                BodyLf => match src.first().copied() {
                    None => return Ok(None),
                    Some(b'\n') => {
                        src.advance(1);
                        self.state = Size;
                    }
                    Some(_) => self.state = Size,
                },

                LastChunk => {
                    let Some(lf) = memchr::memchr(b'\n', src) else {
                        ensure!(src.len() <= MAX_SIZE_LINE, ParseError::unsupported_trailer(String::from_utf8_lossy(src).trim()));
                        return Ok(None);
                    };

                    let line = &src[..lf];
                    ensure!(line.iter().all(|b| *b == b'\r'), ParseError::unsupported_trailer(String::from_utf8_lossy(line).trim()));
                    src.advance(lf + 1);
                    self.state = End;
                }

                Size => {
                    let Some(lf) = memchr::memchr(b'\n', src) else {
                        ensure!(src.len() <= MAX_SIZE_LINE, ParseError::malformed_chunk("chunk size line too long"));
                        return Ok(None);
                    };

                    let size = parse_chunk_size(&src[..lf])?;
                    if size == 0 {
                        src.advance(lf + 1);
                        self.state = LastChunk;
                        continue;
                    }

                    let size = usize::try_from(size).map_err(|_e| ParseError::malformed_chunk("chunk size overflow"))?;
                    if src.len() - lf - 1 < size {
                        // keep the size line buffered until the whole chunk is here
                        return Ok(None);
                    }

                    src.advance(lf + 1);
                    let bytes = src.split_to(size).freeze();
                    self.state = BodyCr;
                    trace!(len = bytes.len(), "read chunked bytes");
                    return Ok(Some(PayloadItem::Chunk(bytes)));
                }
            }
        }
    }
}

/// Parses a chunk size line: hex digits with optional surrounding whitespace and
/// optional `;extension` suffix, which is ignored.
fn parse_chunk_size(line: &[u8]) -> Result<u64, ParseError> {
    let line = std::str::from_utf8(line).map_err(|_e| ParseError::malformed_chunk("size line is not utf-8"))?;
    let size = line.split(';').next().unwrap_or_default().trim();

    ensure!(
        !size.is_empty() && size.bytes().all(|b| b.is_ascii_hexdigit()),
        ParseError::malformed_chunk(format!("invalid chunk size {:?}", line.trim()))
    );

    u64::from_str_radix(size, 16).map_err(|_e| ParseError::malformed_chunk(format!("chunk size {size} overflow")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_basic() {
        let mut buffer: BytesMut = BytesMut::from(&b"10\r\n1234567890abcdef\r\n0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let item = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(item.is_chunk());
        assert_eq!(item.as_bytes().unwrap().as_ref(), b"1234567890abcdef");

        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_multiple_chunks() {
        let mut buffer: BytesMut = BytesMut::from(&b"5\r\nhello\r\n7\r\n, world\r\n0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::copy_from_slice(b"hello"));

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::copy_from_slice(b", world"));

        let eof = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(eof.is_eof());
    }

    #[test]
    fn test_chunks_with_extensions() {
        let mut buffer: BytesMut = BytesMut::from(&b"5;chunk-ext=value\r\nhello\r\n0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::copy_from_slice(b"hello"));

        let eof = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(eof.is_eof());
    }

    #[test]
    fn test_size_with_whitespace() {
        let mut buffer: BytesMut = BytesMut::from(&b" A \r\n0123456789\r\n0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap().as_ref(), b"0123456789");
    }

    #[test]
    fn test_trailers_are_rejected() {
        let mut buffer: BytesMut = BytesMut::from(&b"5\r\nhello\r\n0\r\nTrailer: value\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::copy_from_slice(b"hello"));

        let result = decoder.decode(&mut buffer);
        assert!(matches!(result, Err(ParseError::UnsupportedTrailer { line }) if line == "Trailer: value"));
    }

    #[test]
    fn test_incomplete_chunk_is_not_consumed() {
        let mut buffer: BytesMut = BytesMut::from(&b"5\r\nhel"[..]);
        let mut decoder = ChunkedDecoder::new();

        assert!(decoder.decode(&mut buffer).unwrap().is_none());
        assert_eq!(&buffer[..], b"5\r\nhel");

        buffer.extend_from_slice(b"lo\r\n0\r\n\r\n");

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::copy_from_slice(b"hello"));

        let eof = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(eof.is_eof());
    }

    #[test]
    fn test_split_chunk_terminator() {
        let mut decoder = ChunkedDecoder::new();
        let mut buffer: BytesMut = BytesMut::from(&b"3\r\nabc\r"[..]);

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap().as_ref(), b"abc");
        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"\n2\r\nde\r\n0\r\n\r\n");
        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap().as_ref(), b"de");
        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
    }

    #[test]
    fn test_invalid_chunk_size() {
        let mut buffer: BytesMut = BytesMut::from(&b"xyz\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let result = decoder.decode(&mut buffer);
        assert!(matches!(result, Err(ParseError::MalformedChunk { .. })));
    }

    #[test]
    fn test_empty_chunk_size() {
        let mut buffer: BytesMut = BytesMut::from(&b"\r\nabc"[..]);
        let mut decoder = ChunkedDecoder::new();

        assert!(matches!(decoder.decode(&mut buffer), Err(ParseError::MalformedChunk { .. })));
    }

    #[test]
    fn test_signed_chunk_size() {
        let mut buffer: BytesMut = BytesMut::from(&b"+5\r\nhello\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        assert!(matches!(decoder.decode(&mut buffer), Err(ParseError::MalformedChunk { .. })));
    }

    #[test]
    fn test_overflow_chunk_size() {
        let mut buffer: BytesMut = BytesMut::from(&b"1ffffffffffffffff\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        assert!(matches!(decoder.decode(&mut buffer), Err(ParseError::MalformedChunk { .. })));
    }

    #[test]
    fn test_large_chunk() {
        // Create a large chunk (1MB)
        let size = 1024 * 1024;
        let mut data = Vec::with_capacity(size + 16);
        data.extend(format!("{size:x}\r\n").into_bytes());
        data.extend(vec![b'A'; size]);
        data.extend(b"\r\n0\r\n\r\n");

        let mut buffer = BytesMut::from(&data[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap().len(), size);
        assert!(chunk.as_bytes().unwrap().iter().all(|&b| b == b'A'));

        let eof = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(eof.is_eof());
    }

    #[test]
    fn test_zero_size_chunk() {
        let mut buffer: BytesMut = BytesMut::from(&b"0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let eof = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(eof.is_eof());
    }

    #[test]
    fn test_zero_size_chunk_waits_for_final_line() {
        let mut buffer: BytesMut = BytesMut::from(&b"0\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        assert!(decoder.decode(&mut buffer).unwrap().is_none());
        assert!(buffer.is_empty());

        buffer.extend_from_slice(b"\r");
        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"\n");
        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_bare_lf_after_zero_size_chunk() {
        let mut buffer: BytesMut = BytesMut::from(&b"0\n\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
    }

    #[test]
    fn test_trailer_in_later_read_is_rejected() {
        let mut buffer: BytesMut = BytesMut::from(&b"5\r\nhello\r\n0\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_chunk());
        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"X-Trailer: v");
        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"\r\n\r\n");
        let result = decoder.decode(&mut buffer);
        assert!(matches!(result, Err(ParseError::UnsupportedTrailer { line }) if line == "X-Trailer: v"));
    }
}
