//! Incremental detection of a complete message head.
//!
//! Bytes arrive in arbitrary pieces, so a head may be split anywhere, including inside
//! a header line or between the `\r` and `\n` of the blank separator. [`HeadDecoder`]
//! waits until the blank line has been buffered and then splits the whole head off the
//! front of the buffer, leaving any body bytes behind.

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::head::find_head_end;
use crate::ensure;
use crate::protocol::ParseError;

/// Maximum size in bytes allowed for the entire head section
pub const MAX_HEAD_BYTES: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadDecoder {
    max_head_bytes: usize,
}

impl HeadDecoder {
    pub fn new(max_head_bytes: usize) -> Self {
        Self { max_head_bytes }
    }

    pub fn max_head_bytes(&self) -> usize {
        self.max_head_bytes
    }
}

impl Default for HeadDecoder {
    fn default() -> Self {
        Self::new(MAX_HEAD_BYTES)
    }
}

impl Decoder for HeadDecoder {
    type Item = Bytes;
    type Error = ParseError;

    /// Splits a complete head, blank line included, off the front of `src`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(head))` once the blank line has been seen
    /// - `Ok(None)` if more data is needed
    /// - `Err(ParseError::TooLargeHead)` if the head exceeds the size limit
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // empty lines ahead of a head, e.g. the late CRLF of a previous chunked body
        let skip = src.iter().take_while(|b| matches!(b, b'\r' | b'\n')).count();
        if skip > 0 {
            trace!(skip, "skipped leading empty lines");
            src.advance(skip);
        }

        match find_head_end(src) {
            Some(head_end) => {
                ensure!(head_end <= self.max_head_bytes, ParseError::too_large_head(head_end, self.max_head_bytes));
                Ok(Some(src.split_to(head_end).freeze()))
            }
            None => {
                ensure!(src.len() <= self.max_head_bytes, ParseError::too_large_head(src.len(), self.max_head_bytes));
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_bytes_mut_lens() {
        let str = indoc! {r##"
        GET /index.html HTTP/1.1
        Host: 127.0.0.1:8080
        User-Agent: curl/7.79.1
        Accept: */*

        123"##};

        let mut bytes = BytesMut::from(str);
        let head = HeadDecoder::default().decode(&mut bytes).unwrap();

        assert!(head.is_some());
        assert_eq!(head.unwrap().len(), str.len() - 3);
        assert_eq!(&bytes[..], &b"123"[..]);
    }

    #[test]
    fn waits_for_blank_line() {
        let mut decoder = HeadDecoder::default();
        let mut bytes = BytesMut::from(&b"GET / HTTP/1.1\r\nHost: a"[..]);
        assert!(decoder.decode(&mut bytes).unwrap().is_none());

        bytes.extend_from_slice(b"\r\n\r");
        assert!(decoder.decode(&mut bytes).unwrap().is_none());

        bytes.extend_from_slice(b"\nbody");
        let head = decoder.decode(&mut bytes).unwrap().unwrap();
        assert_eq!(&head[..], b"GET / HTTP/1.1\r\nHost: a\r\n\r\n");
        assert_eq!(&bytes[..], b"body");
    }

    #[test]
    fn skips_leading_empty_lines() {
        let mut bytes = BytesMut::from(&b"\r\nGET / HTTP/1.1\r\nHost: a\r\n\r\n"[..]);
        let head = HeadDecoder::default().decode(&mut bytes).unwrap().unwrap();
        assert!(head.starts_with(b"GET"));
        assert!(bytes.is_empty());
    }

    #[test]
    fn rejects_oversized_head() {
        let mut decoder = HeadDecoder::new(32);
        let mut bytes = BytesMut::from(&b"GET / HTTP/1.1\r\nX-Long: aaaaaaaaaaaaaaaaaaaaaaa"[..]);
        let result = decoder.decode(&mut bytes);
        assert!(matches!(result, Err(ParseError::TooLargeHead { max_size: 32, .. })));
    }
}
