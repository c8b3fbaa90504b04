//! Per-message accumulation of incoming bytes into a complete head and body.
//!
//! [`BodyAssembler`] owns the message buffer: every read is appended to it, the head
//! is split off once complete, and the body decoder then drains whatever it can
//! resolve into the message body. Bytes it cannot resolve yet (a partial size line,
//! a partial chunk) simply stay buffered until the next read.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::{trace, warn};

use crate::codec::body::PayloadDecoder;
use crate::codec::head::HeadDecoder;
use crate::protocol::{FramingMode, ParseError, PayloadItem};

#[derive(Debug, Default)]
pub struct BodyAssembler {
    /// unparsed trailing bytes: an incomplete head, or body bytes not resolved yet
    buffer: BytesMut,
    head_decoder: HeadDecoder,
    payload_decoder: Option<PayloadDecoder>,
    framing: FramingMode,
    complete: bool,
}

impl BodyAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_head_bytes(max_head_bytes: usize) -> Self {
        Self { head_decoder: HeadDecoder::new(max_head_bytes), ..Self::default() }
    }

    /// Appends newly received bytes to the message buffer.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Splits the complete head off the buffer, once it has fully arrived.
    pub fn decode_head(&mut self) -> Result<Option<Bytes>, ParseError> {
        self.head_decoder.decode(&mut self.buffer)
    }

    /// Starts assembling a body framed by `framing`.
    pub fn begin(&mut self, framing: FramingMode) {
        trace!(?framing, "begin body");
        self.framing = framing;
        self.payload_decoder = Some(framing.into());
        self.complete = false;
    }

    /// Appends `data` and assembles it into `body`, see [`BodyAssembler::assemble`].
    pub fn feed(&mut self, body: &mut BytesMut, data: &[u8]) -> Result<bool, ParseError> {
        self.extend(data);
        self.assemble(body)
    }

    /// Moves every resolvable byte of the buffer into `body`.
    ///
    /// Returns `Ok(true)` once the declared body is complete. Bytes left over after
    /// completion belong to no message and are discarded. On error the buffered
    /// partial body is discarded as well.
    pub fn assemble(&mut self, body: &mut BytesMut) -> Result<bool, ParseError> {
        if self.complete {
            return Ok(true);
        }
        let Some(payload_decoder) = &mut self.payload_decoder else {
            return Ok(false);
        };

        loop {
            match payload_decoder.decode(&mut self.buffer) {
                Ok(Some(PayloadItem::Chunk(bytes))) => body.extend_from_slice(&bytes),
                Ok(Some(PayloadItem::Eof)) => {
                    if !self.buffer.is_empty() {
                        warn!(discarded = self.buffer.len(), "bytes after a complete body are dropped, pipelining is not supported");
                        self.buffer.clear();
                    }
                    self.complete = true;
                    return Ok(true);
                }
                Ok(None) => return Ok(false),
                Err(e) => {
                    self.buffer.clear();
                    body.clear();
                    return Err(e);
                }
            }
        }
    }

    pub fn framing(&self) -> FramingMode {
        self.framing
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Bytes received but not yet resolved into head or body.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// Forgets all state of the current message, keeping the buffer allocation.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.payload_decoder = None;
        self.framing = FramingMode::Unset;
        self.complete = false;
    }
}
