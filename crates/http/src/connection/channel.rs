use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::protocol::SendError;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one connection for its whole lifetime.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Allocates an id never handed out before in this process.
    pub fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Outgoing side of a connection as seen by the protocol core.
///
/// Both operations are fire and forget: the transport decides when bytes actually
/// reach the peer and when the socket is shut down.
pub trait Channel {
    fn id(&self) -> ConnectionId;

    fn write(&mut self, data: Bytes);

    fn close(&mut self);
}

/// A [`Channel`] that buffers writes until the transport flushes them.
#[derive(Debug)]
pub struct BufferedChannel {
    id: ConnectionId,
    buffer: BytesMut,
    closed: bool,
}

impl BufferedChannel {
    pub fn new(id: ConnectionId) -> Self {
        Self::with_capacity(id, 8 * 1024)
    }

    pub fn with_capacity(id: ConnectionId, buffer_size: usize) -> Self {
        Self { id, buffer: BytesMut::with_capacity(buffer_size), closed: false }
    }

    /// Bytes written and not flushed yet.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Takes the pending bytes out of the buffer.
    pub fn take(&mut self) -> Bytes {
        self.buffer.split().freeze()
    }

    /// Writes the pending bytes to `writer` and flushes it.
    pub async fn flush<W>(&mut self, writer: &mut W) -> Result<(), SendError>
    where
        W: AsyncWrite + Unpin,
    {
        if self.buffer.is_empty() {
            return Ok(());
        }

        writer.write_all(&self.buffer).await?;
        self.buffer.clear();
        Ok(writer.flush().await?)
    }
}

impl Channel for BufferedChannel {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn write(&mut self, data: Bytes) {
        self.buffer.extend_from_slice(&data);
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
