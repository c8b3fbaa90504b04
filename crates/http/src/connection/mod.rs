//! Per-connection state and the transport boundary.
//!
//! The parsing core never touches a socket. A transport delivers the bytes read on a
//! connection and receives writes through a [`Channel`], while the
//! [`ConnectionRegistry`] keeps the in-flight message pair of every connection so a
//! read that ends mid-message resumes where the previous one stopped.
//!
//! # Components
//!
//! - [`ConnectionId`]: opaque, process-unique connection identifier
//! - [`Channel`]: write and close capability of one connection
//! - [`BufferedChannel`]: a [`Channel`] collecting writes until flushed to an `AsyncWrite`
//! - [`ConnectionState`]: the (request, response) pair of one connection
//! - [`ConnectionSlot`]: shared, lockable handle to a [`ConnectionState`]
//! - [`ConnectionRegistry`]: concurrent map from [`ConnectionId`] to [`ConnectionState`]

mod channel;
mod registry;

pub use channel::{BufferedChannel, Channel, ConnectionId};
pub use registry::{ConnectionRegistry, ConnectionSlot, ConnectionState};
