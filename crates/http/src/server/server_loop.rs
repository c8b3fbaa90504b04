//! Sans-IO orchestration of the server side.
//!
//! [`HttpServerLoop`] reacts to the lifecycle events a transport reports for each
//! connection. It never reads from a socket itself: bytes are handed to
//! [`HttpServerLoop::on_read`] and replies leave through the connection's [`Channel`].

use std::fmt::{self, Display};
use std::net::SocketAddr;

use bytes::Bytes;
use tracing::{error, info, trace};

use crate::connection::{Channel, ConnectionId, ConnectionRegistry, ConnectionState};
use crate::handler::Handler;
use crate::protocol::HttpError;

/// Body of the reply sent when a request cannot be served.
pub const SERVICE_ERROR_BODY: &str = "503 Service Error";

/// Status of the reply sent when a request cannot be served.
pub const SERVICE_ERROR_STATUS: u16 = 503;

/// Callback notified of every failure on a connection.
pub type ErrorHandler = Box<dyn Fn(ConnectionId, &HttpError) + Send + Sync>;

pub struct HttpServerLoop<H> {
    handler: H,
    error_handler: ErrorHandler,
    registry: ConnectionRegistry,
}

impl<H> fmt::Debug for HttpServerLoop<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpServerLoop").field("registry", &self.registry).finish_non_exhaustive()
    }
}

impl<H: Handler> HttpServerLoop<H> {
    pub fn new(handler: H) -> Self {
        Self::with_registry(handler, ConnectionRegistry::default())
    }

    pub fn with_registry(handler: H, registry: ConnectionRegistry) -> Self {
        Self { handler, error_handler: Box::new(log_error), registry }
    }

    /// Replaces the default error handler, which only logs.
    pub fn error_handler<F>(mut self, f: F) -> Self
    where
        F: Fn(ConnectionId, &HttpError) + Send + Sync + 'static,
    {
        self.error_handler = Box::new(f);
        self
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// A new connection was accepted, its state is created on the first read.
    pub fn on_connect(&self, id: ConnectionId, peer: SocketAddr) {
        info!(%id, %peer, "accept connection");
    }

    /// Feeds the bytes read on `channel` and answers once a request is complete.
    ///
    /// A request that fails to parse, or whose handler fails, is answered with
    /// `503 Service Error` before the error handler is called. Either way the
    /// connection state is reset for the next request.
    pub fn on_read<C>(&self, channel: &mut C, data: &[u8])
    where
        C: Channel + ?Sized,
    {
        let id = channel.id();
        let slot = self.registry.get_or_create(id);
        let mut state = slot.lock();

        match self.exchange(&mut state, data) {
            Ok(None) => {
                trace!(%id, len = data.len(), "request incomplete, wait for more bytes");
            }
            Ok(Some(wire)) => {
                let close = state.response.is_connection_close();
                state.reset();
                drop(state);

                channel.write(wire);
                if close {
                    channel.close();
                }
            }
            Err(e) => {
                error!(%id, cause = %e, "failed to serve request");
                let wire = error_reply(&mut state);
                state.reset();
                drop(state);

                channel.write(wire);
                (self.error_handler)(id, &e);
            }
        }
    }

    /// The transport reported a failure on connection `id`.
    pub fn on_error<E: Display>(&self, id: ConnectionId, reason: E) {
        (self.error_handler)(id, &HttpError::transport(reason));
    }

    /// The connection is gone, its partially assembled message is discarded.
    pub fn on_close(&self, id: ConnectionId) {
        if self.registry.remove(id).is_some() {
            info!(%id, "connection closed");
        }
    }

    fn exchange(&self, state: &mut ConnectionState, data: &[u8]) -> Result<Option<Bytes>, HttpError> {
        if !state.request.feed(data)?.is_complete() {
            return Ok(None);
        }

        self.handler.call(&state.request, &mut state.response).map_err(HttpError::handler)?;
        Ok(Some(state.response.to_wire()))
    }
}

fn error_reply(state: &mut ConnectionState) -> Bytes {
    let response = &mut state.response;
    response.init();
    response
        .set_status_code(SERVICE_ERROR_STATUS)
        .set_content_type(mime::TEXT_PLAIN.as_ref())
        .set_body(SERVICE_ERROR_BODY);
    response.to_wire()
}

fn log_error(id: ConnectionId, e: &HttpError) {
    error!(%id, cause = %e, "connection error");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::BufferedChannel;
    use crate::handler::make_handler;
    use crate::protocol::{ParseError, Request, Response};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, OnceLock};

    fn echo_loop() -> HttpServerLoop<impl Handler> {
        HttpServerLoop::new(make_handler(|request: &Request, response: &mut Response| {
            response.set_content_type("text/plain").set_body(request.body());
            Ok::<_, ParseError>(())
        }))
    }

    #[test]
    fn answers_complete_request() {
        let server_loop = echo_loop();
        let mut channel = BufferedChannel::new(ConnectionId::new(1));

        server_loop.on_read(&mut channel, b"POST / HTTP/1.1\r\ncontent-type: text/plain\r\ncontent-length: 2\r\n\r\nhi");

        let written = channel.take();
        assert!(written.starts_with(b"HTTP/1.1 200 OK\r\n"));
        assert!(written.ends_with(b"\r\n\r\nhi"));
        assert!(channel.is_closed());
        assert!(!server_loop.registry().get_or_create(ConnectionId::new(1)).lock().request.is_head_parsed());
    }

    #[test]
    fn waits_for_split_body() {
        let server_loop = echo_loop();
        let mut channel = BufferedChannel::new(ConnectionId::new(1));

        server_loop.on_read(&mut channel, b"POST / HTTP/1.1\r\ncontent-type: text/plain\r\ncontent-length: 5\r\n\r\nhel");
        assert!(channel.pending().is_empty());

        server_loop.on_read(&mut channel, b"lo");
        assert!(channel.take().ends_with(b"hello"));
    }

    #[test]
    fn handler_failure_answers_503() {
        let errors = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&errors);
        let server_loop = HttpServerLoop::new(make_handler(|_: &Request, _: &mut Response| Err("boom")))
            .error_handler(move |_, e| {
                assert!(matches!(e, HttpError::HandlerError { .. }));
                counter.fetch_add(1, Ordering::SeqCst);
            });
        let mut channel = BufferedChannel::new(ConnectionId::new(3));

        server_loop.on_read(&mut channel, b"GET / HTTP/1.1\r\ncontent-type: text/plain\r\n\r\n");

        let written = channel.take();
        assert!(written.starts_with(b"HTTP/1.1 503 Service Unavailable\r\n"));
        assert!(written.ends_with(SERVICE_ERROR_BODY.as_bytes()));
        assert!(!channel.is_closed());
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    /// Serves other connections from inside its own call.
    struct Reentrant {
        server_loop: Arc<OnceLock<HttpServerLoop<Reentrant>>>,
    }

    impl Handler for Reentrant {
        type Error = ParseError;

        fn call(&self, _: &Request, response: &mut Response) -> Result<(), Self::Error> {
            let Some(server_loop) = self.server_loop.get() else {
                return Err(ParseError::malformed_head("server loop not ready"));
            };

            // enough ids that some share a map shard with the connection being served
            for n in 100..300 {
                let mut other = BufferedChannel::new(ConnectionId::new(n));
                server_loop.on_read(&mut other, b"GET / HTTP/1.1\r\ncontent-type: text/plain\r\n\r\n");
                assert!(other.take().starts_with(b"HTTP/1.1 200 OK\r\n"));
            }
            response.set_content_type("text/plain").set_body("outer");
            Ok(())
        }
    }

    #[test]
    fn handler_runs_without_holding_the_registry() {
        let cell = Arc::new(OnceLock::new());
        let server_loop = cell.get_or_init(|| HttpServerLoop::new(Reentrant { server_loop: Arc::clone(&cell) }));
        let mut channel = BufferedChannel::new(ConnectionId::new(10));

        server_loop.on_read(&mut channel, b"GET / HTTP/1.1\r\ncontent-type: text/plain\r\n\r\n");

        assert!(channel.take().ends_with(b"outer"));
        assert_eq!(server_loop.registry().len(), 201);
    }

    #[test]
    fn close_discards_state() {
        let server_loop = echo_loop();
        let mut channel = BufferedChannel::new(ConnectionId::new(4));
        server_loop.on_read(&mut channel, b"POST / HTTP/1.1\r\n");
        assert_eq!(server_loop.registry().len(), 1);

        server_loop.on_close(ConnectionId::new(4));
        assert!(server_loop.registry().is_empty());
    }
}
