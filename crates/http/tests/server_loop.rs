use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use archer_http::connection::{Channel, ConnectionId};
use archer_http::handler::make_handler;
use archer_http::protocol::{HttpError, ParseError, Request, Response};
use archer_http::server::{HttpServerLoop, SERVICE_ERROR_BODY};
use bytes::Bytes;

/// Records everything the server loop does to a connection.
#[derive(Debug, Default)]
struct MockChannel {
    id: u64,
    writes: Vec<Bytes>,
    closed: usize,
}

impl MockChannel {
    fn new(id: u64) -> Self {
        Self { id, ..Self::default() }
    }

    fn written(&self) -> Vec<u8> {
        self.writes.concat()
    }
}

impl Channel for MockChannel {
    fn id(&self) -> ConnectionId {
        ConnectionId::new(self.id)
    }

    fn write(&mut self, data: Bytes) {
        self.writes.push(data);
    }

    fn close(&mut self) {
        self.closed += 1;
    }
}

fn hello_loop(errors: &Arc<AtomicUsize>) -> HttpServerLoop<impl archer_http::handler::Handler> {
    let errors = Arc::clone(errors);
    let handler = make_handler(|request: &Request, response: &mut Response| {
        response.set_content_type("text/plain").set_body(format!("hello {}", request.target()));
        Ok::<_, ParseError>(())
    });
    HttpServerLoop::new(handler).error_handler(move |_id, e| {
        assert!(matches!(e, HttpError::RequestError { .. }), "unexpected error {e}");
        errors.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn malformed_header_line_reports_once() {
    let errors = Arc::new(AtomicUsize::new(0));
    let server_loop = hello_loop(&errors);
    let mut channel = MockChannel::new(1);

    server_loop.on_read(&mut channel, b"GET / HTTP/1.1\r\nbadheaderline\r\ncontent-type: text/plain\r\n\r\n");

    assert_eq!(errors.load(Ordering::SeqCst), 1);
    assert_eq!(channel.writes.len(), 1);
    let written = String::from_utf8(channel.written()).unwrap();
    assert!(written.starts_with("HTTP/1.1 503 Service Unavailable\r\n"));
    assert!(written.contains("content-type: text/plain\r\n"));
    assert!(written.ends_with(SERVICE_ERROR_BODY));
    assert_eq!(channel.closed, 0);
}

#[test]
fn connection_recovers_after_error() {
    let errors = Arc::new(AtomicUsize::new(0));
    let server_loop = hello_loop(&errors);
    let mut channel = MockChannel::new(2);

    server_loop.on_read(&mut channel, b"GET / HTTP/1.1\r\ncontent-type: text/plain\r\ntransfer-encoding: chunked\r\n\r\nzz\r\n");
    assert_eq!(errors.load(Ordering::SeqCst), 1);

    server_loop.on_read(&mut channel, b"GET /again HTTP/1.1\r\ncontent-type: text/plain\r\n\r\n");

    assert_eq!(errors.load(Ordering::SeqCst), 1);
    assert_eq!(channel.writes.len(), 2);
    assert!(channel.writes[1].ends_with(b"hello /again"));
}

#[test]
fn interleaved_connections_keep_their_state() {
    let errors = Arc::new(AtomicUsize::new(0));
    let server_loop = hello_loop(&errors);
    let mut first = MockChannel::new(10);
    let mut second = MockChannel::new(11);

    server_loop.on_read(&mut first, b"POST /first HTTP/1.1\r\ncontent-type: text/plain\r\n");
    server_loop.on_read(&mut second, b"POST /second HTTP/1.1\r\ncontent-type: text/plain\r\n\r\n");
    server_loop.on_read(&mut first, b"content-length: 1\r\n\r\n");
    assert!(first.writes.is_empty());
    server_loop.on_read(&mut first, b"x");

    assert!(first.written().ends_with(b"hello /first"));
    assert!(second.written().ends_with(b"hello /second"));
    assert_eq!(first.closed, 1);
    assert_eq!(errors.load(Ordering::SeqCst), 0);
}

#[test]
fn unknown_method_and_missing_content_type_are_rejected() {
    let errors = Arc::new(AtomicUsize::new(0));
    let server_loop = hello_loop(&errors);
    let mut channel = MockChannel::new(20);

    server_loop.on_read(&mut channel, b"TRACE / HTTP/1.1\r\ncontent-type: text/plain\r\n\r\n");
    server_loop.on_read(&mut channel, b"GET / HTTP/1.1\r\nhost: h\r\n\r\n");

    assert_eq!(errors.load(Ordering::SeqCst), 2);
    assert!(channel.writes.iter().all(|write| write.starts_with(b"HTTP/1.1 503 ")));
}

#[test]
fn transport_error_reaches_error_handler() {
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let server_loop = HttpServerLoop::new(make_handler(|_: &Request, _: &mut Response| Ok::<_, ParseError>(())))
        .error_handler(move |id, e| {
            assert_eq!(id, ConnectionId::new(5));
            assert!(matches!(e, HttpError::TransportError { reason } if reason == "reset by peer"));
            counter.fetch_add(1, Ordering::SeqCst);
        });

    server_loop.on_error(ConnectionId::new(5), "reset by peer");
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

#[test]
fn trailer_in_later_read_reports_once() {
    let errors = Arc::new(AtomicUsize::new(0));
    let server_loop = hello_loop(&errors);
    let mut channel = MockChannel::new(30);

    server_loop.on_read(&mut channel, b"POST / HTTP/1.1\r\ncontent-type: text/plain\r\ntransfer-encoding: chunked\r\n\r\n4\r\nWiki\r\n0\r\n");
    assert!(channel.writes.is_empty());

    server_loop.on_read(&mut channel, b"X-Trailer: v\r\n\r\n");

    assert_eq!(errors.load(Ordering::SeqCst), 1);
    assert_eq!(channel.writes.len(), 1);
    assert!(channel.writes[0].starts_with(b"HTTP/1.1 503 "));
    assert_eq!(channel.closed, 0);
}
