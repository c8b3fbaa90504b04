use std::borrow::Cow;

use bytes::Bytes;
use http::{Method, Uri, header};
use tracing::{debug, trace};

use crate::client::ClientError;
use crate::connection::Channel;
use crate::protocol::{FeedStatus, HeaderFields, ParseError, Query, Request, Response, is_allowed_method};

pub const DEFAULT_PORT: u16 = 80;

pub const USER_AGENT: &str = concat!("archer-http-client/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_ACCEPT: &str = "text/html, image/gif, image/jpeg, *; q=.2, */*; q=.2";

/// Options of a single client call.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub method: Method,
    /// merged over the default request headers
    pub headers: HeaderFields,
    pub body: Option<Bytes>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self { method: Method::GET, headers: HeaderFields::new(), body: None }
    }
}

impl ClientOptions {
    pub fn new(method: Method) -> Self {
        Self { method, ..Self::default() }
    }

    pub fn header<K: AsRef<str>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body<B: Into<Bytes>>(mut self, body: B) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// One request on one fresh connection, resolved by the complete response.
///
/// Transport independent: the request goes out through the [`Channel`] once the
/// connection is up, and every read is fed with [`HttpClientCall::on_read`] until
/// the response is complete, at which point the channel is closed.
#[derive(Debug)]
pub struct HttpClientCall {
    host: String,
    port: u16,
    request: Request,
    response: Response,
}

impl HttpClientCall {
    pub fn new(url: &str, options: ClientOptions) -> Result<Self, ClientError> {
        let uri = parse_url(url)?;
        // the host header keeps the brackets of an ipv6 literal, the socket address does not
        let authority_host = uri.host().ok_or_else(|| ClientError::invalid_url(url, "missing host"))?;
        let host = authority_host.trim_start_matches('[').trim_end_matches(']').to_string();
        let port = uri.port_u16().unwrap_or(DEFAULT_PORT);
        let request = build_request(&uri, authority_host, port, options)?;

        Ok(Self { host, port, request, response: Response::new() })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn is_complete(&self) -> bool {
        self.response.is_complete()
    }

    /// The connection is up, sends the request.
    pub fn on_connect<C: Channel + ?Sized>(&mut self, channel: &mut C) {
        debug!(id = %channel.id(), host = self.host, port = self.port, "send request");
        channel.write(self.request.to_wire());
    }

    /// Feeds the bytes read on `channel`, closing it once the response is complete.
    pub fn on_read<C: Channel + ?Sized>(&mut self, channel: &mut C, data: &[u8]) -> Result<FeedStatus, ClientError> {
        let status = self.response.feed(data)?;
        trace!(id = %channel.id(), len = data.len(), ?status, "read response bytes");
        if status.is_complete() {
            channel.close();
        }
        Ok(status)
    }

    pub fn into_response(self) -> Response {
        self.response
    }
}

fn parse_url(url: &str) -> Result<Uri, ClientError> {
    let full_url = if url.contains("://") { Cow::Borrowed(url) } else { Cow::Owned(format!("http://{url}")) };
    let uri = full_url.parse::<Uri>().map_err(|e| ClientError::invalid_url(url, e))?;

    match uri.scheme_str() {
        Some("http") => Ok(uri),
        Some(scheme) => Err(ClientError::unsupported_scheme(scheme)),
        None => Err(ClientError::invalid_url(url, "missing scheme")),
    }
}

fn build_request(uri: &Uri, host: &str, port: u16, options: ClientOptions) -> Result<Request, ClientError> {
    let ClientOptions { method, headers, body } = options;
    if !is_allowed_method(&method) {
        return Err(ParseError::method_not_allowed(method).into());
    }

    let target = match uri.path() {
        "" => "/",
        path => path,
    };
    let query = Query::parse(uri.query().unwrap_or_default())?;

    let mut request = Request::new();
    request
        .set_method(method)
        .set_target(target)
        .set_query(query)
        .set_header(header::HOST, format!("{host}:{port}"))
        .set_header(header::USER_AGENT, USER_AGENT)
        .set_header(header::CONNECTION, "close")
        .set_header(header::ACCEPT, DEFAULT_ACCEPT)
        .set_headers(&headers);
    if let Some(body) = body {
        request.set_body(body);
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{BufferedChannel, ConnectionId};

    #[test]
    fn default_request() {
        let call = HttpClientCall::new("http://example.com/index.html?a=1", ClientOptions::default()).unwrap();
        let request = call.request();

        assert_eq!(call.host(), "example.com");
        assert_eq!(call.port(), 80);
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.target(), "/index.html");
        assert_eq!(request.query().get("a"), Some("1"));
        assert_eq!(request.header("host"), Some("example.com:80"));
        assert_eq!(request.header("user-agent"), Some(USER_AGENT));
        assert_eq!(request.header("connection"), Some("close"));
        assert_eq!(request.header("accept"), Some(DEFAULT_ACCEPT));
    }

    #[test]
    fn scheme_less_url_is_http() {
        let call = HttpClientCall::new("localhost:9000", ClientOptions::default()).unwrap();

        assert_eq!(call.host(), "localhost");
        assert_eq!(call.port(), 9000);
        assert_eq!(call.request().target(), "/");
    }

    #[test]
    fn ipv6_host_is_connectable() {
        let call = HttpClientCall::new("http://[::1]:8080/", ClientOptions::default()).unwrap();

        assert_eq!(call.host(), "::1");
        assert_eq!(call.port(), 8080);
        assert_eq!(call.request().header("host"), Some("[::1]:8080"));
    }

    #[test]
    fn https_is_rejected() {
        let result = HttpClientCall::new("https://example.com/", ClientOptions::default());
        assert!(matches!(result, Err(ClientError::UnsupportedScheme { scheme }) if scheme == "https"));
    }

    #[test]
    fn unknown_method_is_rejected() {
        let result = HttpClientCall::new("http://h/", ClientOptions::new(Method::PATCH));
        assert!(matches!(result, Err(ClientError::Parse { source: ParseError::MethodNotAllowed { .. } })));
    }

    #[test]
    fn user_headers_and_body() {
        let options = ClientOptions::new(Method::POST).header("Content-Type", "application/json").header("Accept", "*/*").body("{}");
        let call = HttpClientCall::new("http://h:8080/api", options).unwrap();
        let request = call.request();

        assert_eq!(request.content_type(), Some("application/json"));
        assert_eq!(request.header("accept"), Some("*/*"));
        assert_eq!(request.content_length(), Some(2));
        assert!(request.to_wire().ends_with(b"\r\n\r\n{}"));
    }

    #[test]
    fn call_lifecycle() {
        let mut call = HttpClientCall::new("http://h/", ClientOptions::default()).unwrap();
        let mut channel = BufferedChannel::new(ConnectionId::new(1));

        call.on_connect(&mut channel);
        assert!(channel.take().starts_with(b"GET / HTTP/1.1\r\n"));

        let status = call.on_read(&mut channel, b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\n\r\n").unwrap();
        assert_eq!(status, FeedStatus::Incomplete);
        assert!(!channel.is_closed());

        let status = call.on_read(&mut channel, b"ok").unwrap();
        assert_eq!(status, FeedStatus::Complete);
        assert!(channel.is_closed());
        assert_eq!(call.into_response().body(), b"ok");
    }
}
