//! Incoming and outgoing HTTP requests.
//!
//! A [`Request`] is both the target of incremental parsing on the server side and the
//! message a client builds and serializes with [`Request::to_wire`]. The same instance
//! is reused across messages on a connection, see [`Request::init`].

use bytes::{Bytes, BytesMut};
use http::{Method, Version, header};
use tracing::trace;

use crate::codec::{BodyAssembler, encode_body, encode_headers, encode_request_line, framing_mode, parse_request_head};
use crate::ensure;
use crate::protocol::{FeedStatus, FramingMode, HeaderFields, ParseError, Query};

/// Methods a request may carry, anything else is [`ParseError::MethodNotAllowed`].
pub const ALLOWED_METHODS: [Method; 5] = [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS];

pub(crate) const DEFAULT_CONTENT_TYPE: &str = "application/none";

/// Returns true if `method` is one of [`ALLOWED_METHODS`].
pub fn is_allowed_method(method: &Method) -> bool {
    ALLOWED_METHODS.contains(method)
}

#[derive(Debug)]
pub struct Request {
    method: Method,
    target: String,
    version: Version,
    query: Query,
    headers: HeaderFields,
    body: BytesMut,
    framing: FramingMode,
    assembler: BodyAssembler,
    head_parsed: bool,
    complete: bool,
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    pub fn new() -> Self {
        let mut request = Self {
            method: Method::GET,
            target: String::new(),
            version: Version::HTTP_11,
            query: Query::new(),
            headers: HeaderFields::new(),
            body: BytesMut::new(),
            framing: FramingMode::Unset,
            assembler: BodyAssembler::new(),
            head_parsed: false,
            complete: false,
        };
        request.init();
        request
    }

    /// Creates a request whose incoming head may be at most `max_head_bytes` long.
    pub fn with_max_head_bytes(max_head_bytes: usize) -> Self {
        Self { assembler: BodyAssembler::with_max_head_bytes(max_head_bytes), ..Self::new() }
    }

    /// Restores the default state so the instance can carry the next message.
    ///
    /// Nothing of the previous message survives: the header map is replaced and the
    /// buffers are emptied, keeping their allocations.
    pub fn init(&mut self) {
        self.method = Method::GET;
        self.target.clear();
        self.target.push('/');
        self.version = Version::HTTP_11;
        self.query.clear();
        self.headers.clear();
        self.headers.insert(header::CONTENT_TYPE, DEFAULT_CONTENT_TYPE);
        self.headers.insert(header::CONTENT_LENGTH, "0");
        self.body.clear();
        self.framing = FramingMode::Unset;
        self.assembler.reset();
        self.head_parsed = false;
        self.complete = false;
    }

    /// Feeds the next bytes read from the connection.
    ///
    /// The head is parsed once its blank line has arrived; every byte after it goes
    /// to the body. Returns [`FeedStatus::Complete`] once the whole declared body has
    /// been assembled.
    pub fn feed(&mut self, data: &[u8]) -> Result<FeedStatus, ParseError> {
        if self.complete {
            return Ok(FeedStatus::Complete);
        }

        self.assembler.extend(data);
        if !self.head_parsed {
            let Some(head) = self.assembler.decode_head()? else {
                return Ok(FeedStatus::Incomplete);
            };
            self.apply_head(&head)?;
        }

        self.complete = self.assembler.assemble(&mut self.body)?;
        Ok(self.complete.into())
    }

    fn apply_head(&mut self, raw: &[u8]) -> Result<(), ParseError> {
        let head = parse_request_head(raw)?;
        let line = head.line;

        ensure!(is_allowed_method(&line.method), ParseError::method_not_allowed(line.method));
        ensure!(head.headers.contains(header::CONTENT_TYPE), ParseError::unsupported_content_type());
        let framing = framing_mode(&head.headers)?;
        trace!(method = %line.method, target = line.target, ?framing, "parsed request head");

        self.method = line.method;
        self.target = line.target;
        self.version = line.version;
        self.query = line.query;
        self.headers = head.headers;
        self.framing = framing;
        self.assembler.begin(framing);
        self.head_parsed = true;
        Ok(())
    }

    /// Serializes the request line, headers and body.
    pub fn to_wire(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(self.body.len() + 256);
        encode_request_line(&self.method, &self.target, &self.query, self.version, &mut dst);
        encode_headers(&self.headers, &mut dst);
        encode_body(self.content_length(), &self.body, &mut dst);
        dst.freeze()
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path part of the target, without the query.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn headers(&self) -> &HeaderFields {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header<K: AsRef<str>>(&self, name: K) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(header::CONTENT_TYPE)
    }

    pub fn content_length(&self) -> Option<u64> {
        self.headers.get(header::CONTENT_LENGTH).and_then(|value| value.parse().ok())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn framing(&self) -> FramingMode {
        self.framing
    }

    pub fn is_head_parsed(&self) -> bool {
        self.head_parsed
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn set_method(&mut self, method: Method) -> &mut Self {
        self.method = method;
        self
    }

    /// Sets the path, the query is kept separately, see [`Request::set_query`].
    pub fn set_target<S: Into<String>>(&mut self, target: S) -> &mut Self {
        self.target = target.into();
        self
    }

    pub fn set_version(&mut self, version: Version) -> &mut Self {
        self.version = version;
        self
    }

    pub fn set_query(&mut self, query: Query) -> &mut Self {
        self.query = query;
        self
    }

    pub fn set_header<K: AsRef<str>, V: Into<String>>(&mut self, name: K, value: V) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    /// Merges `headers` into the current ones, later values win.
    pub fn set_headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.headers.extend(headers);
        self
    }

    pub fn set_content_type<S: Into<String>>(&mut self, content_type: S) -> &mut Self {
        self.headers.insert(header::CONTENT_TYPE, content_type);
        self
    }

    pub fn set_content_length(&mut self, content_length: u64) -> &mut Self {
        self.headers.insert(header::CONTENT_LENGTH, content_length.to_string());
        self
    }

    /// Replaces the body and declares its length, the message becomes fixed-length framed.
    pub fn set_body<B: AsRef<[u8]>>(&mut self, body: B) -> &mut Self {
        let body = body.as_ref();
        self.body.clear();
        self.body.extend_from_slice(body);
        self.set_content_length(body.len() as u64);
        self.framing = FramingMode::FixedLength(body.len() as u64);
        self
    }
}
