//! HTTP responses: built by a server handler, parsed incrementally by a client call.

use bytes::{Bytes, BytesMut};
use http::{Version, header};
use tracing::trace;

use crate::codec::{BodyAssembler, encode_body, encode_headers, encode_status_line, framing_mode, parse_response_head};
use crate::protocol::request::DEFAULT_CONTENT_TYPE;
use crate::protocol::{FeedStatus, FramingMode, HeaderFields, ParseError, reason_phrase};

/// Value of the `server` header of a freshly initialized response.
pub const SERVER_NAME: &str = concat!("archer-http/", env!("CARGO_PKG_VERSION"));

/// Content type given to a parsed response that does not declare one.
const FALLBACK_CONTENT_TYPE: &str = "text/plain";

#[derive(Debug)]
pub struct Response {
    version: Version,
    status: u16,
    reason: String,
    headers: HeaderFields,
    body: BytesMut,
    framing: FramingMode,
    assembler: BodyAssembler,
    head_parsed: bool,
    complete: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn new() -> Self {
        let mut response = Self {
            version: Version::HTTP_11,
            status: 200,
            reason: String::new(),
            headers: HeaderFields::new(),
            body: BytesMut::new(),
            framing: FramingMode::Unset,
            assembler: BodyAssembler::new(),
            head_parsed: false,
            complete: false,
        };
        response.init();
        response
    }

    /// Restores `HTTP/1.1 200 OK` with the default headers and an empty body.
    pub fn init(&mut self) {
        self.version = Version::HTTP_11;
        self.status = 200;
        self.reason.clear();
        self.reason.push_str(reason_phrase(200));
        self.headers.clear();
        self.headers.insert(header::SERVER, SERVER_NAME);
        self.headers.insert(header::CONNECTION, "close");
        self.headers.insert(header::DATE, http_date());
        self.headers.insert(header::CONTENT_TYPE, DEFAULT_CONTENT_TYPE);
        self.headers.insert(header::CONTENT_LENGTH, "0");
        self.body.clear();
        self.framing = FramingMode::Unset;
        self.assembler.reset();
        self.head_parsed = false;
        self.complete = false;
    }

    /// Feeds the next bytes read from the connection, see [`Request::feed`](crate::protocol::Request::feed).
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
        let head = parse_response_head(raw)?;
        let mut headers = head.headers;
        if !headers.contains(header::CONTENT_TYPE) {
            headers.insert(header::CONTENT_TYPE, FALLBACK_CONTENT_TYPE);
        }
        let framing = framing_mode(&headers)?;
        trace!(status = head.line.status, ?framing, "parsed response head");

        self.version = head.line.version;
        self.status = head.line.status;
        self.reason = head.line.reason;
        self.headers = headers;
        self.framing = framing;
        self.assembler.begin(framing);
        self.head_parsed = true;
        Ok(())
    }

    /// Serializes the status line, headers and body.
    pub fn to_wire(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(self.body.len() + 256);
        encode_status_line(self.version, self.status, &self.reason, &mut dst);
        encode_headers(&self.headers, &mut dst);
        encode_body(self.content_length(), &self.body, &mut dst);
        dst.freeze()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> &HeaderFields {
        &self.headers
    }

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

    /// Returns true if the peer is expected to close after this response.
    pub fn is_connection_close(&self) -> bool {
        self.headers.get(header::CONNECTION).is_some_and(|value| value.eq_ignore_ascii_case("close"))
    }

    /// Sets the status code and its canonical reason phrase.
    pub fn set_status_code(&mut self, status: u16) -> &mut Self {
        self.status = status;
        self.reason.clear();
        self.reason.push_str(reason_phrase(status));
        self
    }

    /// Overrides the reason phrase derived by [`Response::set_status_code`].
    pub fn set_reason<S: Into<String>>(&mut self, reason: S) -> &mut Self {
        self.reason = reason.into();
        self
    }

    pub fn set_version(&mut self, version: Version) -> &mut Self {
        self.version = version;
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

fn http_date() -> String {
    let mut buf = faf_http_date::get_date_buff_no_key();
    faf_http_date::get_date_no_key(&mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}
