//! Client side: one request per connection, resolved by the complete response.
//!
//! [`HttpClientCall`] holds the transport independent state of a call, [`request`]
//! drives it over a tokio [`TcpStream`]. Transport security is not provided, `https`
//! URLs are rejected with [`ClientError::UnsupportedScheme`].
//!
//! ```no_run
//! use archer_http::client::{ClientOptions, request};
//!
//! # async fn fetch() -> Result<(), archer_http::client::ClientError> {
//! let response = request("http://127.0.0.1:8080/hello", ClientOptions::default()).await?;
//! println!("{} {}", response.status(), String::from_utf8_lossy(response.body()));
//! # Ok(())
//! # }
//! ```

mod client_call;
mod error;

pub use client_call::{ClientOptions, DEFAULT_ACCEPT, DEFAULT_PORT, HttpClientCall, USER_AGENT};
pub use error::ClientError;

use bytes::BytesMut;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tracing::info;

use crate::connection::{BufferedChannel, Channel, ConnectionId};
use crate::protocol::Response;

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Sends one request to `url` over a new TCP connection and waits for the whole response.
pub async fn request(url: &str, options: ClientOptions) -> Result<Response, ClientError> {
    let mut call = HttpClientCall::new(url, options)?;

    let tcp_stream = TcpStream::connect((call.host(), call.port())).await?;
    let (mut reader, mut writer) = tcp_stream.into_split();
    let mut channel = BufferedChannel::new(ConnectionId::next());

    call.on_connect(&mut channel);
    channel.flush(&mut writer).await?;

    let mut read_buf = BytesMut::with_capacity(READ_BUFFER_SIZE);
    while !channel.is_closed() {
        read_buf.clear();
        if reader.read_buf(&mut read_buf).await? == 0 {
            return Err(ClientError::ConnectionClosed);
        }
        call.on_read(&mut channel, &read_buf)?;
    }

    info!(id = %channel.id(), status = call.response().status(), "response complete");
    Ok(call.into_response())
}
