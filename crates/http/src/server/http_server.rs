use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

use crate::connection::{BufferedChannel, Channel, ConnectionId, ConnectionRegistry};
use crate::handler::Handler;
use crate::protocol::HttpError;
use crate::server::{HttpServerLoop, ServerConfig};

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// A tokio TCP transport driving an [`HttpServerLoop`].
///
/// Every accepted connection gets its own task; reads on one connection are
/// processed in order by that task.
#[derive(Debug)]
pub struct HttpServer<H> {
    config: ServerConfig,
    server_loop: HttpServerLoop<H>,
}

impl<H> HttpServer<H>
where
    H: Handler + 'static,
{
    pub fn new(config: ServerConfig, handler: H) -> Self {
        let registry = ConnectionRegistry::new(config.max_head_bytes());
        Self { config, server_loop: HttpServerLoop::with_registry(handler, registry) }
    }

    /// Replaces the default error handler, which only logs.
    pub fn error_handler<F>(mut self, f: F) -> Self
    where
        F: Fn(ConnectionId, &HttpError) + Send + Sync + 'static,
    {
        self.server_loop = self.server_loop.error_handler(f);
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Builds a multi-thread runtime sized by [`ServerConfig::worker_count`] and serves on it.
    pub fn run(self) -> io::Result<()> {
        let mut builder = tokio::runtime::Builder::new_multi_thread();
        if self.config.worker_count() > 0 {
            builder.worker_threads(self.config.worker_count());
        }
        builder.enable_all().build()?.block_on(self.serve())
    }

    /// Binds the configured address and serves until the listener fails.
    pub async fn serve(self) -> io::Result<()> {
        let tcp_listener = match TcpListener::bind(self.config.address()).await {
            Ok(tcp_listener) => tcp_listener,
            Err(e) => {
                error!(cause = %e, "bind server error");
                return Err(e);
            }
        };
        info!(address = ?tcp_listener.local_addr()?, "start listening");
        self.serve_on(tcp_listener).await
    }

    /// Serves connections accepted from an already bound listener.
    pub async fn serve_on(self, tcp_listener: TcpListener) -> io::Result<()> {
        let server_loop = Arc::new(self.server_loop);
        loop {
            let (tcp_stream, peer) = match tcp_listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let server_loop = Arc::clone(&server_loop);
            tokio::spawn(async move {
                process_connection(server_loop, tcp_stream, peer).await;
            });
        }
    }
}

async fn process_connection<H: Handler>(server_loop: Arc<HttpServerLoop<H>>, tcp_stream: TcpStream, peer: SocketAddr) {
    let id = ConnectionId::next();
    server_loop.on_connect(id, peer);

    let (mut reader, mut writer) = tcp_stream.into_split();
    let mut channel = BufferedChannel::new(id);
    let mut read_buf = BytesMut::with_capacity(READ_BUFFER_SIZE);

    loop {
        read_buf.clear();
        match reader.read_buf(&mut read_buf).await {
            Ok(0) => break,
            Ok(_) => {
                server_loop.on_read(&mut channel, &read_buf);
                if let Err(e) = channel.flush(&mut writer).await {
                    server_loop.on_error(id, e);
                    break;
                }
                if channel.is_closed() {
                    if let Err(e) = writer.shutdown().await {
                        error!(%id, cause = %e, "shutdown connection error");
                    }
                    break;
                }
            }
            Err(e) => {
                server_loop.on_error(id, e);
                break;
            }
        }
    }

    server_loop.on_close(channel.id());
}
