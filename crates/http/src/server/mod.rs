//! Server side orchestration.
//!
//! - [`ServerConfig`]: validated options, built with [`ServerConfig::builder`]
//! - [`HttpServerLoop`]: transport independent request/response cycle per connection
//! - [`HttpServer`]: tokio TCP transport driving an [`HttpServerLoop`]
//!
//! # Example
//!
//! ```no_run
//! use archer_http::handler::make_handler;
//! use archer_http::protocol::{Request, Response};
//! use archer_http::server::{HttpServer, ServerConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::builder().address("127.0.0.1:8080").worker_count(2).build()?;
//!     let handler = make_handler(|_request: &Request, response: &mut Response| {
//!         response.set_content_type("text/plain").set_body("Hello World!\r\n");
//!         Ok::<_, std::io::Error>(())
//!     });
//!     HttpServer::new(config, handler).run()?;
//!     Ok(())
//! }
//! ```

mod config;
mod http_server;
mod server_loop;

pub use config::{ConfigError, MAX_WORKER_COUNT, ServerConfig, ServerConfigBuilder};
pub use http_server::HttpServer;
pub use server_loop::{ErrorHandler, HttpServerLoop, SERVICE_ERROR_BODY, SERVICE_ERROR_STATUS};
