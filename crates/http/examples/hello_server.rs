use std::error::Error;

use archer_http::handler::make_handler;
use archer_http::protocol::{Request, Response};
use archer_http::server::{HttpServer, ServerConfig};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = match ServerConfig::builder().address("127.0.0.1:8080").worker_count(2).build() {
        Ok(config) => config,
        Err(e) => {
            error!(cause = %e, "invalid server config");
            return;
        }
    };

    info!(port = 8080, "start listening");
    let server = HttpServer::new(config, make_handler(hello_world))
        .error_handler(|id, e| error!(%id, cause = %e, "request failed"));
    if let Err(e) = server.run() {
        error!(cause = %e, "server stopped");
    }
}

fn hello_world(request: &Request, response: &mut Response) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!(method = %request.method(), path = request.target(), "receiving request");
    if !request.body().is_empty() {
        info!(body = %String::from_utf8_lossy(request.body()), "receiving request body");
    }

    response.set_status_code(200).set_content_type(mime::TEXT_PLAIN_UTF_8.as_ref()).set_body("Hello World!\r\n");
    Ok(())
}
