use archer_http::client::{ClientOptions, request};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let url = std::env::args().nth(1).unwrap_or_else(|| "http://127.0.0.1:8080/".to_string());
    match request(&url, ClientOptions::default()).await {
        Ok(response) => {
            info!(status = response.status(), reason = response.reason(), "got response");
            for (name, value) in response.headers() {
                info!("{name}: {value}");
            }
            println!("{}", String::from_utf8_lossy(response.body()));
        }
        Err(e) => error!(cause = %e, url, "request failed"),
    }
}
