use mock_server::{Store, DEMO_EMAIL, DEMO_PASSWORD};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let email = std::env::var("PETFRIENDS_EMAIL").unwrap_or_else(|_| DEMO_EMAIL.to_string());
    let password = std::env::var("PETFRIENDS_PASSWORD").unwrap_or_else(|_| DEMO_PASSWORD.to_string());

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "listening");
    mock_server::run_with(listener, Store::with_account(&email, &password)).await
}
