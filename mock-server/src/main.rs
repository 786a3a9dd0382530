use log::{info, warn};
use mock_server::{logger, Account};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let level = logger::level_from(std::env::var("RUST_LOG").ok().as_deref());
    if let Err(e) = logger::initialize(level) {
        eprintln!("logger unavailable: {e}");
    }

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let email = std::env::var("PETFRIENDS_EMAIL").unwrap_or_else(|_| {
        warn!("PETFRIENDS_EMAIL unset, using tester@example.com");
        "tester@example.com".to_string()
    });
    let password = std::env::var("PETFRIENDS_PASSWORD").unwrap_or_else(|_| {
        warn!("PETFRIENDS_PASSWORD unset, using the default test password");
        "secret".to_string()
    });

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!("listening on {addr} for account {email}");
    mock_server::run(listener, [Account::new(email, password)]).await
}
