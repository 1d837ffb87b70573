use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mock_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let raw_latency = std::env::var("MOCK_LATENCY_MS").ok();
    let latency = mock_server::parse_latency(raw_latency.as_deref()).map_err(|e| {
        tracing::error!(value = ?raw_latency, error = %e, "invalid MOCK_LATENCY_MS");
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("MOCK_LATENCY_MS must be a whole number of milliseconds: {e}"),
        )
    })?;

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, latency = ?latency, "listening");

    match latency {
        Some(latency) => mock_server::run_with_latency(listener, latency).await,
        None => mock_server::run(listener).await,
    }
}
