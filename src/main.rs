use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};
use will_generator::cerebras::{CerebrasClient, DEFAULT_BASE_URL};
use will_generator::routes::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let cerebras = match std::env::var("CEREBRAS_AI_API_KEY") {
        Ok(key) if !key.is_empty() => {
            tracing::info!("Using API key: {}...", &key[..std::cmp::min(10, key.len())]);
            let base_url = std::env::var("CEREBRAS_API_BASE")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
            Some(Arc::new(CerebrasClient::new(key, base_url)))
        }
        _ => {
            // Still serve, so the contract's configuration error reaches callers.
            tracing::error!("Missing CEREBRAS_AI_API_KEY environment variable; all requests will fail");
            None
        }
    };

    let app = app(AppState { cerebras });

    let port: u16 = std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
