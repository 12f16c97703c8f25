//! DataTrail ingestion server binary.
//!
//! ## Configuration
//! All configuration is done via environment variables:
//!
//! - `DATATRAIL_AUTH_URL`: credential check endpoint (required)
//! - `DATATRAIL_DATA_DIR`: root directory for log file pairs (default: ./data)
//! - `DATATRAIL_LISTEN_ADDR`: bind address (default: 0.0.0.0:8080)
//! - `DATATRAIL_AUTH_TIMEOUT_SECS`: credential round-trip timeout (default: 30)
//! - `RUST_LOG`: tracing filter (default: info)

use std::net::SocketAddr;
use std::sync::Arc;

use datatrail_server::{create_router, AppState, Authenticator, ServerConfig};
use datatrail_storage::IndexedLog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    std::fs::create_dir_all(&config.data_dir)?;

    let state = AppState {
        log: Arc::new(IndexedLog::new(&config.data_dir)),
        auth: Arc::new(Authenticator::new(
            config.auth_url.clone(),
            config.auth_timeout(),
        )?),
    };

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(
        addr = %config.listen_addr,
        data_dir = %config.data_dir.display(),
        "datatrail ingestion server listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
