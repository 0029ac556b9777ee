use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use chainsign_core::{logging, Config};

mod error;
mod handlers;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    logging::init_from_config(&config.logging);

    let state = Arc::new(AppState::new(&config.crypto));
    let app = handlers::router(state);

    let listener = TcpListener::bind(&config.server.listen_address).await?;
    info!(
        listen_address = %config.server.listen_address,
        rsa_key_bits = config.crypto.rsa_key_bits,
        "Chainsign node listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Chainsign node stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
