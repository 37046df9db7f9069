pub mod auth;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::ServerError;
pub use state::{AppState, SharedState};

use eyre::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;

/// Serves the API until `token` is cancelled, then drains in-flight requests.
pub async fn serve(state: SharedState, config: &ServerConfig, token: CancellationToken) -> Result<()> {
    let app = routes::build(state, config);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .wrap_err(format!("binding {}", config.bind_address))?;
    log::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { token.cancelled().await })
        .await
        .wrap_err("serving http")?;

    log::info!("Server stopped");
    Ok(())
}
