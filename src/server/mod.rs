//! HTTP server.
//!
//! ```text
//! Browser ──HTTP──► axum router
//!                        │
//!                        ├─► handlers ──► render_route ──► ContentStore (try_join)
//!                        │                      │
//!                        │                      └─► render::* (maud)
//!                        │
//!                        └─► ETag / Cache-Control, 404 and 503 pages
//! ```

mod app;
mod error;
mod handlers;
mod state;

use std::sync::Arc;

pub use app::create_router;
pub use error::{ErrorPage, ServerError};
pub use handlers::{Route, render_route};
pub use state::AppState;

/// Bind the configured address and serve until Ctrl-C.
pub async fn run_server(state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind((state.config.server.host.as_str(), state.config.server.port)).await?;
    let addr = listener.local_addr()?;
    let app = create_router(Arc::new(state));

    tracing::info!(address = %addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Resolves on Ctrl-C. If the handler cannot be installed the server runs
/// until killed.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received, stopping server"),
        Err(err) => {
            tracing::warn!(error = %err, "could not install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    }
}
