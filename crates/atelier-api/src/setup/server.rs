//! Listener binding and graceful shutdown.

use anyhow::Result;
use atelier_core::constants::MAX_UPLOAD_SIZE_BYTES;
use atelier_core::Config;
use axum::Router;

/// Bind the listener and serve until a shutdown signal arrives.
pub async fn start_server(config: &Config, app: Router) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        addr = %addr,
        environment = %config.environment,
        max_upload_mb = MAX_UPLOAD_SIZE_BYTES / 1024 / 1024,
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
///
/// # Panics
/// Panics if a signal handler cannot be installed; that only happens at
/// startup and leaves no way to shut down cleanly.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Ctrl+C received, shutting down"),
        _ = terminate => tracing::info!("SIGTERM received, shutting down"),
    }
}
