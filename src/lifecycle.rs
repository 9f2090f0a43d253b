//! Process lifecycle: logging setup and graceful shutdown.

use tracing_subscriber::EnvFilter;

/// Initialize logging with tracing_subscriber.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info")
            .add_directive("chromiumoxide=warn".parse().unwrap())
            .add_directive("tower_http=info".parse().unwrap())
            .add_directive("pageaudit=debug".parse().unwrap())
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .with_target(false)
        .with_ansi(true)
        .init();
}

/// Resolve when the process receives Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
