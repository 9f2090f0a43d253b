use std::sync::Arc;

use anyhow::Context;

use pageaudit::browser::ChromeLauncher;
use pageaudit::commands::{router, AppState};
use pageaudit::config::AuditConfig;
use pageaudit::lifecycle::{init_logging, shutdown_signal};
use pageaudit::service::{ExternalAnalyzer, LighthouseAnalyzer, SiteAuditor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let config = AuditConfig::from_env();

    let lighthouse = LighthouseAnalyzer::new(&config);
    if !lighthouse.is_available().await {
        tracing::warn!(
            "Lighthouse CLI '{}' not found; accessibility and best practices will be unavailable",
            config.lighthouse_bin
        );
    }
    let external: Arc<dyn ExternalAnalyzer> = Arc::new(lighthouse);

    let launcher = Arc::new(ChromeLauncher::new(&config));
    let auditor = SiteAuditor::new(launcher, Some(external), config.clone());
    let app = router(Arc::new(AppState { auditor: Arc::new(auditor) }));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("pageaudit listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}
