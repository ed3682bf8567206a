use anyhow::Result;
use portal_client::PortalClient;
use sensor_service::{
    config::AppConfig,
    coordinator::Coordinator,
    metrics_server,
    observability,
    sensors::SensorBoard,
};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    let board = SensorBoard::default();

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr, board.clone())?;
    }

    let client = PortalClient::new(&cfg.portal.username, &cfg.portal.password)
        .with_base_url(&cfg.portal.base_url)
        .with_timeout(cfg.portal.timeout());

    tracing::info!(
        base_url = %cfg.portal.base_url,
        interval_secs = cfg.poll.interval_secs,
        "starting water portal coordinator"
    );

    let mut coordinator = Coordinator::new(client, cfg.poll.interval(), board);
    coordinator.run(shutdown_signal()).await;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "failed to listen for shutdown signal");
            futures::future::pending::<()>().await;
        }
    }
}
