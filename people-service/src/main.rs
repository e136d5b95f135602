use people_service::config::PeopleConfig;
use people_service::services::init_metrics;
use people_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = PeopleConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        "people-service",
        &config.common.log_level,
        config.otlp_endpoint.as_deref(),
    );

    // Must be installed before any metrics are recorded
    init_metrics().map_err(|e| {
        tracing::error!("Failed to initialize metrics: {}", e);
        std::io::Error::other(format!("Metrics error: {}", e))
    })?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
