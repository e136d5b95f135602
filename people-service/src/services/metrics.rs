//! Metrics collection for people-service.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Subsequent calls are no-ops.
pub fn init_metrics() -> Result<(), AppError> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::InternalError(anyhow::anyhow!(
            "failed to install Prometheus recorder: {}",
            e
        ))
    })?;

    let _ = METRICS_HANDLE.set(handle);
    Ok(())
}

/// Get metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Count one store call by operation and outcome.
pub fn record_store_operation(operation: &'static str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!(
        "people_store_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}
