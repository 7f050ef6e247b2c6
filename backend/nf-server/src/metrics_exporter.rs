use crate::error::{Result as ServerErrorResult, ServerError};

use log::info;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder
pub fn install() -> ServerErrorResult<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Metrics {
            message: e.to_string(),
        })?;

    info!("Prometheus recorder installed");
    Ok(handle)
}

/// GET /metrics - Prometheus text exposition
pub async fn render(handle: PrometheusHandle) -> String {
    handle.render()
}
