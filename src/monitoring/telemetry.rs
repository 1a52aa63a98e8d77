//! External metrics boundary
//!
//! The drift score is published through the `metrics` facade. A Prometheus
//! exporter is installed only when an address is configured; without a
//! recorder every gauge write is a no-op, so an unconfigured sink silently
//! disables publishing rather than erroring.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{info, warn};

/// Gauge name for the share of drifted features, in [0, 1]
pub const DRIFT_SCORE_GAUGE: &str = "data_drift_score";

/// Install the Prometheus exporter if an address is configured.
/// Exporter failures are logged and leave publishing disabled; they never
/// prevent the service from starting.
pub fn init_exporter(addr: Option<SocketAddr>) {
    match addr {
        Some(addr) => match PrometheusBuilder::new().with_http_listener(addr).install() {
            Ok(()) => {
                metrics::describe_gauge!(
                    DRIFT_SCORE_GAUGE,
                    "Share of drifted features (0 to 1)"
                );
                info!(%addr, "Prometheus metrics exporter listening");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install metrics exporter, publishing disabled");
            }
        },
        None => {
            info!("Metrics exporter disabled: METRICS_ADDR not configured");
        }
    }
}

/// Overwrite-on-set publish of the latest drift score
pub fn publish_drift_score(share: f64) {
    metrics::gauge!(DRIFT_SCORE_GAUGE).set(share);
}
