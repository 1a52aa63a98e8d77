//! Serving metrics and the external telemetry boundary

mod metrics;
mod telemetry;

pub use self::metrics::{MetricsSummary, PerformanceMetrics};
pub use self::telemetry::{init_exporter, publish_drift_score, DRIFT_SCORE_GAUGE};
