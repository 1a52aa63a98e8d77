//! In-process serving metrics
//!
//! Rolling latency window plus lock-free counters. All windowed state sits
//! under a single lock so the hot path acquires at most one.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::RwLock;

/// Latency/error collector for the prediction path
pub struct PerformanceMetrics {
    window_size: usize,
    latencies: RwLock<VecDeque<f64>>,
    total_requests: AtomicU64,
    total_errors: AtomicU64,
    start_time: Instant,
}

impl PerformanceMetrics {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size,
            latencies: RwLock::new(VecDeque::with_capacity(window_size)),
            total_requests: AtomicU64::new(0),
            total_errors: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record one successful request's latency
    pub fn record_latency(&self, latency_ms: f64) {
        let mut latencies = self.latencies.write();
        latencies.push_back(latency_ms);
        if latencies.len() > self.window_size {
            latencies.pop_front();
        }
        drop(latencies);
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.total_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn avg_latency(&self) -> f64 {
        let latencies = self.latencies.read();
        if latencies.is_empty() {
            0.0
        } else {
            latencies.iter().sum::<f64>() / latencies.len() as f64
        }
    }

    /// Percentile over the rolling window via quickselect
    pub fn percentile_latency(&self, percentile: f64) -> f64 {
        let latencies = self.latencies.read();
        if latencies.is_empty() {
            return 0.0;
        }
        let mut data: Vec<f64> = latencies.iter().copied().collect();
        let idx = ((percentile / 100.0) * (data.len() - 1) as f64) as usize;
        let idx = idx.min(data.len() - 1);
        data.select_nth_unstable_by(idx, |a, b| {
            a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
        });
        data[idx]
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    pub fn total_errors(&self) -> u64 {
        self.total_errors.load(Ordering::Relaxed)
    }

    pub fn uptime_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_requests: self.total_requests(),
            total_errors: self.total_errors(),
            avg_latency_ms: self.avg_latency(),
            p50_latency_ms: self.percentile_latency(50.0),
            p95_latency_ms: self.percentile_latency(95.0),
            p99_latency_ms: self.percentile_latency(99.0),
            uptime_secs: self.uptime_secs(),
        }
    }
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self::new(1000)
    }
}

/// Point-in-time metrics snapshot
#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub total_requests: u64,
    pub total_errors: u64,
    pub avg_latency_ms: f64,
    pub p50_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub p99_latency_ms: f64,
    pub uptime_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_counters() {
        let metrics = PerformanceMetrics::new(100);
        metrics.record_latency(10.0);
        metrics.record_latency(20.0);
        metrics.record_latency(30.0);

        assert_eq!(metrics.total_requests(), 3);
        assert!((metrics.avg_latency() - 20.0).abs() < 0.01);
    }

    #[test]
    fn test_percentiles() {
        let metrics = PerformanceMetrics::new(200);
        for i in 1..=100 {
            metrics.record_latency(i as f64);
        }
        assert!((metrics.percentile_latency(50.0) - 50.0).abs() < 1.0);
        assert!((metrics.percentile_latency(99.0) - 99.0).abs() < 1.0);
    }

    #[test]
    fn test_window_bounds() {
        let metrics = PerformanceMetrics::new(10);
        for i in 0..100 {
            metrics.record_latency(i as f64);
        }
        // Window holds the last 10 samples: 90..99
        assert!((metrics.avg_latency() - 94.5).abs() < 0.01);
        assert_eq!(metrics.total_requests(), 100);
    }

    #[test]
    fn test_errors_do_not_affect_latency() {
        let metrics = PerformanceMetrics::new(10);
        metrics.record_error();
        metrics.record_error();
        assert_eq!(metrics.total_errors(), 2);
        assert_eq!(metrics.avg_latency(), 0.0);
    }
}
