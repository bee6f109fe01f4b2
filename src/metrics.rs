//! Engine metrics
//!
//! In-process counters for analysis runs:
//! - Atomic counters for analyses, renders and failures
//! - A ring buffer of analysis durations for percentiles
//! - Prometheus-compatible text export
//!
//! # Example
//!
//! ```rust
//! use seolens::metrics::EngineMetrics;
//! use std::time::Duration;
//!
//! let metrics = EngineMetrics::new();
//! metrics.record_analysis(Duration::from_millis(150));
//! assert!(metrics.to_prometheus_format().contains("seolens_analyses_total 1"));
//! ```

use crate::error::ErrorKind;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

/// Maximum number of duration samples to keep
const MAX_HISTOGRAM_SAMPLES: usize = 1000;

/// Thread-safe engine metrics
#[derive(Debug)]
pub struct EngineMetrics {
    /// Completed analyses
    pub analyses_total: AtomicU64,
    /// Documents obtained from a renderer
    pub renders_total: AtomicU64,
    /// Failed analyses
    pub failures_total: AtomicU64,
    /// Analyses currently running
    pub active_analyses: AtomicU32,

    durations: RwLock<RingBuffer<Duration>>,
    failures_by_kind: RwLock<BTreeMap<ErrorKind, u64>>,
}

/// Fixed-capacity sample buffer; oldest samples are overwritten
#[derive(Debug, Clone)]
struct RingBuffer<T> {
    data: Vec<T>,
    capacity: usize,
    write_pos: usize,
    total_samples: u64,
}

impl<T: Clone + Ord> RingBuffer<T> {
    fn new(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
            write_pos: 0,
            total_samples: 0,
        }
    }

    fn push(&mut self, value: T) {
        if self.data.len() < self.capacity {
            self.data.push(value);
        } else {
            self.data[self.write_pos] = value;
        }
        self.write_pos = (self.write_pos + 1) % self.capacity;
        self.total_samples += 1;
    }

    /// Nearest-rank percentile (0.0 to 1.0)
    fn percentile(&self, p: f64) -> Option<T> {
        if self.data.is_empty() {
            return None;
        }
        let mut sorted = self.data.clone();
        sorted.sort();
        let idx = ((sorted.len() as f64 - 1.0) * p).round() as usize;
        sorted.get(idx).cloned()
    }
}

/// Point-in-time copy of the metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Completed analyses
    pub analyses_total: u64,
    /// Documents rendered
    pub renders_total: u64,
    /// Failed analyses
    pub failures_total: u64,
    /// Failures per error kind
    pub failures_by_kind: BTreeMap<String, u64>,
    /// Median analysis time
    pub p50_ms: Option<u64>,
    /// 95th percentile analysis time
    pub p95_ms: Option<u64>,
    /// 99th percentile analysis time
    pub p99_ms: Option<u64>,
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineMetrics {
    /// Create an empty metrics set
    pub fn new() -> Self {
        Self {
            analyses_total: AtomicU64::new(0),
            renders_total: AtomicU64::new(0),
            failures_total: AtomicU64::new(0),
            active_analyses: AtomicU32::new(0),
            durations: RwLock::new(RingBuffer::new(MAX_HISTOGRAM_SAMPLES)),
            failures_by_kind: RwLock::new(BTreeMap::new()),
        }
    }

    /// Record a completed analysis
    pub fn record_analysis(&self, duration: Duration) {
        self.analyses_total.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut durations) = self.durations.write() {
            durations.push(duration);
        }
    }

    /// Record a document obtained from a renderer
    pub fn record_render(&self) {
        self.renders_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed analysis
    pub fn record_failure(&self, kind: ErrorKind) {
        self.failures_total.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut breakdown) = self.failures_by_kind.write() {
            *breakdown.entry(kind).or_insert(0) += 1;
        }
    }

    /// Mark an analysis as started
    pub fn inc_active(&self) {
        self.active_analyses.fetch_add(1, Ordering::Relaxed);
    }

    /// Mark an analysis as finished
    pub fn dec_active(&self) {
        self.active_analyses.fetch_sub(1, Ordering::Relaxed);
    }

    /// Duration percentile in milliseconds
    pub fn percentile_ms(&self, p: f64) -> Option<u64> {
        self.durations
            .read()
            .ok()
            .and_then(|d| d.percentile(p))
            .map(|d| d.as_millis() as u64)
    }

    /// Copy the current values
    pub fn snapshot(&self) -> MetricsSnapshot {
        let failures_by_kind = self
            .failures_by_kind
            .read()
            .map(|b| {
                b.iter()
                    .map(|(kind, count)| (kind.as_str().to_string(), *count))
                    .collect()
            })
            .unwrap_or_default();

        MetricsSnapshot {
            analyses_total: self.analyses_total.load(Ordering::Relaxed),
            renders_total: self.renders_total.load(Ordering::Relaxed),
            failures_total: self.failures_total.load(Ordering::Relaxed),
            failures_by_kind,
            p50_ms: self.percentile_ms(0.5),
            p95_ms: self.percentile_ms(0.95),
            p99_ms: self.percentile_ms(0.99),
        }
    }

    /// Convert metrics to Prometheus text format
    pub fn to_prometheus_format(&self) -> String {
        let snapshot = self.snapshot();
        let mut output = String::new();

        output.push_str(&format!(
            "seolens_analyses_total {}\n",
            snapshot.analyses_total
        ));
        output.push_str(&format!("seolens_renders_total {}\n", snapshot.renders_total));
        output.push_str(&format!(
            "seolens_failures_total {}\n",
            snapshot.failures_total
        ));
        for (kind, count) in &snapshot.failures_by_kind {
            output.push_str(&format!(
                "seolens_failures_by_kind{{kind=\"{}\"}} {}\n",
                kind, count
            ));
        }
        output.push_str(&format!(
            "seolens_active_analyses {}\n",
            self.active_analyses.load(Ordering::Relaxed)
        ));

        for (label, value) in [
            ("p50", snapshot.p50_ms),
            ("p95", snapshot.p95_ms),
            ("p99", snapshot.p99_ms),
        ] {
            if let Some(ms) = value {
                output.push_str(&format!("seolens_analysis_duration_{}_ms {}\n", label, ms));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = EngineMetrics::new();

        metrics.record_analysis(Duration::from_millis(100));
        metrics.record_render();
        metrics.record_failure(ErrorKind::NavigationFailed);
        metrics.record_failure(ErrorKind::NavigationFailed);
        metrics.record_failure(ErrorKind::UnsupportedUrlScheme);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.analyses_total, 1);
        assert_eq!(snapshot.renders_total, 1);
        assert_eq!(snapshot.failures_total, 3);
        assert_eq!(snapshot.failures_by_kind["navigation_failed"], 2);
        assert_eq!(snapshot.failures_by_kind["unsupported_url_scheme"], 1);
    }

    #[test]
    fn test_percentiles() {
        let metrics = EngineMetrics::new();
        assert_eq!(metrics.percentile_ms(0.5), None);

        for ms in 1..=100 {
            metrics.record_analysis(Duration::from_millis(ms));
        }
        assert_eq!(metrics.percentile_ms(0.0), Some(1));
        assert_eq!(metrics.percentile_ms(1.0), Some(100));
        assert_eq!(metrics.percentile_ms(0.5), Some(51));
    }

    #[test]
    fn test_ring_buffer_overwrites_oldest() {
        let mut ring = RingBuffer::new(3);
        for v in [10, 20, 30, 40] {
            ring.push(v);
        }
        assert_eq!(ring.total_samples, 4);
        assert_eq!(ring.data, vec![40, 20, 30]);
        assert_eq!(ring.percentile(0.0), Some(20));
    }

    #[test]
    fn test_prometheus_format() {
        let metrics = EngineMetrics::new();
        metrics.record_analysis(Duration::from_millis(42));
        metrics.record_failure(ErrorKind::EvaluationFailed);

        let output = metrics.to_prometheus_format();
        assert!(output.contains("seolens_analyses_total 1\n"));
        assert!(output.contains("seolens_failures_by_kind{kind=\"evaluation_failed\"} 1\n"));
        assert!(output.contains("seolens_analysis_duration_p50_ms 42\n"));
    }
}
