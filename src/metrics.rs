//! Request metrics and statistics tracking for the prediction page.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

use crate::types::prediction::Prediction;

/// Metrics collector for prediction requests
pub struct AppMetrics {
    /// Successful predictions
    pub predictions_served: AtomicU64,
    /// Submits that ended on the error path
    pub prediction_failures: AtomicU64,
    /// Predictions per cluster id
    cluster_counts: RwLock<BTreeMap<usize, u64>>,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Start time for rate calculation
    start_time: Instant,
    started_at: DateTime<Utc>,
}

impl AppMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            predictions_served: AtomicU64::new(0),
            prediction_failures: AtomicU64::new(0),
            cluster_counts: RwLock::new(BTreeMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }

    /// Record a successful prediction
    pub fn record_prediction(&self, processing_time: Duration, prediction: &Prediction) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);
        self.record_time(processing_time);

        if let Prediction::Cluster(id) = prediction {
            if let Ok(mut counts) = self.cluster_counts.write() {
                *counts.entry(*id).or_insert(0) += 1;
            }
        }
    }

    /// Record a submit that failed in form parsing or inference
    pub fn record_failure(&self, processing_time: Duration) {
        self.prediction_failures.fetch_add(1, Ordering::Relaxed);
        self.record_time(processing_time);
    }

    fn record_time(&self, processing_time: Duration) {
        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only last 10000 for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }
    }

    pub fn predictions(&self) -> u64 {
        self.predictions_served.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.prediction_failures.load(Ordering::Relaxed)
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let times = match self.processing_times.read() {
            Ok(times) => times,
            Err(_) => return ProcessingStats::default(),
        };
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: sorted[count - 1],
        }
    }

    /// Get current throughput (requests per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            (self.predictions() + self.failures()) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get predictions per cluster id
    pub fn get_cluster_counts(&self) -> BTreeMap<usize, u64> {
        self.cluster_counts
            .read()
            .map(|counts| counts.clone())
            .unwrap_or_default()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let served = self.predictions();
        let failed = self.failures();
        let total = served + failed;
        let failure_rate = if total > 0 {
            (failed as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        let processing = self.get_processing_stats();

        info!(
            predictions = served,
            failures = failed,
            failure_rate = format!("{:.1}%", failure_rate),
            throughput = format!("{:.2} req/s", self.get_throughput()),
            uptime_secs = self.uptime().as_secs(),
            "Prediction metrics summary"
        );
        info!(
            mean_us = processing.mean_us,
            p50_us = processing.p50_us,
            p95_us = processing.p95_us,
            p99_us = processing.p99_us,
            max_us = processing.max_us,
            "Prediction latency"
        );
        for (cluster, count) in self.get_cluster_counts() {
            let pct = if served > 0 {
                (count as f64 / served as f64) * 100.0
            } else {
                0.0
            };
            info!(cluster, count, share = format!("{:.1}%", pct), "Cluster assignments");
        }
    }
}

impl Default for AppMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Periodic metrics reporter
pub struct MetricsReporter {
    metrics: Arc<AppMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<AppMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs.max(1)));
        // First tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = AppMetrics::new();

        metrics.record_prediction(Duration::from_micros(100), &Prediction::Cluster(1));
        metrics.record_prediction(Duration::from_micros(200), &Prediction::Cluster(1));
        metrics.record_prediction(Duration::from_micros(300), &Prediction::Scalar(4.2));
        metrics.record_failure(Duration::from_micros(50));

        assert_eq!(metrics.predictions(), 3);
        assert_eq!(metrics.failures(), 1);

        let counts = metrics.get_cluster_counts();
        assert_eq!(counts.get(&1), Some(&2));
        assert_eq!(counts.len(), 1);
    }

    #[test]
    fn test_processing_stats() {
        let metrics = AppMetrics::new();
        assert_eq!(metrics.get_processing_stats(), ProcessingStats::default());

        for us in [10, 20, 30, 40] {
            metrics.record_failure(Duration::from_micros(us));
        }

        let stats = metrics.get_processing_stats();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean_us, 25);
        assert_eq!(stats.p50_us, 30);
        assert_eq!(stats.max_us, 40);
    }
}
