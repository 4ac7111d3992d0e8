//! Metrics collection and aggregation for load runs

use crate::Result;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Outcome of one HTTP request as seen by a virtual user
#[derive(Debug, Clone)]
pub struct RequestSample {
    pub name: &'static str,
    pub method: &'static str,
    /// `None` when the transport failed before a response arrived
    pub status: Option<u16>,
    pub latency: Duration,
}

impl RequestSample {
    pub fn is_failure(&self) -> bool {
        !matches!(self.status, Some(status) if (200..300).contains(&status))
    }
}

/// Statistics for a single logical request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestStats {
    pub name: String,
    pub method: String,
    pub requests: u64,
    pub failures: u64,
    pub failure_rate: f64,
    pub avg_latency_ms: f64,
    pub max_latency_ms: f64,
    pub last_status: Option<u16>,
    pub last_updated: DateTime<Utc>,
}

/// Iteration counters across all virtual users
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationStats {
    pub completed: u64,
    pub aborted: u64,
}

impl IterationStats {
    pub fn total(&self) -> u64 {
        self.completed + self.aborted
    }
}

/// Complete metrics snapshot at a point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub run_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
    pub total_requests: u64,
    pub total_failures: u64,
    pub iterations: IterationStats,
    /// Sorted by request name
    pub requests: Vec<RequestStats>,
}

impl MetricsSnapshot {
    pub fn request(&self, name: &str) -> Option<&RequestStats> {
        self.requests.iter().find(|r| r.name == name)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "run {} ({} ms)", self.run_id, self.duration_ms)?;
        writeln!(
            f,
            "  iterations: {} completed, {} aborted",
            self.iterations.completed, self.iterations.aborted
        )?;
        writeln!(
            f,
            "  requests:   {} total, {} failed",
            self.total_requests, self.total_failures
        )?;
        for r in &self.requests {
            writeln!(
                f,
                "  {:<14} {:<6} {:>7} req {:>6} failed  avg {:>8.2} ms  max {:>8.2} ms",
                r.name, r.method, r.requests, r.failures, r.avg_latency_ms, r.max_latency_ms
            )?;
        }
        Ok(())
    }
}

/// Collects metrics for one logical request
pub struct RequestMetricsCollector {
    name: &'static str,
    method: &'static str,
    last_updated: parking_lot::RwLock<DateTime<Utc>>,

    // Atomic counters for thread-safe updates
    requests: AtomicU64,
    failures: AtomicU64,
    total_latency_us: AtomicU64,
    max_latency_us: AtomicU64,
    /// 0 means no status seen yet (or last request had none)
    last_status: AtomicU64,
}

impl RequestMetricsCollector {
    pub fn new(name: &'static str, method: &'static str) -> Self {
        Self {
            name,
            method,
            last_updated: parking_lot::RwLock::new(Utc::now()),
            requests: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            total_latency_us: AtomicU64::new(0),
            max_latency_us: AtomicU64::new(0),
            last_status: AtomicU64::new(0),
        }
    }

    /// Record one request outcome
    pub fn record(&self, sample: &RequestSample) {
        let latency_us = u64::try_from(sample.latency.as_micros()).unwrap_or(u64::MAX);

        self.requests.fetch_add(1, Ordering::Relaxed);
        if sample.is_failure() {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
        self.total_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);
        self.max_latency_us.fetch_max(latency_us, Ordering::Relaxed);
        self.last_status
            .store(sample.status.map_or(0, u64::from), Ordering::Relaxed);
        *self.last_updated.write() = Utc::now();
    }

    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Get current statistics for this request
    pub fn get_stats(&self) -> RequestStats {
        let requests = self.requests();
        let failures = self.failures();
        let total_latency_us = self.total_latency_us.load(Ordering::Relaxed);
        let max_latency_us = self.max_latency_us.load(Ordering::Relaxed);
        let last_status = match self.last_status.load(Ordering::Relaxed) {
            0 => None,
            status => u16::try_from(status).ok(),
        };

        let (failure_rate, avg_latency_ms) = if requests > 0 {
            (
                failures as f64 / requests as f64,
                total_latency_us as f64 / requests as f64 / 1000.0,
            )
        } else {
            (0.0, 0.0)
        };

        RequestStats {
            name: self.name.to_string(),
            method: self.method.to_string(),
            requests,
            failures,
            failure_rate,
            avg_latency_ms,
            max_latency_ms: max_latency_us as f64 / 1000.0,
            last_status,
            last_updated: *self.last_updated.read(),
        }
    }
}

/// Main metrics collector that aggregates data from all virtual users
pub struct MetricsCollector {
    run_id: Uuid,
    start_time: DateTime<Utc>,
    request_collectors: DashMap<&'static str, Arc<RequestMetricsCollector>>,
    iterations_completed: AtomicU64,
    iterations_aborted: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            start_time: Utc::now(),
            request_collectors: DashMap::new(),
            iterations_completed: AtomicU64::new(0),
            iterations_aborted: AtomicU64::new(0),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Record a request, creating its collector on first use
    pub fn record_request(&self, sample: RequestSample) {
        let collector = self
            .request_collectors
            .entry(sample.name)
            .or_insert_with(|| Arc::new(RequestMetricsCollector::new(sample.name, sample.method)))
            .value()
            .clone();
        collector.record(&sample);

        let status = sample
            .status
            .map_or_else(|| "none".to_string(), |s| s.to_string());
        metrics::counter!(
            "crud_bench_requests_total",
            1,
            "request" => sample.name,
            "method" => sample.method,
            "status" => status
        );
        metrics::histogram!(
            "crud_bench_request_duration_seconds",
            sample.latency.as_secs_f64(),
            "request" => sample.name
        );
        if sample.is_failure() {
            metrics::counter!(
                "crud_bench_request_failures_total",
                1,
                "request" => sample.name
            );
            tracing::debug!(
                request = sample.name,
                status = ?sample.status,
                "Request failed"
            );
        }
    }

    pub fn record_iteration_completed(&self) {
        self.iterations_completed.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("crud_bench_iterations_total", 1, "outcome" => "completed");
    }

    pub fn record_iteration_aborted(&self) {
        self.iterations_aborted.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("crud_bench_iterations_total", 1, "outcome" => "aborted");
    }

    pub fn iterations(&self) -> IterationStats {
        IterationStats {
            completed: self.iterations_completed.load(Ordering::Relaxed),
            aborted: self.iterations_aborted.load(Ordering::Relaxed),
        }
    }

    /// Get metrics collector for a specific request
    pub fn get_request(&self, name: &str) -> Option<Arc<RequestMetricsCollector>> {
        self.request_collectors
            .get(name)
            .map(|r| r.value().clone())
    }

    /// Take a complete metrics snapshot
    pub fn take_snapshot(&self) -> MetricsSnapshot {
        let timestamp = Utc::now();
        let duration_ms = (timestamp - self.start_time).num_milliseconds().max(0) as u64;

        let mut requests: Vec<RequestStats> = self
            .request_collectors
            .iter()
            .map(|entry| entry.value().get_stats())
            .collect();
        requests.sort_by(|a, b| a.name.cmp(&b.name));

        MetricsSnapshot {
            run_id: self.run_id,
            start_time: self.start_time,
            timestamp,
            duration_ms,
            total_requests: requests.iter().map(|r| r.requests).sum(),
            total_failures: requests.iter().map(|r| r.failures).sum(),
            iterations: self.iterations(),
            requests,
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
