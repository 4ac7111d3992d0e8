//! Observability and metrics collection for the client API bench
//!
//! Every HTTP request issued by a virtual user is recorded here, keyed by
//! the logical request name (`list_clients`, `create_client`, ...). Counts
//! are kept in atomics for the end-of-run summary and mirrored to the
//! `metrics` facade so any installed recorder sees them too.
//!
//! A request counts as failed when the transport gave up or the status is
//! outside 2xx. Failures are only counted; nothing here stops a run.

pub mod metrics;

pub use crate::metrics::{
    IterationStats, MetricsCollector, MetricsSnapshot, RequestMetricsCollector, RequestSample,
    RequestStats,
};

/// Errors that can occur in the observability system
#[derive(thiserror::Error, Debug)]
pub enum ObservabilityError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for observability operations
pub type Result<T> = std::result::Result<T, ObservabilityError>;
