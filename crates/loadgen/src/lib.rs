//! Virtual-user load generator for the client REST API
//!
//! A `ScenarioRunner` performs one iteration of a `TestScenario` over an
//! `HttpTransport`; an `Executor` runs that iteration in a loop on a fixed
//! number of virtual users until the configured duration elapses.
//!
//! Nothing is retried. Failed requests are counted in the shared
//! `MetricsCollector` and the run carries on; the only failure handled
//! inside an iteration is an unusable creation response, which ends that
//! iteration early.

pub mod executor;
pub mod runner;
pub mod transport;

// Re-export commonly used types
pub use executor::{Executor, RunSummary};
pub use runner::{IterationContext, IterationOutcome, ScenarioRunner};
pub use scenarios::{LoadOptions, ScenarioKind, TestScenario};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport, TransportError};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadgenError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] scenarios::ScenarioError),

    #[error("Transport setup error: {0}")]
    Transport(#[from] TransportError),

    #[error("Virtual user task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
