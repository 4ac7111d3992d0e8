//! Load scenario definitions and presets for the client API bench
//!
//! This crate provides the data model shared by the load generator, the
//! command-line front end and the API simulator: the client record sent on
//! creation, the partial patch, the target endpoint, load options and the
//! scenario presets mirroring the k6 load scripts.

pub mod builder;
pub mod endpoint;
pub mod options;
pub mod presets;
pub mod record;
pub mod scenario;

pub use builder::ScenarioBuilder;
pub use endpoint::{Endpoint, DEFAULT_BASE_URL};
pub use options::{duration_str, parse_duration, LoadOptions};
pub use presets::Presets;
pub use record::{ClientId, ClientPatch, ClientRecord};
pub use scenario::{ScenarioKind, TestScenario};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Invalid duration '{0}'")]
    InvalidDuration(String),

    #[error("Invalid endpoint '{0}': {1}")]
    InvalidEndpoint(String, String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Creation response is not valid JSON: {0}")]
    MalformedBody(#[source] serde_json::Error),

    #[error("Creation response has no usable codcli field")]
    MissingClientId,

    #[error("Scenario file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scenario serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for scenario operations
pub type Result<T> = std::result::Result<T, ScenarioError>;
