//! Test scenario definitions with preset implementations
//!
//! A `TestScenario` names what one iteration does (`ScenarioKind`), where it
//! sends requests, how long it pauses afterwards, and the load options it
//! runs under.

use crate::endpoint::Endpoint;
use crate::options::{duration_str, LoadOptions};
use crate::{Result, ScenarioError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// What a single iteration does
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// List the collection, then sleep
    ReadOnly,
    /// List, create, patch and delete one client, then sleep
    CrudLifecycle,
}

impl ScenarioKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::ReadOnly => "read_only",
            ScenarioKind::CrudLifecycle => "crud_lifecycle",
        }
    }
}

/// Load scenario with metadata and timing information
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestScenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: ScenarioKind,
    #[serde(default)]
    pub endpoint: Endpoint,
    /// Whether the collection is addressed as `.../client/` or `.../client`
    #[serde(default)]
    pub collection_trailing_slash: bool,
    /// Pause at the end of every successful iteration
    #[serde(with = "duration_str")]
    pub think_time: Duration,
    pub options: LoadOptions,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl TestScenario {
    /// Read-only listing, 1 s pause, 10 VUs for 10 s
    pub fn read_only() -> Self {
        Self {
            name: "read_only".to_string(),
            description: "List all clients, then pause for 1 second".to_string(),
            kind: ScenarioKind::ReadOnly,
            endpoint: Endpoint::default(),
            collection_trailing_slash: false,
            think_time: Duration::from_secs(1),
            options: LoadOptions::new(10, Duration::from_secs(10)),
            metadata: HashMap::new(),
        }
    }

    /// Read-only listing with a 3 s pause on a single VU.
    ///
    /// Runs for one pause length, so a default run is a single iteration
    /// as with k6's built-in options.
    pub fn read_only_slow() -> Self {
        Self {
            name: "read_only_slow".to_string(),
            description: "List all clients once, then pause for 3 seconds".to_string(),
            kind: ScenarioKind::ReadOnly,
            endpoint: Endpoint::default(),
            collection_trailing_slash: false,
            think_time: Duration::from_secs(3),
            options: LoadOptions::new(1, Duration::from_secs(3)),
            metadata: HashMap::new(),
        }
    }

    /// Full create/patch/delete lifecycle, 1 s pause, 50 VUs for 30 s
    pub fn crud_lifecycle() -> Self {
        let mut metadata = HashMap::new();
        metadata.insert("patch_field".to_string(), "prenom".to_string());

        Self {
            name: "crud_lifecycle".to_string(),
            description: "List, create, patch and delete a client, then pause for 1 second"
                .to_string(),
            kind: ScenarioKind::CrudLifecycle,
            endpoint: Endpoint::default(),
            collection_trailing_slash: true,
            think_time: Duration::from_secs(1),
            options: LoadOptions::new(50, Duration::from_secs(30)),
            metadata,
        }
    }

    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_think_time(mut self, think_time: Duration) -> Self {
        self.think_time = think_time;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ScenarioError::InvalidConfig(
                "scenario name cannot be empty".to_string(),
            ));
        }
        self.options.validate()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let scenario: TestScenario = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load and validate a scenario from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
