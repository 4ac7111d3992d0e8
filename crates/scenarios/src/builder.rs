//! Builder pattern for creating custom test scenarios

use crate::endpoint::Endpoint;
use crate::options::LoadOptions;
use crate::scenario::{ScenarioKind, TestScenario};
use std::collections::HashMap;
use std::time::Duration;

/// Scenario builder for creating custom scenarios
pub struct ScenarioBuilder {
    name: String,
    description: String,
    kind: ScenarioKind,
    endpoint: Endpoint,
    trailing_slash: bool,
    think_time: Duration,
    options: LoadOptions,
    metadata: HashMap<String, String>,
}

impl ScenarioBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            kind: ScenarioKind::CrudLifecycle,
            endpoint: Endpoint::default(),
            trailing_slash: true,
            think_time: Duration::from_secs(1),
            options: LoadOptions::default(),
            metadata: HashMap::new(),
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn kind(mut self, kind: ScenarioKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn trailing_slash(mut self, trailing_slash: bool) -> Self {
        self.trailing_slash = trailing_slash;
        self
    }

    pub fn think_time(mut self, think_time: Duration) -> Self {
        self.think_time = think_time;
        self
    }

    pub fn vus(mut self, vus: u32) -> Self {
        self.options.vus = vus;
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.options.duration = duration;
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> TestScenario {
        TestScenario {
            name: self.name,
            description: self.description,
            kind: self.kind,
            endpoint: self.endpoint,
            collection_trailing_slash: self.trailing_slash,
            think_time: self.think_time,
            options: self.options,
            metadata: self.metadata,
        }
    }
}
