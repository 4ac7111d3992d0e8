//! Preset collections of built-in scenarios

use crate::scenario::TestScenario;

/// Built-in scenarios
pub struct Presets;

impl Presets {
    /// Get all available scenarios
    pub fn all_scenarios() -> Vec<TestScenario> {
        vec![
            TestScenario::read_only(),
            TestScenario::read_only_slow(),
            TestScenario::crud_lifecycle(),
        ]
    }

    /// Look up a preset by scenario name or short alias
    pub fn find(name: &str) -> Option<TestScenario> {
        match name {
            "read_only" | "read" | "list" => Some(TestScenario::read_only()),
            "read_only_slow" | "slow" => Some(TestScenario::read_only_slow()),
            "crud_lifecycle" | "crud" => Some(TestScenario::crud_lifecycle()),
            _ => None,
        }
    }
}
