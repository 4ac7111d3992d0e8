//! Tests for the 'run' and 'iterate' commands against an in-process simulator

use assert_cmd::Command;
use client_api_sim::ClientStore;
use predicates::prelude::*;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

fn cli_command() -> Command {
    Command::cargo_bin("crud-bench").expect("Failed to find crud-bench binary")
}

/// Keeps the simulator alive for as long as the runtime is held
struct Simulator {
    _runtime: Runtime,
    addr: SocketAddr,
    store: Arc<ClientStore>,
}

impl Simulator {
    fn start() -> Self {
        let runtime = Runtime::new().unwrap();
        let store = Arc::new(ClientStore::new());
        let (addr, _handle) = runtime
            .block_on(client_api_sim::spawn_local(
                store.clone(),
                CancellationToken::new(),
            ))
            .unwrap();
        Self {
            _runtime: runtime,
            addr,
            store,
        }
    }

    fn base_url(&self) -> String {
        format!("http://{}/api/v1/client", self.addr)
    }
}

#[test]
fn test_cli_run_help() {
    let mut cmd = cli_command();
    cmd.args(["run", "--help"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Run a load scenario"))
        .stdout(predicate::str::contains("--vus"))
        .stdout(predicate::str::contains("--duration"))
        .stdout(predicate::str::contains("--base-url"));
}

#[test]
fn test_cli_run_invalid_scenario() {
    let mut cmd = cli_command();
    cmd.args(["run", "nonexistent_scenario"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Scenario 'nonexistent_scenario' not found"));
}

#[test]
fn test_cli_run_rejects_zero_vus() {
    let mut cmd = cli_command();
    cmd.args(["run", "crud", "--vus", "0"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("vus must be at least 1"));
}

#[test]
fn test_cli_run_rejects_malformed_base_url() {
    let mut cmd = cli_command();
    cmd.args(["run", "crud", "--base-url", "http://host:notaport/api/v1/client"]);
    cmd.timeout(Duration::from_secs(30));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid endpoint"))
        .stdout(predicate::str::contains("Scenario:").not());
}

#[test]
fn test_cli_run_crud_against_simulator() {
    let sim = Simulator::start();

    let mut cmd = cli_command();
    cmd.args([
        "run",
        "crud",
        "--vus",
        "2",
        "--duration",
        "500ms",
        "--base-url",
        &sim.base_url(),
    ]);
    cmd.timeout(Duration::from_secs(30));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Scenario: crud_lifecycle"))
        .stdout(predicate::str::contains("create_client"))
        .stdout(predicate::str::contains("delete_client"))
        .stdout(predicate::str::contains("0 aborted"));
    assert!(sim.store.is_empty());
}

#[test]
fn test_cli_run_scenario_file_with_json_output() {
    let sim = Simulator::start();

    let scenario = format!(
        r#"{{
            "name": "quick_read",
            "kind": "read_only",
            "endpoint": "{}",
            "think_time": "50ms",
            "options": {{ "vus": 1, "duration": "200ms" }}
        }}"#,
        sim.base_url()
    );
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(scenario.as_bytes()).unwrap();

    let mut cmd = cli_command();
    cmd.args(["run", file.path().to_str().unwrap(), "--json"]);
    cmd.timeout(Duration::from_secs(30));

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let snapshot: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(snapshot["total_requests"].as_u64().unwrap() >= 1);
    assert_eq!(snapshot["total_failures"], 0);
}

#[test]
fn test_cli_iterate_against_simulator() {
    let sim = Simulator::start();

    let mut cmd = cli_command();
    cmd.args([
        "iterate",
        "crud",
        "--base-url",
        &sim.base_url(),
        "--vu",
        "3",
        "--iteration",
        "7",
    ]);
    cmd.timeout(Duration::from_secs(30));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Iteration completed (codcli 1)"))
        .stdout(predicate::str::contains("patch_client"));
    assert!(sim.store.is_empty());
}

#[test]
fn test_cli_iterate_unreachable_target_aborts() {
    let mut cmd = cli_command();
    cmd.args(["iterate", "crud", "--base-url", "http://127.0.0.1:9/api/v1/client"]);
    cmd.timeout(Duration::from_secs(30));

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("Iteration aborted"));
}
