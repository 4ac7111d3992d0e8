//! Tests for the 'list' command

use assert_cmd::Command;
use predicates::prelude::*;

fn cli_command() -> Command {
    Command::cargo_bin("crud-bench").expect("Failed to find crud-bench binary")
}

#[test]
fn test_cli_list_command() {
    let mut cmd = cli_command();
    cmd.arg("list");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Available scenarios:"))
        .stdout(predicate::str::contains("read_only"))
        .stdout(predicate::str::contains("read_only_slow"))
        .stdout(predicate::str::contains("crud_lifecycle"))
        .stdout(predicate::str::contains("10 VUs for 10s, 1s pause"))
        .stdout(predicate::str::contains("1 VU for 3s, 3s pause"))
        .stdout(predicate::str::contains("50 VUs for 30s, 1s pause"));
}

#[test]
fn test_cli_list_help() {
    let mut cmd = cli_command();
    cmd.args(["list", "--help"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("List built-in scenario presets"))
        .stdout(predicate::str::contains("--verbose"));
}
