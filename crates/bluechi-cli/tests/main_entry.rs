//! Integration tests for the `bluechictl` binary entry point.
//!
//! Covers help output, usage errors, configuration errors, and the failure
//! reported when the configured bus cannot be reached.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;

#[test]
fn help_lists_the_commands() {
    let mut command = cargo_bin_cmd!("bluechictl");
    command.arg("--help");
    command
        .assert()
        .success()
        .stdout(contains("list-nodes"))
        .stdout(contains("set-log-level"));
}

#[test]
fn missing_unit_argument_exits_with_failure() {
    let mut command = cargo_bin_cmd!("bluechictl");
    command.args(["start", "node-a"]);
    command.assert().failure().stderr(contains("<UNIT>"));
}

#[test]
fn invalid_bus_address_is_a_configuration_error() {
    let mut command = cargo_bin_cmd!("bluechictl");
    command.args(["--bus", "carrier-pigeon:coop=1", "list-nodes"]);
    command
        .assert()
        .failure()
        .stderr(contains("failed to load configuration"));
}

#[test]
fn unreachable_bus_exits_with_failure() {
    let mut command = cargo_bin_cmd!("bluechictl");
    command
        .env("BLUECHI_LOG_FILTER", "off")
        .args([
            "--bus",
            "unix:path=/nonexistent/bluechi-test.sock",
            "--call-timeout-ms",
            "500",
            "list-nodes",
        ]);
    command
        .assert()
        .failure()
        .stderr(contains("failed to connect to the unix:path=/nonexistent/bluechi-test.sock bus"));
}
