//! Integration tests for configuration discovery and global flags.

mod common;

use common::{cost_blame, stdout_json, write_spike_fixture};
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_help_lists_commands() {
    let temp_dir = TempDir::new().unwrap();

    cost_blame(&temp_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("spike"))
        .stdout(predicate::str::contains("blame"))
        .stdout(predicate::str::contains("new-spend"))
        .stdout(predicate::str::contains("anomaly"));
}

#[test]
fn test_local_config_sets_input_and_json() {
    let temp_dir = TempDir::new().unwrap();
    write_spike_fixture(temp_dir.path());
    std::fs::write(
        temp_dir.path().join(".cost-blame.toml"),
        "input = \"spike.jsonl\"\n\n[output]\nformat = \"json\"\n",
    )
    .unwrap();

    let assert = cost_blame(&temp_dir).arg("spike").assert().success();

    let json = stdout_json(assert.get_output());
    assert_eq!(json["deltas"].as_array().unwrap().len(), 3);
}

#[test]
fn test_local_table_format_overrides_global_json() {
    let temp_dir = TempDir::new().unwrap();
    write_spike_fixture(temp_dir.path());
    let global_dir = temp_dir.path().join(".cost-blame");
    std::fs::create_dir_all(&global_dir).unwrap();
    std::fs::write(global_dir.join("config.toml"), "input = \"spike.jsonl\"\n\n[output]\nformat = \"json\"\n")
        .unwrap();
    std::fs::write(temp_dir.path().join(".cost-blame.toml"), "[output]\nformat = \"table\"\n").unwrap();

    cost_blame(&temp_dir)
        .arg("spike")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cost spikes"))
        .stdout(predicate::str::starts_with("{").not());
}

#[test]
fn test_global_config_is_overridden_by_explicit_config() {
    let temp_dir = TempDir::new().unwrap();
    write_spike_fixture(temp_dir.path());
    let global_dir = temp_dir.path().join(".cost-blame");
    std::fs::create_dir_all(&global_dir).unwrap();
    std::fs::write(global_dir.join("config.toml"), "input = \"missing.jsonl\"\n").unwrap();
    let explicit = temp_dir.path().join("team.toml");
    std::fs::write(&explicit, "input = \"spike.jsonl\"\n").unwrap();

    cost_blame(&temp_dir)
        .arg("--config")
        .arg(&explicit)
        .args(["spike", "--json"])
        .assert()
        .success();
}

#[test]
fn test_missing_explicit_config_fails() {
    let temp_dir = TempDir::new().unwrap();

    cost_blame(&temp_dir)
        .args(["--config", "nope.toml", "spike"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_invalid_config_value_fails() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join(".cost-blame.toml"), "[output]\nformat = \"xml\"\n").unwrap();

    cost_blame(&temp_dir)
        .arg("spike")
        .assert()
        .failure()
        .stderr(predicate::str::contains("output.format"));
}

#[test]
fn test_debug_logs_go_to_stderr() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_spike_fixture(temp_dir.path());

    let assert = cost_blame(&temp_dir)
        .arg("--input")
        .arg(&input)
        .args(["--debug", "spike", "--json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Parsed time window"));

    // stdout stays machine-readable
    stdout_json(assert.get_output());
}
