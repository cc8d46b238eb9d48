//! Shared fixtures for cost-blame CLI integration tests.
//!
//! Billing exports are generated relative to the current UTC day so the
//! relative windows used by the commands always cover them.

#![allow(dead_code)]

use assert_cmd::Command;
use chrono::{Duration, Utc};
use serde_json::json;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Noon UTC on the day `days_ago` days before today.
pub fn day(days_ago: i64) -> String {
    let date = Utc::now().date_naive() - Duration::days(days_ago);
    format!("{}T12:00:00Z", date.format("%Y-%m-%d"))
}

pub fn record(days_ago: i64, service: &str, team: Option<&str>, amount: f64) -> serde_json::Value {
    let tags = team.map_or_else(|| json!({}), |t| json!({ "team": t }));
    json!({
        "timestamp": day(days_ago),
        "service": service,
        "linked_account": "111122223333",
        "region": "us-east-1",
        "usage_type": "USE1-BoxUsage",
        "tags": tags,
        "amount": amount,
    })
}

fn write_jsonl(dir: &Path, name: &str, records: &[serde_json::Value]) -> PathBuf {
    let mut body = String::new();
    for r in records {
        writeln!(body, "{}", r).unwrap();
    }
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

/// Two periods for a 7d window: EC2 +100, RDS flat, S3 -50, Lambda new at $100.
pub fn write_spike_fixture(dir: &Path) -> PathBuf {
    write_jsonl(
        dir,
        "spike.jsonl",
        &[
            // current period
            record(3, "Amazon EC2", Some("web"), 500.0),
            record(3, "Amazon RDS", Some("web"), 200.0),
            record(3, "Amazon S3", None, 50.0),
            record(2, "AWS Lambda", Some("data"), 100.0),
            // prior period
            record(10, "Amazon EC2", Some("web"), 400.0),
            record(10, "Amazon RDS", Some("web"), 200.0),
            record(10, "Amazon S3", None, 100.0),
        ],
    )
}

/// Daily history where EC2 spikes yesterday, S3 stays steady and Lambda is too short to score.
pub fn write_anomaly_fixture(dir: &Path) -> PathBuf {
    let mut records = Vec::new();
    for days_ago in 2..=15 {
        let wobble = if days_ago % 2 == 0 { 0.0 } else { 10.0 };
        records.push(record(days_ago, "Amazon EC2", None, 100.0 + wobble));
        records.push(record(days_ago, "Amazon S3", None, 50.0 + wobble / 5.0));
    }
    records.push(record(1, "Amazon EC2", None, 400.0));
    records.push(record(1, "Amazon S3", None, 51.0));
    for days_ago in 1..=3 {
        records.push(record(days_ago, "AWS Lambda", None, 5.0));
    }
    write_jsonl(dir, "history.jsonl", &records)
}

/// Command isolated from any user-level config on the developer machine.
pub fn cost_blame(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cost-blame").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env_remove("COST_BLAME_PROFILE")
        .env_remove("COST_BLAME_REGION")
        .env_remove("COST_BLAME_SLACK_WEBHOOK");
    cmd
}

pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("JSON output should be valid JSON")
}
