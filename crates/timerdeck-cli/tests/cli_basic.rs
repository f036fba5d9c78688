//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a scratch data directory and verify
//! JSON outputs. State must survive between invocations, since every
//! subcommand is its own process.

use std::path::Path;
use std::process::Command;

fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_timerdeck"))
        .env("TIMERDECK_DATA_DIR", data_dir)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn parse_json(text: &str) -> serde_json::Value {
    serde_json::from_str(text).expect("Failed to parse JSON output")
}

#[test]
fn countdown_create_show_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["timer", "countdown", "tea", "180"]);
    assert_eq!(code, 0, "create failed: {stdout}");
    let timer = parse_json(&stdout);
    assert_eq!(timer["type"], "countdown");
    assert_eq!(timer["remaining_secs"], 180);
    assert_eq!(timer["is_running"], false);

    let id = timer["id"].as_u64().unwrap().to_string();
    let (stdout, _, code) = run_cli(dir.path(), &["timer", "show", &id]);
    assert_eq!(code, 0);
    assert_eq!(parse_json(&stdout)["label"], "tea");
}

#[test]
fn list_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["timer", "list"]);
    assert_eq!(code, 0);
    assert_eq!(parse_json(&stdout).as_array().unwrap().len(), 0);
}

#[test]
fn zero_duration_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["timer", "countdown", "bad", "0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("greater than zero"), "stderr: {stderr}");
}

#[test]
fn start_and_pause_persist_across_processes() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, _) = run_cli(dir.path(), &["timer", "countdown", "tea", "180"]);
    let id = parse_json(&stdout)["id"].as_u64().unwrap().to_string();

    let (stdout, _, code) = run_cli(dir.path(), &["timer", "start", &id]);
    assert_eq!(code, 0);
    assert_eq!(parse_json(&stdout)["is_running"], true);

    let (stdout, _, code) = run_cli(dir.path(), &["timer", "pause", &id]);
    assert_eq!(code, 0);
    let paused = parse_json(&stdout);
    assert_eq!(paused["is_running"], false);
    // At most a couple of wall-clock seconds can have passed.
    assert!(paused["remaining_secs"].as_u64().unwrap() >= 170);
}

#[test]
fn delete_then_show_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, _) = run_cli(dir.path(), &["timer", "countup", "meeting"]);
    let id = parse_json(&stdout)["id"].as_u64().unwrap().to_string();

    let (stdout, _, code) = run_cli(dir.path(), &["timer", "delete", &id]);
    assert_eq!(code, 0);
    assert!(stdout.contains("deleted"));

    let (_, _, code) = run_cli(dir.path(), &["timer", "show", &id]);
    assert_ne!(code, 0);
}

#[test]
fn dashboard_crud_and_pruning() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, _) = run_cli(dir.path(), &["timer", "countdown", "tea", "60"]);
    let id = parse_json(&stdout)["id"].as_u64().unwrap().to_string();

    let (_, _, code) = run_cli(dir.path(), &["dashboard", "create", "kitchen"]);
    assert_eq!(code, 0);
    let (_, _, code) = run_cli(dir.path(), &["dashboard", "add", "kitchen", &id]);
    assert_eq!(code, 0);

    let (stdout, _, _) = run_cli(dir.path(), &["dashboard", "show", "kitchen"]);
    let members = parse_json(&stdout)["timer_ids"].as_array().unwrap().len();
    assert_eq!(members, 1);

    // Deleting the timer prunes it from the dashboard.
    run_cli(dir.path(), &["timer", "delete", &id]);
    let (stdout, _, _) = run_cli(dir.path(), &["dashboard", "show", "kitchen"]);
    assert_eq!(parse_json(&stdout)["timer_ids"].as_array().unwrap().len(), 0);
}

#[test]
fn config_get_set_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "alerts.repeat_count"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "3");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "alerts.repeat_count", "7"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "alerts.repeat_count"]);
    assert_eq!(stdout.trim(), "7");

    let (_, _, code) = run_cli(dir.path(), &["config", "get", "nope"]);
    assert_ne!(code, 0);
}

#[test]
fn help_lists_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["--help"]);
    assert_eq!(code, 0);
    for needle in ["timer", "dashboard", "config"] {
        assert!(stdout.contains(needle), "missing '{needle}' in help");
    }
}
