//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. Each test
//! points RESTNOW_CONFIG_DIR at its own temporary directory.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(["run", "-q", "-p", "restnow-cli", "--"])
        .env("RESTNOW_CONFIG_DIR", dir)
        .env_remove("RESTNOW_ENV");
    cmd
}

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = cli(dir)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run `restnow run --json` feeding `input` on stdin.
fn run_json(dir: &Path, input: &str) -> (String, i32) {
    let mut child = cli(dir)
        .args(["run", "--json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");
    // The process may exit before reading stdin.
    let _ = child.stdin.take().unwrap().write_all(input.as_bytes());
    let output = child.wait_with_output().unwrap();
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

fn configure(dir: &Path) {
    let (_, stderr, code) = run_cli(dir, &["setup", "--work", "25m", "--rest", "5m"]);
    assert_eq!(code, 0, "setup failed: {stderr}");
    let (_, _, code) = run_cli(dir, &["config", "set", "alerts.desktop_notification", "false"]);
    assert_eq!(code, 0);
}

#[test]
fn test_config_path_honors_override() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "path"]);
    assert_eq!(code, 0);
    assert!(stdout.trim().ends_with("config.toml"));
    assert!(stdout.contains(&*dir.path().to_string_lossy()));
}

#[test]
fn test_config_get_unknown_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "get", "nope.nothing"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown config key"));
}

#[test]
fn test_config_set_then_get() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "set", "overlay.fade_steps", "4"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "overlay.fade_steps"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "4");
}

#[test]
fn test_config_list_is_json() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "list"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(parsed["durations"]["work_secs"].is_null());
    assert_eq!(parsed["overlay"]["enabled"], true);
}

#[test]
fn test_setup_stores_seconds() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["setup", "--work", "1h30m", "--rest", "10"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("90:00"));

    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "durations.work_secs"]);
    assert_eq!(stdout.trim(), "5400");
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "durations.rest_secs"]);
    assert_eq!(stdout.trim(), "600");
}

#[test]
fn test_setup_rejects_bad_input() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["setup", "--work", "0", "--rest", "5m"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("greater than zero"));

    let (_, _, code) = run_cli(dir.path(), &["setup", "--work", "25m"]);
    assert_eq!(code, 1);

    let (_, _, code) = run_cli(dir.path(), &["setup", "--work", "soon", "--rest", "5m"]);
    assert_eq!(code, 1);
}

#[test]
fn test_run_requires_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, code) = run_json(dir.path(), "q\n");
    assert_eq!(code, 1);
    assert!(stdout.is_empty());
}

#[test]
fn test_run_json_emits_events_and_obeys_commands() {
    let dir = tempfile::tempdir().unwrap();
    configure(dir.path());

    let (stdout, code) = run_json(dir.path(), "b\nq\n");
    assert_eq!(code, 0);

    let events: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events[0]["type"], "SessionStarted");
    assert_eq!(events[0]["work_secs"], 1500);
    assert_eq!(events[1]["type"], "StateSnapshot");
    assert_eq!(events[1]["label"], "25:00");

    let change = events
        .iter()
        .find(|e| e["type"] == "PhaseChanged")
        .expect("no phase change");
    assert_eq!(change["to"], "rest");
    assert_eq!(change["cause"], "start_break_now");
    assert_eq!(change["remaining_secs"], 300);
}

#[test]
fn test_run_json_settings_replace_session() {
    let dir = tempfile::tempdir().unwrap();
    configure(dir.path());

    let (stdout, code) = run_json(dir.path(), "set 50m 10m\nq\n");
    assert_eq!(code, 0);
    let started: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str::<serde_json::Value>(line).unwrap())
        .filter(|e| e["type"] == "SessionStarted")
        .collect();
    assert_eq!(started.len(), 2);
    assert_eq!(started[1]["work_secs"], 3000);

    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "durations.rest_secs"]);
    assert_eq!(stdout.trim(), "600");
}

#[test]
fn test_completions_bash() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("restnow"));
}
