//! End-to-end tests for the `taskdeck` CLI.
//!
//! Each test gets its own temp directory holding the config file, the
//! database and the log, and runs the built binary as a subprocess.

use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn taskdeck(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_taskdeck"))
        .arg("--config")
        .arg(dir.join("config.toml"))
        .arg("--database")
        .arg(dir.join("tasks.db"))
        .args(args)
        .env_remove("TASKDECK_LOG")
        .env("XDG_CONFIG_HOME", dir)
        .env("XDG_DATA_HOME", dir)
        .output()
        .expect("failed to run taskdeck")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn add(dir: &Path, title: &str, priority: &str, due: &str) -> Output {
    taskdeck(
        dir,
        &["add", title, "--description", "2%", "--due", due, "--priority", priority],
    )
}

#[test]
fn add_then_list() {
    let tmp = TempDir::new().unwrap();
    let out = add(tmp.path(), "Buy milk", "low", "01/01/2099");
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "Task created successfully (ID: 1)\n");

    let out = taskdeck(tmp.path(), &["list"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "[ ] #1 Buy milk (low, due 01/01/2099) - 2%\n");

    assert!(tmp.path().join("config.toml").exists());
    assert!(tmp.path().join("taskdeck.log").exists());
}

#[test]
fn list_is_empty_on_fresh_database() {
    let tmp = TempDir::new().unwrap();
    let out = taskdeck(tmp.path(), &["list"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "No tasks\n");
}

#[test]
fn list_orders_by_stored_due_date_text() {
    let tmp = TempDir::new().unwrap();
    add(tmp.path(), "january", "medium", "02/01/2099");
    add(tmp.path(), "february", "medium", "01/02/2099");

    let out = taskdeck(tmp.path(), &["list"]);
    let titles: Vec<String> = stdout(&out)
        .lines()
        .map(|l| l.split_whitespace().nth(3).unwrap_or_default().to_string())
        .collect();
    // text order, not calendar order: "01/02/2099" < "02/01/2099"
    assert_eq!(titles, vec!["february", "january"]);
}

#[test]
fn unpadded_due_date_is_stored_zero_padded() {
    let tmp = TempDir::new().unwrap();
    add(tmp.path(), "late", "medium", "1/1/2099");
    add(tmp.path(), "early", "medium", "05/06/2098");

    let out = taskdeck(tmp.path(), &["list"]);
    assert_eq!(
        stdout(&out),
        "[ ] #1 late (medium, due 01/01/2099) - 2%\n[ ] #2 early (medium, due 05/06/2098) - 2%\n"
    );
}

#[test]
fn toggle_and_filter_by_status() {
    let tmp = TempDir::new().unwrap();
    add(tmp.path(), "first", "high", "01/01/2099");
    add(tmp.path(), "second", "low", "01/01/2099");

    let out = taskdeck(tmp.path(), &["toggle", "2"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "Task 2 marked as completed\n");

    let out = taskdeck(tmp.path(), &["list", "--status", "completed"]);
    assert!(stdout(&out).contains("[x] #2 second"));
    assert!(!stdout(&out).contains("first"));

    let out = taskdeck(tmp.path(), &["list", "--status", "pending", "--priority", "high"]);
    assert!(stdout(&out).contains("#1 first"));

    let out = taskdeck(tmp.path(), &["list", "--priority", "all"]);
    assert_eq!(stdout(&out).lines().count(), 2);

    let out = taskdeck(tmp.path(), &["toggle", "2"]);
    assert_eq!(stdout(&out), "Task 2 marked as pending\n");
}

#[test]
fn list_json_has_task_fields() {
    let tmp = TempDir::new().unwrap();
    add(tmp.path(), "Buy milk", "high", "01/01/2099");

    let out = taskdeck(tmp.path(), &["list", "--json"]);
    let tasks: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(tasks[0]["title"], "Buy milk");
    assert_eq!(tasks[0]["priority"], "high");
    assert_eq!(tasks[0]["completed"], false);
}

#[test]
fn edit_changes_only_given_fields() {
    let tmp = TempDir::new().unwrap();
    add(tmp.path(), "Buy milk", "low", "01/01/2099");

    let out = taskdeck(tmp.path(), &["edit", "1", "--title", "Buy oat milk"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let out = taskdeck(tmp.path(), &["list"]);
    assert_eq!(stdout(&out), "[ ] #1 Buy oat milk (low, due 01/01/2099) - 2%\n");
}

#[test]
fn delete_removes_task_and_missing_id_fails() {
    let tmp = TempDir::new().unwrap();
    add(tmp.path(), "Buy milk", "low", "01/01/2099");

    let out = taskdeck(tmp.path(), &["delete", "1"]);
    assert!(out.status.success());
    assert_eq!(stdout(&taskdeck(tmp.path(), &["list"])), "No tasks\n");

    let out = taskdeck(tmp.path(), &["delete", "1"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Task not found (ID: 1)"), "stderr: {}", stderr(&out));
}

#[test]
fn blank_title_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let out = add(tmp.path(), "   ", "low", "01/01/2099");
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Title is required"));
    assert_eq!(stdout(&taskdeck(tmp.path(), &["list"])), "No tasks\n");
}

#[test]
fn past_due_date_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let out = add(tmp.path(), "Old", "low", "01/01/2000");
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Due date cannot be earlier than today"));
}

#[test]
fn unknown_priority_is_a_usage_error() {
    let tmp = TempDir::new().unwrap();
    let out = add(tmp.path(), "x", "urgent", "01/01/2099");
    assert!(!out.status.success());
    assert!(stderr(&out).contains("urgent"));
}
