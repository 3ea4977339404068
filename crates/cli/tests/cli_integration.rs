//! CLI integration tests.
//!
//! Uses `assert_cmd` to spawn the `orderdesk` binary and verify exit codes,
//! stdout content, and stderr content. Every test runs in an empty
//! temporary directory with the `ORDERDESK_*` variables cleared, so no
//! local settings leak in.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const ENV_VARS: [&str; 4] = [
    "ORDERDESK_ENDPOINT",
    "ORDERDESK_PROJECT_ID",
    "ORDERDESK_DATABASE_ID",
    "ORDERDESK_API_KEY",
];

/// Helper: create a Command for the `orderdesk` binary inside `dir`.
fn orderdesk(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("orderdesk");
    cmd.current_dir(dir.path());
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Settings pointing at a port nothing listens on.
fn unreachable_settings(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("orderdesk.toml");
    fs::write(
        &path,
        r#"
[store]
endpoint = "http://127.0.0.1:1/v1"
project_id = "proj"
database_id = "db"
"#,
    )
    .unwrap();
    path
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    let dir = TempDir::new().unwrap();
    orderdesk(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Order tracking on a remote document database",
        ));
}

#[test]
fn version_exits_0() {
    let dir = TempDir::new().unwrap();
    orderdesk(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("orderdesk"));
}

#[test]
fn orders_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    orderdesk(&dir)
        .args(["orders", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("stats"))
        .stdout(predicate::str::contains("delete"));
}

#[test]
fn config_help_lists_rename() {
    let dir = TempDir::new().unwrap();
    orderdesk(&dir)
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rename"));
}

#[test]
fn config_add_help_lists_list_names() {
    let dir = TempDir::new().unwrap();
    orderdesk(&dir)
        .args(["config", "add", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("draft-statuses"));
}

// ──────────────────────────────────────────────
// 2. Argument and settings validation
// ──────────────────────────────────────────────

#[test]
fn missing_project_id_is_reported() {
    let dir = TempDir::new().unwrap();
    orderdesk(&dir)
        .args(["orders", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "missing required setting 'store.project_id'",
        ));
}

#[test]
fn missing_settings_file_is_reported() {
    let dir = TempDir::new().unwrap();
    orderdesk(&dir)
        .args(["--config", "nope.toml", "config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read settings file 'nope.toml'"));
}

#[test]
fn invalid_settings_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[store\nproject_id = ").unwrap();
    orderdesk(&dir)
        .arg("--config")
        .arg(&path)
        .args(["orders", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid settings file"));
}

#[test]
fn json_output_reports_errors_as_json() {
    let dir = TempDir::new().unwrap();
    orderdesk(&dir)
        .args(["--output", "json", "orders", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("{\"error\":"));
}

#[test]
fn invalid_network_change_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    orderdesk(&dir)
        .args(["orders", "create", "--number", "P-1", "--network-change", "maybe"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("yes/no"));
}

#[test]
fn create_requires_order_number() {
    let dir = TempDir::new().unwrap();
    orderdesk(&dir)
        .args(["orders", "create", "--customer", "ACME"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--number"));
}

// ──────────────────────────────────────────────
// 3. Store connectivity
// ──────────────────────────────────────────────

#[test]
fn connection_refused_is_a_transport_error() {
    let dir = TempDir::new().unwrap();
    unreachable_settings(&dir);
    orderdesk(&dir)
        .args(["orders", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("transport error"));
}

#[test]
fn flags_override_settings_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("orderdesk.toml"),
        "[store]\nproject_id = \"p\"\n",
    )
    .unwrap();
    orderdesk(&dir)
        .args([
            "--endpoint",
            "http://127.0.0.1:1/v1",
            "--database-id",
            "db",
            "config",
            "show",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("transport error"));
}

#[test]
fn environment_supplies_settings() {
    let dir = TempDir::new().unwrap();
    orderdesk(&dir)
        .env("ORDERDESK_ENDPOINT", "http://127.0.0.1:1/v1")
        .env("ORDERDESK_PROJECT_ID", "p")
        .env("ORDERDESK_DATABASE_ID", "d")
        .args(["orders", "delete", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("transport error"));
}
