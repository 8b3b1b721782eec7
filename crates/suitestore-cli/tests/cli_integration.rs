//! CLI subprocess integration tests.
//!
//! These tests invoke the `suitestore` binary against a temporary store and
//! check exit codes, stdout content and JSON output.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn suitestore_bin(store: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_suitestore"));
    cmd.arg("--store").arg(store);
    cmd.env_remove("SUITESTORE_LOG");
    cmd
}

fn write_suite(dir: &Path) -> (PathBuf, PathBuf) {
    let jar = dir.join("game.jar");
    std::fs::write(&jar, vec![7u8; 512]).unwrap();
    let jad = dir.join("game.jad");
    std::fs::write(
        &jad,
        "MIDlet-Name: Game\n\
         MIDlet-Vendor: Example\n\
         MIDlet-Version: 1.0\n\
         MIDlet-1: Game, , com.example.Game\n\
         MIDlet-Jar-URL: http://example.com/game.jar\n",
    )
    .unwrap();
    (jar, jad)
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid JSON ({e}): {stdout}"))
}

fn install(store: &Path, dir: &Path) -> serde_json::Value {
    let (jar, jad) = write_suite(dir);
    let output = suitestore_bin(store)
        .args(["--json", "install"])
        .arg(&jar)
        .arg("--jad")
        .arg(&jad)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "install failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    stdout_json(&output)
}

#[test]
fn cli_version_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let output = suitestore_bin(dir.path()).arg("--version").output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("suitestore"));
}

#[test]
fn cli_help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    let output = suitestore_bin(dir.path()).arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["install", "remove", "list", "verify-store", "create-id"] {
        assert!(stdout.contains(command), "help must list '{command}'");
    }
}

#[test]
fn cli_install_then_list_json() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");
    let installed = install(&store, dir.path());
    assert_eq!(installed["status"], "installed");
    assert_eq!(installed["jar_size"], 512);
    let suite_id = installed["suite_id"].as_i64().unwrap();
    assert!(suite_id > 1);

    // The user's jar is copied, not moved.
    assert!(dir.path().join("game.jar").exists());

    let output = suitestore_bin(&store)
        .args(["--json", "list"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let list = stdout_json(&output);
    let entries = list.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["suite_id"], suite_id);
    assert_eq!(entries[0]["suite_name"], "Game");
    assert_eq!(entries[0]["number_of_midlets"], 1);
}

#[test]
fn cli_info_reports_provenance() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");
    let installed = install(&store, dir.path());
    let suite_id = installed["suite_id"].to_string();

    let output = suitestore_bin(&store)
        .args(["--json", "info", &suite_id])
        .output()
        .unwrap();
    assert!(output.status.success());
    let info = stdout_json(&output);
    assert_eq!(info["install_info"]["jar_url"], "http://example.com/game.jar");
    assert_eq!(info["install_info"]["domain"], "untrusted");
    assert_eq!(info["settings"]["enabled"], true);
}

#[test]
fn cli_disable_then_enable() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");
    let suite_id = install(&store, dir.path())["suite_id"].to_string();

    let output = suitestore_bin(&store)
        .args(["--json", "disable", &suite_id])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["enabled"], false);

    let output = suitestore_bin(&store)
        .args(["--json", "enable", &suite_id])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["enabled"], true);
}

#[test]
fn cli_remove_empties_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");
    let suite_id = install(&store, dir.path())["suite_id"].to_string();

    let output = suitestore_bin(&store)
        .args(["remove", &suite_id])
        .output()
        .unwrap();
    assert!(output.status.success());

    let output = suitestore_bin(&store).arg("list").output().unwrap();
    assert!(String::from_utf8_lossy(&output.stdout).contains("no suites installed"));

    let output = suitestore_bin(&store)
        .args(["remove", &suite_id])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn cli_verify_store_passes_after_install() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");
    install(&store, dir.path());

    let output = suitestore_bin(&store)
        .args(["--json", "verify-store"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report = stdout_json(&output);
    assert_eq!(report["failed"], 0);
    assert_eq!(report["checked"], report["passed"]);
}

#[test]
fn cli_verify_store_flags_missing_jar() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");
    let installed = install(&store, dir.path());
    std::fs::remove_file(installed["jar_path"].as_str().unwrap()).unwrap();

    let output = suitestore_bin(&store)
        .arg("verify-store")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stdout).contains("FAIL"));
}

#[test]
fn cli_create_id_allocates_fresh_ids() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");
    let installed = install(&store, dir.path());

    let output = suitestore_bin(&store)
        .args(["--json", "create-id"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let allocated = stdout_json(&output);
    assert_eq!(allocated["kind"], "suite");
    assert_ne!(allocated["id"], installed["suite_id"]);
}

#[test]
fn cli_missing_jar_is_bad_input() {
    let dir = tempfile::tempdir().unwrap();
    let output = suitestore_bin(&dir.path().join("store"))
        .args(["install", "/nonexistent/game.jar"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid input"));
}

#[test]
fn cli_recover_on_clean_store() {
    let dir = tempfile::tempdir().unwrap();
    let output = suitestore_bin(&dir.path().join("store"))
        .args(["--json", "recover"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["rolled_back"], 0);
}

#[test]
fn cli_completions_bash() {
    let dir = tempfile::tempdir().unwrap();
    let output = suitestore_bin(dir.path())
        .args(["completions", "bash"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("suitestore"));
}
