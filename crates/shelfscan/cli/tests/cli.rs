//! End-to-end tests for the `shelfscan` binary against temp profile directories.
//!
//! Only commands that need no backend are exercised here; the HTTP contract is
//! covered in the client crate.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Test fixture: an isolated profile directory and an empty config file.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        fs::write(dir.path().join("config.toml"), "").expect("failed to write config");
        Self { dir }
    }

    fn profile(&self) -> std::path::PathBuf {
        self.dir.path().join("profile")
    }

    fn config(&self) -> std::path::PathBuf {
        self.dir.path().join("config.toml")
    }

    fn write_config(&self, contents: &str) {
        fs::write(self.config(), contents).expect("failed to write config");
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("shelfscan").expect("binary not built");
        cmd.env_remove("SHELFSCAN_ENDPOINT")
            .env_remove("SHELFSCAN_DATA_DIR")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1")
            .arg("--config")
            .arg(self.config())
            .arg("--data-dir")
            .arg(self.profile());
        cmd
    }

    fn device_id(&self) -> String {
        let output = self
            .cmd()
            .args(["--output", "json", "device", "show"])
            .output()
            .expect("failed to run shelfscan");
        assert!(output.status.success(), "device show failed: {output:?}");
        let info: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("device show did not print JSON");
        info["device_id"]
            .as_str()
            .expect("device_id missing")
            .to_string()
    }
}

fn looks_like_v4(id: &str) -> bool {
    id.len() == 36 && id.as_bytes()[14] == b'4'
}

fn stored_durable(profile: &Path) -> serde_json::Value {
    let raw = fs::read_to_string(profile.join("storage.json")).expect("storage.json missing");
    serde_json::from_str(&raw).expect("storage.json is not JSON")
}

#[test]
fn test_device_show_creates_and_reuses_identity() {
    let ws = Workspace::new();

    let first = ws.device_id();
    assert!(looks_like_v4(&first), "not a v4 uuid: {first}");
    assert_eq!(ws.device_id(), first);

    assert_eq!(stored_durable(&ws.profile())["bookscanner_device_id"], first);
    assert!(ws.profile().join("cookies.json").exists());
}

#[test]
fn test_device_status_does_not_create() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["device", "status"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No device identity stored"));

    assert!(!ws.profile().join("storage.json").exists());
}

#[test]
fn test_device_status_reports_stored_identity() {
    let ws = Workspace::new();
    let id = ws.device_id();

    ws.cmd()
        .args(["device", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains(id));
}

#[test]
fn test_device_reset_requires_confirmation() {
    let ws = Workspace::new();
    let id = ws.device_id();

    ws.cmd()
        .args(["device", "reset"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));

    assert_eq!(ws.device_id(), id);
}

#[test]
fn test_device_reset_issues_new_identity() {
    let ws = Workspace::new();
    let old = ws.device_id();

    ws.cmd()
        .args(["device", "reset", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New device identity"));

    let new = ws.device_id();
    assert_ne!(new, old);
    assert!(looks_like_v4(&new));
}

#[test]
fn test_device_refresh_heals_missing_cookie() {
    let ws = Workspace::new();
    let id = ws.device_id();
    fs::remove_file(ws.profile().join("cookies.json")).unwrap();

    ws.cmd()
        .args(["device", "refresh"])
        .assert()
        .success()
        .stdout(predicate::str::contains(id.clone()));

    let cookies = fs::read_to_string(ws.profile().join("cookies.json")).unwrap();
    assert!(cookies.contains(&id));
}

#[test]
fn test_strict_persistence_fails_initialization() {
    let ws = Workspace::new();
    // A regular file where the profile directory should be makes every write fail.
    fs::write(ws.profile(), "not a directory").unwrap();
    ws.write_config("require_persistence = true\n");

    ws.cmd()
        .args(["device", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Initialization failed"));
}

#[test]
fn test_unpersisted_identity_still_runs_by_default() {
    let ws = Workspace::new();
    fs::write(ws.profile(), "not a directory").unwrap();

    ws.cmd()
        .args(["--output", "json", "device", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("device_id"));
}

#[test]
fn test_analyze_rejects_non_image() {
    let ws = Workspace::new();
    let notes = ws.dir.path().join("notes.txt");
    fs::write(&notes, "not a photo").unwrap();

    ws.cmd()
        .arg("analyze")
        .arg(&notes)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Please select a valid image file (JPEG, PNG, or WebP)",
        ));
}

#[test]
fn test_import_rejects_non_csv() {
    let ws = Workspace::new();
    let export = ws.dir.path().join("library.xlsx");
    fs::write(&export, "binary").unwrap();

    ws.cmd()
        .arg("import-goodreads")
        .arg(&export)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please select a CSV file"));
}

#[test]
fn test_config_shows_endpoint_override() {
    let ws = Workspace::new();
    ws.write_config("endpoint = \"http://from-config:5000\"\n");

    ws.cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("http://from-config:5000"));

    ws.cmd()
        .args(["--endpoint", "http://from-flag:8080", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://from-flag:8080"));
}

#[test]
fn test_json_output_is_a_single_document() {
    let ws = Workspace::new();
    ws.device_id();
    let shelf = ws.dir.path().join("shelf.jpg");
    fs::write(&shelf, [0xFF, 0xD8, 0xFF]).unwrap();

    // Nothing listens on the discard port, so the upload itself fails.
    let output = ws
        .cmd()
        .args(["--endpoint", "http://127.0.0.1:9", "--output", "json", "analyze"])
        .arg(&shelf)
        .output()
        .expect("failed to run shelfscan");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty(), "stdout: {}", String::from_utf8_lossy(&output.stdout));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Uploading shelf.jpg"));

    let status = ws
        .cmd()
        .args(["--output", "json", "device", "status"])
        .output()
        .expect("failed to run shelfscan");
    assert!(status.status.success());
    let info: serde_json::Value =
        serde_json::from_slice(&status.stdout).expect("device status did not print JSON");
    assert!(info["device_id"].is_string());
}
