//! CLI Integration Tests
//!
//! These tests run the built `champ-archive` binary end-to-end against
//! archives in temporary directories.
//!
//! Run with:
//! ```bash
//! cargo test --test cli_integration
//! ```

use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

/// Run champ-archive and return (stdout, stderr, success)
fn run(args: &[&str], archive: &Path) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_champ-archive"))
        .arg("-a")
        .arg(archive)
        .args(["-f", "json"])
        .args(args)
        .output()
        .expect("Failed to execute champ-archive");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

fn run_json(args: &[&str], archive: &Path) -> serde_json::Value {
    let (stdout, stderr, success) = run(args, archive);
    assert!(success, "{:?} failed: {}", args, stderr);
    serde_json::from_str(stdout.trim()).expect("stdout should be JSON")
}

fn save(values: &[&str], archive: &Path) -> serde_json::Value {
    let mut args = vec!["save"];
    args.extend_from_slice(values);
    run_json(&args, archive)
}

// ============================================================================
// Save / Load
// ============================================================================

#[test]
fn test_cli_save_creates_archive() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("test.champ");

    let result = save(&["hello", "world"], &archive);

    assert_eq!(result["status"], "ok");
    assert_eq!(result["size"], 2);
    assert_eq!(result["id"].as_str().unwrap().len(), 64);
    assert!(archive.exists(), "archive file should be created");
}

#[test]
fn test_cli_load_returns_sorted_values() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("test.champ");

    let saved = save(&["pear", "apple", "fig"], &archive);
    let id = saved["id"].as_str().unwrap();
    let loaded = run_json(&["load", id], &archive);

    assert_eq!(loaded["size"], 3);
    assert_eq!(loaded["values"], serde_json::json!(["apple", "fig", "pear"]));
}

#[test]
fn test_cli_same_contents_same_id() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("test.champ");

    let first = save(&["a", "b", "c"], &archive);
    let second = save(&["c", "b", "a"], &archive);

    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["new_nodes"], 0);
}

#[test]
fn test_cli_save_from_base_adds_values() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("test.champ");

    let values: Vec<String> = (0..500).map(|i| format!("item-{i}")).collect();
    let refs: Vec<&str> = values.iter().map(String::as_str).collect();
    let base = save(&refs, &archive);
    let base_id = base["id"].as_str().unwrap().to_string();

    let next = run_json(&["save", "--base", &base_id, "extra"], &archive);
    assert_eq!(next["size"], 501);
    assert_ne!(next["id"], base["id"]);

    let added = next["new_nodes"].as_u64().unwrap();
    let total = base["nodes"].as_u64().unwrap();
    assert!(added < total, "only the changed path should be stored");

    let loaded = run_json(&["load", next["id"].as_str().unwrap()], &archive);
    assert_eq!(loaded["size"], 501);
}

#[test]
fn test_cli_json_encoding() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("test.json");

    let (stdout, stderr, success) = run(&["-e", "json", "save", "x", "y"], &archive);
    assert!(success, "{}", stderr);
    let saved: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();

    let bytes = std::fs::read(&archive).unwrap();
    assert_eq!(&bytes[..8], b"CHAMPARC");
    assert_eq!(bytes[16], b'{', "JSON body follows the header");

    let loaded = run_json(&["load", saved["id"].as_str().unwrap()], &archive);
    assert_eq!(loaded["values"], serde_json::json!(["x", "y"]));
}

// ============================================================================
// Inspect / Verify
// ============================================================================

#[test]
fn test_cli_inspect_lists_roots() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("test.champ");

    save(&["one"], &archive);
    save(&["one", "two"], &archive);

    let report = run_json(&["inspect"], &archive);
    let roots = report["roots"].as_array().unwrap();
    assert_eq!(roots.len(), 2);
    assert!(roots.iter().all(|r| r["kind"] == "set"));
    assert_eq!(report["version"], 1);
}

#[test]
fn test_cli_verify_ok() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("test.champ");

    save(&["a"], &archive);
    save(&["b", "c"], &archive);

    let report = run_json(&["verify"], &archive);
    assert_eq!(report["status"], "ok");
    assert_eq!(report["roots"], 2);
}

#[test]
fn test_cli_text_output_is_pretty() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("test.champ");
    save(&["a"], &archive);

    let output = Command::new(env!("CARGO_BIN_EXE_champ-archive"))
        .arg("-a")
        .arg(&archive)
        .args(["-f", "text", "inspect"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.lines().count() > 1, "pretty JSON spans lines");
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_cli_load_unknown_id_fails() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("test.champ");
    save(&["a"], &archive);

    let unknown = "00".repeat(32);
    let (_stdout, stderr, success) = run(&["load", &unknown], &archive);
    assert!(!success);
    assert!(stderr.contains("not found"), "stderr: {}", stderr);
}

#[test]
fn test_cli_invalid_id_fails() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("test.champ");
    save(&["a"], &archive);

    let (_stdout, stderr, success) = run(&["load", "not-hex"], &archive);
    assert!(!success);
    assert!(stderr.contains("Invalid container id"));
}

#[test]
fn test_cli_missing_archive_fails() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("absent.champ");

    let (_stdout, stderr, success) = run(&["inspect"], &archive);
    assert!(!success);
    assert!(stderr.contains("Failed to read archive"));
}

#[test]
fn test_cli_rejects_non_archive_file() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("garbage.champ");
    std::fs::write(&archive, b"this is not an archive at all").unwrap();

    let (_stdout, _stderr, success) = run(&["verify"], &archive);
    assert!(!success);
}

#[test]
fn test_cli_default_archive_path() {
    let output = Command::new(env!("CARGO_BIN_EXE_champ-archive"))
        .args(["--help"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("[default: archive.champ]"),
        "got: {}",
        stdout
    );
}
