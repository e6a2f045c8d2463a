//! Integration tests for `vulnfeed ingest` command.
//!
//! Runs the built binary against the feed fixtures of the parser crate.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Fixture path without `..` components, which feed config validation rejects.
fn fixture(name: &str) -> String {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .unwrap_or(&manifest_dir)
        .join("crates/nvd-feed/tests/fixtures")
        .join(name)
        .display()
        .to_string()
}

fn temp_path(temp_dir: &TempDir, name: &str) -> String {
    temp_dir.path().join(name).display().to_string()
}

/// Run `vulnfeed --output json ingest ...` with no config file present.
fn ingest(temp_dir: &TempDir, args: &[&str]) -> (Output, serde_json::Value) {
    let output = Command::new(env!("CARGO_BIN_EXE_vulnfeed"))
        .arg("-c")
        .arg(temp_dir.path().join("absent.toml"))
        .args(["--output", "json", "ingest"])
        .args(args)
        .env("RUST_LOG", "error")
        .output()
        .expect("should run vulnfeed");

    let report = serde_json::from_slice(&output.stdout).unwrap_or(serde_json::Value::Null);
    (output, report)
}

#[test]
fn test_ingest_dry_run_reports_counters() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let feed = fixture("mixed.xml");

    let (output, report) = ingest(&temp_dir, &[feed.as_str(), "--dry-run"]);

    assert!(output.status.success(), "dry run should succeed");
    assert_eq!(report["dry_run"].as_bool(), Some(true));
    assert_eq!(report["schema_verified"].as_bool(), Some(true));
    assert_eq!(report["total_entries"].as_u64(), Some(4));
    assert_eq!(report["relevant_entries"].as_u64(), Some(2));
    assert_eq!(report["skipped_entries"].as_u64(), Some(2));
    assert_eq!(report["persisted"].as_u64(), Some(0));
}

#[test]
fn test_ingest_writes_store_and_index() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let feed = fixture("single_entry.xml");
    let history = fixture("history.json");
    let store = temp_path(&temp_dir, "records.jsonl");
    let index = temp_path(&temp_dir, "cpe-index.json");

    let (output, report) = ingest(
        &temp_dir,
        &[
            feed.as_str(),
            "--history",
            history.as_str(),
            "--store",
            store.as_str(),
            "--index",
            index.as_str(),
        ],
    );

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(report["persisted"].as_u64(), Some(1));
    assert_eq!(report["merged"].as_u64(), Some(1));
    assert_eq!(report["indexed"].as_u64(), Some(2));

    let records =
        vulnfeed_nvd::JsonLinesStore::read_latest(Path::new(&store)).expect("store should be readable");
    assert_eq!(records["CVE-0001"].affected_software_count(), 2);
    assert!(Path::new(&index).exists(), "index should be written");
}

#[test]
fn test_ingest_unsupported_schema_exits_non_zero() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let feed = fixture("unsupported_schema.xml");

    let (output, report) = ingest(&temp_dir, &[feed.as_str(), "--dry-run"]);

    assert_eq!(output.status.code(), Some(4), "schema mismatch should exit 4");
    assert_eq!(report["success"].as_bool(), Some(false));
    assert_eq!(report["schema_verified"].as_bool(), Some(false));
    assert_eq!(report["total_entries"].as_u64(), Some(0));
    assert!(
        report["error"]
            .as_str()
            .is_some_and(|e| e.contains("1.2")),
        "report should carry the abort cause"
    );
}

#[test]
fn test_ingest_missing_feed_exits_with_io_code() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let feed = temp_path(&temp_dir, "absent.xml");

    let (output, report) = ingest(&temp_dir, &[feed.as_str(), "--dry-run"]);

    assert_eq!(output.status.code(), Some(10));
    assert_eq!(report["success"].as_bool(), Some(false));
}

#[test]
fn test_ingest_path_traversal_is_config_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let (output, _) = ingest(&temp_dir, &["../feed.xml", "--dry-run"]);

    assert_eq!(output.status.code(), Some(2));
}
