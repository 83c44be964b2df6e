//! Integration tests for the `casebook` CLI binary.
//!
//! Every test runs against the built-in demo case file or a temp copy of
//! it, with config directories pointed at a nonexistent path.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `casebook` binary with env isolation.
fn casebook_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("casebook");
    cmd.env("HOME", "/tmp/casebook-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/casebook-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("CASEBOOK_CONFIG")
        .env_remove("CASEBOOK_DATA_FILE")
        .env_remove("CASEBOOK_OUTPUT")
        .env_remove("CASEBOOK_DEFAULTS__PAGE_SIZE")
        .env_remove("CASEBOOK_DEFAULTS__OUTPUT");
    cmd
}

fn stdout_of(args: &[&str]) -> String {
    let output = casebook_cmd().args(args).output().unwrap();
    assert!(
        output.status.success(),
        "casebook {args:?} failed:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

fn ids(args: &[&str]) -> Vec<String> {
    stdout_of(args).lines().map(str::to_owned).collect()
}

fn json(args: &[&str]) -> serde_json::Value {
    serde_json::from_str(&stdout_of(args)).unwrap()
}

/// Write the demo dataset to `dir/data.json`.
fn demo_copy(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("data.json");
    let demo = casebook_core::Dataset::demo().unwrap();
    std::fs::write(&path, demo.to_json_pretty().unwrap()).unwrap();
    path
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = casebook_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_collections() {
    casebook_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("claims")
            .and(predicate::str::contains("bids"))
            .and(predicate::str::contains("subscriptions"))
            .and(predicate::str::contains("audit")),
    );
}

#[test]
fn test_version_flag() {
    casebook_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("casebook"));
}

#[test]
fn test_completions_zsh() {
    casebook_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Listing ─────────────────────────────────────────────────────────

#[test]
fn test_claims_list_keeps_insertion_order() {
    let ids = ids(&["claims", "list", "-o", "plain"]);
    assert_eq!(ids.len(), 8);
    assert_eq!(ids.first().map(String::as_str), Some("clm-001"));
    assert_eq!(ids.last().map(String::as_str), Some("clm-008"));
}

#[test]
fn test_filter_and_descending_sort() {
    let ids = ids(&[
        "claims",
        "list",
        "--filter",
        "status=verification_pending",
        "--sort",
        "claimed_amount",
        "--desc",
        "-o",
        "plain",
    ]);
    assert_eq!(ids, ["clm-002", "clm-004"]);
}

#[test]
fn test_multi_value_filter() {
    let ids = ids(&[
        "claims",
        "list",
        "-f",
        "category=secured,preferential",
        "-o",
        "plain",
    ]);
    assert_eq!(ids, ["clm-001", "clm-003", "clm-005", "clm-008"]);
}

#[test]
fn test_search_is_case_insensitive() {
    let ids = ids(&["claims", "list", "--search", "NORTHWIND", "-o", "plain"]);
    assert_eq!(ids, ["clm-001", "clm-008"]);
}

#[test]
fn test_pending_tab() {
    let ids = ids(&["claims", "list", "--tab", "pending", "-o", "plain"]);
    assert_eq!(ids, ["clm-002", "clm-004", "clm-005", "clm-007"]);
}

#[test]
fn test_invited_bids_are_pinned_and_page_clamps() {
    let first = ids(&["bids", "list", "--page-size", "2", "-o", "plain"]);
    assert_eq!(first, ["bid-002", "bid-004"]);

    casebook_cmd()
        .args(["bids", "list", "--page-size", "2", "--page", "99"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bid-005"))
        .stderr(predicate::str::contains("page 3 of 3 (5 matching, 5 total)"));
}

#[test]
fn test_unknown_sort_key_is_usage_error() {
    casebook_cmd()
        .args(["claims", "list", "--sort", "colour"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown sort key"));
}

#[test]
fn test_audit_critical_tab() {
    let ids = ids(&["audit", "list", "--tab", "critical", "-o", "plain"]);
    assert_eq!(ids, ["aud-005", "aud-006"]);
}

#[test]
fn test_unread_notifications() {
    let ids = ids(&["notifications", "list", "--tab", "unread", "-o", "plain"]);
    assert_eq!(ids, ["ntf-001", "ntf-002", "ntf-004"]);
}

#[test]
fn test_page_size_from_environment() {
    let output = casebook_cmd()
        .env("CASEBOOK_DEFAULTS__PAGE_SIZE", "3")
        .args(["claims", "list", "-o", "plain"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 3);
}

// ── Single records ──────────────────────────────────────────────────

#[test]
fn test_get_claim_as_json() {
    let claim = json(&["claims", "get", "clm-003", "-o", "json"]);
    assert_eq!(claim["status"], "accepted");
    assert_eq!(claim["claimant"], "Tax Office Mitte");
}

#[test]
fn test_get_missing_claim() {
    casebook_cmd()
        .args(["claims", "get", "clm-999"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_remove_missing_subscription() {
    casebook_cmd()
        .args(["subscriptions", "remove", "sub-999"])
        .assert()
        .code(4);
}

#[test]
fn test_actions_follow_the_transition_table() {
    let actions = ids(&["claims", "actions", "clm-002", "-o", "plain"]);
    assert_eq!(actions, ["verify", "reject"]);
}

// ── Transitions ─────────────────────────────────────────────────────

#[test]
fn test_illegal_transition_is_rejected() {
    casebook_cmd()
        .args(["claims", "transition", "clm-001", "admit"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Cannot admit"));
}

#[test]
fn test_unknown_action_is_rejected() {
    casebook_cmd()
        .args(["bids", "transition", "bid-001", "haggle"])
        .assert()
        .code(5);
}

#[test]
fn test_legal_transition_returns_new_status() {
    let claim = json(&["claims", "transition", "clm-001", "submit", "-o", "json"]);
    assert_eq!(claim["status"], "allocation_pending");
}

#[test]
fn test_transition_is_not_persisted_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let data = demo_copy(dir.path());
    let data_arg = data.to_str().unwrap();

    stdout_of(&["--data", data_arg, "claims", "transition", "clm-001", "submit"]);
    let claim = json(&["--data", data_arg, "claims", "get", "clm-001", "-o", "json"]);
    assert_eq!(claim["status"], "open");
}

#[test]
fn test_persist_writes_dataset_back() {
    let dir = tempfile::tempdir().unwrap();
    let data = demo_copy(dir.path());
    let data_arg = data.to_str().unwrap();

    stdout_of(&[
        "--data", data_arg, "--persist", "bids", "transition", "bid-003", "renegotiate",
        "--amount", "700000",
    ]);

    let bid = json(&["--data", data_arg, "bids", "get", "bid-003", "-o", "json"]);
    assert_eq!(bid["status"], "under_review");
    assert_eq!(bid["amount"], 700_000);
}

#[test]
fn test_persist_without_data_file() {
    casebook_cmd()
        .args(["--persist", "claims", "remove", "clm-001"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--persist"));
}

// ── Create ──────────────────────────────────────────────────────────

#[test]
fn test_create_claim_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let draft = dir.path().join("draft.json");
    std::fs::write(
        &draft,
        r#"{ "claimant": "Acme Ltd", "category": "secured", "claimed_amount": 1000 }"#,
    )
    .unwrap();

    let claim = json(&[
        "claims",
        "create",
        "--from-file",
        draft.to_str().unwrap(),
        "-o",
        "json",
    ]);
    assert_eq!(claim["status"], "open");
    assert_eq!(claim["claimant"], "Acme Ltd");
}

#[test]
fn test_create_rejects_invalid_draft() {
    let dir = tempfile::tempdir().unwrap();
    let draft = dir.path().join("draft.json");
    std::fs::write(
        &draft,
        r#"{ "claimant": "Acme Ltd", "category": "secured", "claimed_amount": 0 }"#,
    )
    .unwrap();

    casebook_cmd()
        .args(["claims", "create", "-F", draft.to_str().unwrap()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("claimed_amount"));
}

// ── Stats ───────────────────────────────────────────────────────────

#[test]
fn test_stats_json() {
    let stats = json(&["stats", "-o", "json"]);
    let stats = stats.as_array().unwrap();
    assert_eq!(stats.len(), 5);
    assert_eq!(stats[0]["entity"], "claim");
    assert_eq!(stats[0]["total"], 8);
    assert_eq!(stats[0]["counts"]["verification_pending"], 2);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("casebook").join("config.toml");
    let path_arg = path.to_str().unwrap();

    casebook_cmd()
        .args(["--config", path_arg, "config", "init"])
        .assert()
        .success();
    assert!(path.exists());

    casebook_cmd()
        .args(["--config", path_arg, "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));

    casebook_cmd()
        .args(["--config", path_arg, "config", "init"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_path_honours_flag() {
    casebook_cmd()
        .args(["--config", "/tmp/elsewhere/casebook.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/elsewhere/casebook.toml"));
}

#[test]
fn test_saved_view() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[views.big-pending]
entity = "claims"

[views.big-pending.query]
tab = "pending"
sort_key = "claimed_amount"
sort_order = "desc"
"#,
    )
    .unwrap();
    let path_arg = path.to_str().unwrap();

    let ids = ids(&[
        "--config", path_arg, "claims", "list", "--view", "big-pending", "-o", "plain",
    ]);
    assert_eq!(ids, ["clm-005", "clm-002", "clm-004", "clm-007"]);

    casebook_cmd()
        .args(["--config", path_arg, "bids", "list", "--view", "big-pending"])
        .assert()
        .code(2);
}
