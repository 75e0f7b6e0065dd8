use std::io::Write;
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::TempDir;

fn notiz_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_notiz"));
    cmd.env_remove("NOTIZ_LOG");
    cmd
}

fn run(tmp: &TempDir, args: &[&str]) -> Output {
    notiz_cmd().current_dir(tmp.path()).args(args).output().unwrap()
}

fn list_json(tmp: &TempDir) -> Vec<Value> {
    let output = run(tmp, &["list", "--json"]);
    assert!(output.status.success());
    let parsed: Value = serde_json::from_slice(&output.stdout).unwrap();
    parsed.as_array().unwrap().clone()
}

#[test]
fn test_first_run_seeds_board() {
    let tmp = TempDir::new().unwrap();

    let output = run(&tmp, &["list"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Idee"));
    assert!(stdout.contains("Recherche"));
    assert!(stdout.contains("To-Dos"));
    assert!(tmp.path().join(".notiz/vanilla-blocks-v1.json").exists());
}

#[test]
fn test_board_survives_between_runs() {
    let tmp = TempDir::new().unwrap();
    let first = list_json(&tmp);
    let second = list_json(&tmp);

    let ids = |blocks: &[Value]| -> Vec<String> {
        blocks.iter().map(|b| b["id"].as_str().unwrap().to_string()).collect()
    };
    assert_eq!(ids(&first), ids(&second));
}

#[test]
fn test_add_edit_move_delete_workflow() {
    let tmp = TempDir::new().unwrap();

    // Add
    let output = run(
        &tmp,
        &["add", "--title", "Plan", "--note", "Write it down", "--color", "#f87171", "--json"],
    );
    assert!(output.status.success());
    let created: Value = serde_json::from_slice(&output.stdout).unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["x"], 120.0);

    let blocks = list_json(&tmp);
    assert_eq!(blocks.len(), 4);
    assert_eq!(blocks[3]["title"], "Plan");

    // Edit by prefix
    let output = run(&tmp, &["edit", &id[..6], "--title", "Plan B"]);
    assert!(output.status.success());

    // Move
    let output = run(&tmp, &["move", &id, "--x", "400", "--y", "-10"]);
    assert!(output.status.success());

    let blocks = list_json(&tmp);
    let block = blocks.iter().find(|b| b["id"] == id.as_str()).unwrap();
    assert_eq!(block["title"], "Plan B");
    assert_eq!(block["excerpt"], "Write it down");
    assert_eq!(block["x"], 400.0);
    assert_eq!(block["y"], -10.0);

    // Delete
    let output = run(&tmp, &["delete", &id]);
    assert!(output.status.success());
    assert_eq!(list_json(&tmp).len(), 3);
}

#[test]
fn test_unknown_id_fails() {
    let tmp = TempDir::new().unwrap();

    let output = run(&tmp, &["delete", "zzzzzzzz"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Block not found"));
}

#[test]
fn test_export_then_import() {
    let tmp = TempDir::new().unwrap();
    let backup = tmp.path().join("backup.json");

    let output = run(&tmp, &["export", "--output", backup.to_str().unwrap()]);
    assert!(output.status.success());
    let exported = std::fs::read_to_string(&backup).unwrap();
    assert!(exported.starts_with("[\n"));

    run(&tmp, &["add", "--title", "extra"]);
    assert_eq!(list_json(&tmp).len(), 4);

    let output = run(&tmp, &["import", backup.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Imported 3 blocks"));
    assert_eq!(list_json(&tmp).len(), 3);
}

#[test]
fn test_import_rejects_non_array() {
    let tmp = TempDir::new().unwrap();
    let before = list_json(&tmp);

    let bad = tmp.path().join("bad.json");
    std::fs::write(&bad, r#"{"blocks": []}"#).unwrap();

    let output = run(&tmp, &["import", bad.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid payload"));

    assert_eq!(list_json(&tmp), before);
}

#[test]
fn test_reset_declined_keeps_board() {
    let tmp = TempDir::new().unwrap();
    run(&tmp, &["add", "--title", "keep me"]);

    let mut child = notiz_cmd()
        .current_dir(tmp.path())
        .args(["reset"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"n\n").unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    assert!(output.stderr.is_empty());
    assert_eq!(list_json(&tmp).len(), 4);
}

#[test]
fn test_reset_with_yes() {
    let tmp = TempDir::new().unwrap();
    run(&tmp, &["add", "--title", "gone soon"]);

    let output = run(&tmp, &["reset", "--yes"]);
    assert!(output.status.success());

    let blocks = list_json(&tmp);
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[0]["title"], "Idee");
}

#[test]
fn test_server_authoritative_requires_api_base() {
    let tmp = TempDir::new().unwrap();

    let output = run(&tmp, &["--policy", "server-authoritative", "list"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("api_base"));
}

#[test]
fn test_config_file_selects_sqlite_store() {
    let tmp = TempDir::new().unwrap();
    let yaml = "local_store: sqlite\ndata_dir: store\n";
    std::fs::write(tmp.path().join("notiz.yaml"), yaml).unwrap();

    let output = run(&tmp, &["list"]);
    assert!(output.status.success());
    assert!(tmp.path().join("store/notiz-proto-db.sqlite").exists());
    assert_eq!(list_json(&tmp).len(), 3);
}

#[test]
fn test_unreachable_service_falls_back_to_local() {
    let tmp = TempDir::new().unwrap();
    let before = list_json(&tmp);

    // Nothing listens on port 9 on loopback
    let output = run(&tmp, &["--api-base", "http://127.0.0.1:9/api", "list", "--json"]);
    assert!(output.status.success());
    let parsed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed.as_array().unwrap(), &before);
}
