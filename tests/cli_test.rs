//! CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary with HOME pointed at a scratch dir so no user config is picked up.
fn branchwork(home: &Path) -> Command {
  let mut cmd = Command::cargo_bin("branchwork").unwrap();
  cmd.env("HOME", home).env_remove("RUST_LOG");
  cmd
}

fn new_workflow(dir: &TempDir) -> PathBuf {
  let file = dir.path().join("flow.json");
  branchwork(dir.path())
    .arg("new")
    .arg(&file)
    .assert()
    .success();
  file
}

fn add(dir: &TempDir, file: &Path, args: &[&str]) -> String {
  let output = branchwork(dir.path())
    .arg("add")
    .arg(file)
    .args(args)
    .output()
    .unwrap();
  assert!(
    output.status.success(),
    "add failed: {}",
    String::from_utf8_lossy(&output.stderr)
  );
  String::from_utf8(output.stdout).unwrap().trim().to_string()
}

fn read_json(file: &Path) -> serde_json::Value {
  serde_json::from_str(&std::fs::read_to_string(file).unwrap()).unwrap()
}

#[test]
fn test_help_flag() {
  let dir = TempDir::new().unwrap();
  branchwork(dir.path())
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("branching workflow trees"));
}

#[test]
fn test_new_creates_single_start_node() {
  let dir = TempDir::new().unwrap();
  let file = new_workflow(&dir);

  let json = read_json(&file);
  assert_eq!(json["root_id"], "start");
  assert_eq!(json["nodes"]["start"]["type"], "start");
  assert_eq!(json["nodes"]["start"]["label"], "Start");

  branchwork(dir.path())
    .arg("new")
    .arg(&file)
    .assert()
    .failure()
    .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_build_validate_and_depth() {
  let dir = TempDir::new().unwrap();
  let file = new_workflow(&dir);

  let a1 = add(&dir, &file, &["--parent", "start", "--kind", "action"]);
  let b1 = add(&dir, &file, &["--parent", &a1, "--kind", "branch"]);
  let e1 = add(&dir, &file, &["--parent", &b1, "--kind", "end", "--slot", "true"]);
  assert!(a1.starts_with("node_"));

  let json = read_json(&file);
  assert_eq!(json["nodes"][&b1]["branches"]["true"], e1.as_str());
  assert!(json["nodes"][&b1]["branches"]["false"].is_null());

  branchwork(dir.path())
    .arg("validate")
    .arg(&file)
    .assert()
    .success()
    .stdout("valid\n");

  branchwork(dir.path())
    .arg("depth")
    .arg(&file)
    .assert()
    .success()
    .stdout("3\n");
}

#[test]
fn test_delete_reconnects_and_root_is_protected() {
  let dir = TempDir::new().unwrap();
  let file = new_workflow(&dir);
  let a1 = add(&dir, &file, &["--parent", "start", "--kind", "action"]);
  let e1 = add(&dir, &file, &["--parent", &a1, "--kind", "end"]);

  branchwork(dir.path())
    .args(["delete"])
    .arg(&file)
    .arg(&a1)
    .assert()
    .success();
  let json = read_json(&file);
  assert_eq!(json["nodes"]["start"]["children"], serde_json::json!([e1]));

  branchwork(dir.path())
    .arg("delete")
    .arg(&file)
    .arg("start")
    .assert()
    .failure()
    .stderr(predicate::str::contains("cannot be deleted"));
}

#[test]
fn test_rejected_add_leaves_file_unchanged() {
  let dir = TempDir::new().unwrap();
  let file = new_workflow(&dir);
  let e1 = add(&dir, &file, &["--parent", "start", "--kind", "end"]);
  let before = std::fs::read_to_string(&file).unwrap();

  branchwork(dir.path())
    .arg("add")
    .arg(&file)
    .args(["--parent", &e1, "--kind", "action"])
    .assert()
    .failure();

  branchwork(dir.path())
    .arg("add")
    .arg(&file)
    .args(["--parent", "start", "--kind", "loop"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("loop"));

  assert_eq!(std::fs::read_to_string(&file).unwrap(), before);
}

#[test]
fn test_relabel() {
  let dir = TempDir::new().unwrap();
  let file = new_workflow(&dir);
  let a1 = add(&dir, &file, &["--parent", "start", "--kind", "action"]);

  branchwork(dir.path())
    .arg("relabel")
    .arg(&file)
    .arg(&a1)
    .arg("Send invoice")
    .assert()
    .success();
  assert_eq!(read_json(&file)["nodes"][&a1]["label"], "Send invoice");

  branchwork(dir.path())
    .arg("relabel")
    .arg(&file)
    .arg("ghost")
    .arg("x")
    .assert()
    .failure();
}

#[test]
fn test_invalid_workflow_fails_validation_and_export() {
  let dir = TempDir::new().unwrap();
  let file = dir.path().join("broken.json");
  std::fs::write(
    &file,
    r#"{
      "root_id": "start",
      "nodes": {
        "start": { "id": "start", "label": "Start", "type": "start", "children": [] },
        "stray": { "id": "stray", "label": "End", "type": "end" }
      }
    }"#,
  )
  .unwrap();

  branchwork(dir.path())
    .arg("validate")
    .arg(&file)
    .assert()
    .code(1)
    .stdout(predicate::str::contains("orphaned nodes found: stray"));

  branchwork(dir.path())
    .arg("export")
    .arg(&file)
    .assert()
    .failure()
    .stderr(predicate::str::contains("--force"));

  let output = branchwork(dir.path())
    .arg("export")
    .arg(&file)
    .arg("--force")
    .output()
    .unwrap();
  assert!(output.status.success());
  let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(record["metadata"]["node_count"], 2);
  assert_eq!(record["metadata"]["has_end_nodes"], true);
}

#[test]
fn test_export_prints_metadata() {
  let dir = TempDir::new().unwrap();
  let file = new_workflow(&dir);
  let b1 = add(&dir, &file, &["--parent", "start", "--kind", "branch"]);
  add(&dir, &file, &["--parent", &b1, "--kind", "end", "--slot", "false"]);

  let output = branchwork(dir.path())
    .arg("export")
    .arg(&file)
    .output()
    .unwrap();
  assert!(output.status.success());
  let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(record["root_id"], "start");
  assert_eq!(record["metadata"]["node_count"], 3);
  assert_eq!(record["metadata"]["max_depth"], 2);
  assert_eq!(record["metadata"]["has_branches"], true);
  assert!(record["metadata"]["exported_at"].is_string());
}

#[test]
fn test_config_overwrite_policy() {
  let dir = TempDir::new().unwrap();
  let config = dir.path().join("config.json");
  std::fs::write(&config, r#"{ "slot_policy": "overwrite" }"#).unwrap();
  let file = new_workflow(&dir);
  let b1 = add(&dir, &file, &["--parent", "start", "--kind", "branch"]);
  add(&dir, &file, &["--parent", &b1, "--kind", "end", "--slot", "true"]);

  // default policy rejects the occupied slot
  branchwork(dir.path())
    .arg("add")
    .arg(&file)
    .args(["--parent", &b1, "--kind", "end", "--slot", "true"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("already has"));

  let replaced = branchwork(dir.path())
    .arg("--config")
    .arg(&config)
    .arg("add")
    .arg(&file)
    .args(["--parent", &b1, "--kind", "end", "--slot", "true"])
    .output()
    .unwrap();
  assert!(replaced.status.success());
  let replaced = String::from_utf8(replaced.stdout).unwrap().trim().to_string();
  assert_eq!(read_json(&file)["nodes"][&b1]["branches"]["true"], replaced.as_str());

  branchwork(dir.path())
    .arg("validate")
    .arg(&file)
    .assert()
    .code(1);
}

#[test]
fn test_missing_explicit_config_is_an_error() {
  let dir = TempDir::new().unwrap();
  let file = new_workflow(&dir);
  branchwork(dir.path())
    .arg("--config")
    .arg(dir.path().join("nope.json"))
    .arg("depth")
    .arg(&file)
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to load config"));
}

#[test]
fn test_end_node_children_survive_rewrite_and_fail_validation() {
  let dir = TempDir::new().unwrap();
  let file = dir.path().join("stray.json");
  std::fs::write(
    &file,
    r#"{
      "root_id": "start",
      "nodes": {
        "start": { "id": "start", "label": "Start", "type": "start", "children": ["e1", "a1"] },
        "e1": { "id": "e1", "label": "End", "type": "end", "children": ["a1"] },
        "a1": { "id": "a1", "label": "Act", "type": "action" }
      }
    }"#,
  )
  .unwrap();

  branchwork(dir.path())
    .arg("relabel")
    .arg(&file)
    .arg("a1")
    .arg("Renamed")
    .assert()
    .success();
  let json = read_json(&file);
  assert_eq!(json["nodes"]["e1"]["children"], serde_json::json!(["a1"]));
  assert_eq!(json["nodes"]["a1"]["label"], "Renamed");

  branchwork(dir.path())
    .arg("validate")
    .arg(&file)
    .assert()
    .code(1)
    .stdout(predicate::str::contains("end node 'e1' has children"));
}

#[test]
fn test_branch_node_with_children_fails_to_load() {
  let dir = TempDir::new().unwrap();
  let file = dir.path().join("bad.json");
  std::fs::write(
    &file,
    r#"{
      "root_id": "start",
      "nodes": {
        "start": { "id": "start", "label": "Start", "type": "start", "children": ["b1"] },
        "b1": { "id": "b1", "label": "Cond", "type": "branch", "children": ["start"] }
      }
    }"#,
  )
  .unwrap();

  branchwork(dir.path())
    .arg("validate")
    .arg(&file)
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to parse workflow file"))
    .stderr(predicate::str::contains("branch node 'b1' cannot have children"));
}

#[test]
fn test_rewrites_keep_nodes_in_id_order() {
  let dir = TempDir::new().unwrap();
  let file = new_workflow(&dir);
  let a1 = add(&dir, &file, &["--parent", "start", "--kind", "action"]);
  add(&dir, &file, &["--parent", &a1, "--kind", "end"]);
  add(&dir, &file, &["--parent", "start", "--kind", "end", "--position", "5"]);

  let content = std::fs::read_to_string(&file).unwrap();
  let json = read_json(&file);
  let positions: Vec<usize> = json["nodes"]
    .as_object()
    .unwrap()
    .keys()
    .map(|id| content.find(&format!("\"{id}\": {{")).unwrap())
    .collect();
  assert_eq!(positions.len(), 4);
  assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "{content}");

  branchwork(dir.path())
    .arg("relabel")
    .arg(&file)
    .arg(&a1)
    .arg("New Action")
    .assert()
    .success();
  assert_eq!(std::fs::read_to_string(&file).unwrap(), content);
}
