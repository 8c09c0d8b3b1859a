//! End-to-end tests for the `reqcat` binary.
//!
//! Covers the three run outcomes (bundle written, cycle, missing file) and
//! their exit codes, plus the read-only inspection commands.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn reqcat(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("reqcat"));
    cmd.current_dir(dir);
    cmd.env("RUST_LOG", "error");
    cmd
}

fn tree(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (rel, content) in files {
        let path = dir.path().join("tree").join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

#[test]
fn build_writes_artifact_in_dependency_order() {
    let dir = tree(&[
        ("A", "a body\n"),
        ("B", "require 'A'\nb body\n"),
        ("C", "require 'B'\nc body\n"),
    ]);

    reqcat(dir.path())
        .args(["--root", "tree"])
        .assert()
        .success()
        .stdout("A\nB\nC\n");

    let artifact = fs::read_to_string(dir.path().join("output.txt")).unwrap();
    assert_eq!(
        artifact,
        "A\na body\n\nB\nrequire 'A'\nb body\n\nC\nrequire 'B'\nc body\n\n"
    );
}

#[test]
fn build_print_echoes_artifact() {
    let dir = tree(&[("only", "hello\n")]);

    reqcat(dir.path())
        .args(["-r", "tree", "build", "-o", "custom.txt", "--print"])
        .assert()
        .success()
        .stdout("only\nonly\nhello\n\n");

    assert!(dir.path().join("custom.txt").exists());
    assert!(!dir.path().join("output.txt").exists());
}

#[test]
fn cycle_exits_with_code_2_and_writes_nothing() {
    let dir = tree(&[("A", "require 'B'\n"), ("B", "require 'A'\n")]);

    reqcat(dir.path())
        .args(["-r", "tree"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("A -> B -> A"));

    assert!(!dir.path().join("output.txt").exists());
}

#[test]
fn missing_file_exits_with_code_3_and_writes_nothing() {
    let dir = tree(&[("A", "require 'Z'\n")]);

    reqcat(dir.path())
        .args(["-r", "tree"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("missing dependencies: Z"));

    assert!(!dir.path().join("output.txt").exists());
}

#[test]
fn malformed_require_exits_with_code_4() {
    let dir = tree(&[("A", "require 'B\n")]);

    reqcat(dir.path())
        .args(["-r", "tree", "order"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("A:1"));
}

#[test]
fn config_file_sets_root_and_output() {
    let dir = tree(&[("x", "require 'y'\n"), ("y", "")]);
    fs::write(
        dir.path().join("reqcat.toml"),
        "root = \"tree\"\noutput = \"out/bundle.txt\"\n",
    )
    .unwrap();

    reqcat(dir.path()).assert().success().stdout("y\nx\n");
    assert!(dir.path().join("out/bundle.txt").exists());
}

#[test]
fn config_root_is_relative_to_config_file() {
    let dir = tree(&[("conf/src/x", "x\n")]);
    fs::write(
        dir.path().join("tree/conf/reqcat.toml"),
        "root = \"src\"\n",
    )
    .unwrap();

    reqcat(dir.path())
        .args(["-c", "tree/conf/reqcat.toml", "order"])
        .assert()
        .success()
        .stdout("x\n");
}

#[test]
fn absolute_require_is_reported_missing() {
    let dir = tree(&[("A", "require '/B'\n"), ("B", "")]);

    reqcat(dir.path())
        .args(["-r", "tree"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("missing dependencies: /B"));
}

#[test]
fn bad_config_exits_with_code_5() {
    let dir = tree(&[("x", "")]);
    fs::write(dir.path().join("reqcat.toml"), "root = [").unwrap();

    reqcat(dir.path()).args(["-r", "tree"]).assert().code(5);
}

#[test]
fn order_json_lists_files() {
    let dir = tree(&[("lib/a", ""), ("main", "require 'lib/a'\n")]);

    let output = reqcat(dir.path())
        .args(["-r", "tree", "order", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json, serde_json::json!(["lib/a", "main"]));
    assert!(!dir.path().join("output.txt").exists());
}

#[test]
fn check_json_reports_cycles_and_missing() {
    let dir = tree(&[
        ("a", "require 'b'\n"),
        ("b", "require 'a'\n"),
        ("c", "require 'ghost'\n"),
    ]);

    let output = reqcat(dir.path())
        .args(["-r", "tree", "check", "--json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["cycle"], serde_json::json!(["a", "b", "a"]));
    assert_eq!(json["cycle_groups"], serde_json::json!([["a", "b"]]));
    assert_eq!(json["missing"], serde_json::json!(["ghost"]));
    assert_eq!(json["graph"]["file_count"], 3);
}

#[test]
fn check_clean_tree_succeeds() {
    let dir = tree(&[("a", ""), ("b", "require 'a'\n")]);

    reqcat(dir.path())
        .args(["-r", "tree", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ No cycles"));
}

#[test]
fn deps_shows_both_directions() {
    let dir = tree(&[
        ("app", "require 'lib'\n"),
        ("lib", "require 'util'\n"),
        ("util", ""),
    ]);

    let output = reqcat(dir.path())
        .args(["-r", "tree", "deps", "lib", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["direct"], serde_json::json!(["util"]));
    assert_eq!(json["transitive"], serde_json::json!(["util"]));
    assert_eq!(json["dependents"], serde_json::json!(["app"]));
}

#[test]
fn stats_counts_unresolved() {
    let dir = tree(&[("a", "require 'b'\nrequire 'nope'\n"), ("b", "")]);

    let output = reqcat(dir.path())
        .args(["-r", "tree", "stats", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["file_count"], 2);
    assert_eq!(json["edge_count"], 2);
    assert_eq!(json["unresolved_count"], 1);
}
