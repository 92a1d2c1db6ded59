//! Integration tests for the `fieldfind` binary.
//!
//! Each test writes a class model to a temp dir and runs the built binary
//! against it.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const MODEL: &str = r#"
[[class]]
name = "demo.Base"

[[class.field]]
name = "count"
type = "int"
modifiers = "PRIVATE|STATIC"
value = 3

[[class.field]]
name = "flag"
type = "boolean"
modifiers = "PRIVATE"

[[class]]
name = "demo.Child"
extends = "demo.Base"

[[class.field]]
name = "label"
type = "String"
"#;

fn write_model(dir: &Path) -> PathBuf {
    let path = dir.join("model.toml");
    std::fs::write(&path, MODEL).expect("write model failed");
    path
}

fn fieldfind(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fieldfind"))
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("FIELDFIND_LOG")
        .output()
        .expect("failed to run fieldfind")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ────────────────────────────────────────────────────────────────────────────
// query
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_query_finds_inherited_static() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path());
    let output = fieldfind(&[
        "query",
        model.to_str().unwrap(),
        "--class",
        "demo.Child",
        "--name",
        "count",
        "--ancestors",
    ]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("count"), "unexpected output: {}", text);
    assert!(text.contains("in demo.Base"));
    assert!(text.contains("= 3"));
}

#[test]
fn test_query_order_json() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path());
    let output = fieldfind(&[
        "query",
        model.to_str().unwrap(),
        "--class",
        "demo.Base",
        "--name",
        "count",
        "--order",
        "1",
        "--json",
    ]);

    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows[0]["name"], "flag");
    assert_eq!(rows[0]["type"], "boolean");
}

#[test]
fn test_query_miss_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path());
    let output = fieldfind(&[
        "query",
        model.to_str().unwrap(),
        "--class",
        "demo.Child",
        "--name",
        "count",
    ]);

    assert_eq!(output.status.code(), Some(1));
    let err = String::from_utf8_lossy(&output.stderr);
    assert!(err.contains("not found"), "unexpected stderr: {}", err);
}

#[test]
fn test_query_without_conditions_fails() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path());
    let output = fieldfind(&["query", model.to_str().unwrap(), "--class", "demo.Base"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid finder spec"));
}

#[test]
fn test_query_verbose_logs_model_load() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path());
    let output = fieldfind(&[
        "--verbose",
        "query",
        model.to_str().unwrap(),
        "--class",
        "demo.Base",
        "--name",
        "flag",
    ]);

    assert!(output.status.success());
    let err = String::from_utf8_lossy(&output.stderr);
    assert!(err.contains("Loaded class model"), "unexpected stderr: {}", err);
    assert!(err.contains("Translated query"));
}

#[test]
fn test_query_quiet_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path());
    let output = fieldfind(&[
        "query",
        model.to_str().unwrap(),
        "--class",
        "demo.Base",
        "--name",
        "flag",
    ]);

    assert!(output.status.success());
    assert!(!String::from_utf8_lossy(&output.stderr).contains("Loaded class model"));
}

// ────────────────────────────────────────────────────────────────────────────
// classes
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_classes_lists_model() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path());
    let output = fieldfind(&["classes", model.to_str().unwrap()]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("demo.Child extends demo.Base"));
    assert!(text.contains("private static int count = 3"));
}

#[test]
fn test_classes_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = fieldfind(&["classes", dir.path().join("absent.toml").to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load class model"));
}
