//! Integration tests for the `jt` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to run the fmt, get, paths,
//! set, and rm subcommands through the actual binary, covering stdin/stdout
//! piping, file I/O, chunked parsing, and exit codes.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: path to the sample.json fixture.
fn sample_json_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/sample.json")
}

fn jt() -> Command {
    Command::cargo_bin("jt").unwrap()
}

/// Helper: run `jt` with `args` on `stdin` and parse stdout as JSON.
fn run_json(args: &[&str], stdin: &str) -> serde_json::Value {
    let output = jt().args(args).write_stdin(stdin).output().unwrap();
    assert!(
        output.status.success(),
        "jt {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout must be JSON")
}

// ─────────────────────────────────────────────────────────────────────────────
// fmt
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn fmt_compacts_stdin() {
    jt().arg("fmt")
        .write_stdin("{ \"a\" : [ 1 , 2.0 ] ,\n \"b\" : null }")
        .assert()
        .success()
        .stdout("{\"a\":[1,2.0],\"b\":null}\n");
}

#[test]
fn fmt_pretty() {
    jt().args(["fmt", "--pretty"])
        .write_stdin(r#"{"a":[1]}"#)
        .assert()
        .success()
        .stdout("{\n  \"a\": [\n    1\n  ]\n}\n");
}

#[test]
fn fmt_pretty_custom_indent() {
    jt().args(["fmt", "--pretty", "--indent", "4"])
        .write_stdin(r#"{"a":1}"#)
        .assert()
        .success()
        .stdout("{\n    \"a\": 1\n}\n");
}

#[test]
fn fmt_preserves_key_order() {
    jt().arg("fmt")
        .write_stdin(r#"{"z":1,"a":2,"m":3}"#)
        .assert()
        .success()
        .stdout("{\"z\":1,\"a\":2,\"m\":3}\n");
}

#[test]
fn fmt_chunked_matches_whole() {
    let whole = jt()
        .args(["fmt", "-i", sample_json_path()])
        .output()
        .unwrap();
    let expected = String::from_utf8(whole.stdout).unwrap();
    for size in ["1", "3", "64"] {
        jt().args(["fmt", "--chunk-size", size, "-i", sample_json_path()])
            .assert()
            .success()
            .stdout(predicate::str::diff(expected.clone()));
    }
}

#[test]
fn fmt_rejects_zero_chunk_size() {
    jt().args(["fmt", "--chunk-size", "0"])
        .write_stdin("1")
        .assert()
        .failure();
}

#[test]
fn fmt_syntax_error_reports_position() {
    jt().arg("fmt")
        .write_stdin("[1,\n  2,,]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 1"))
        .stderr(predicate::str::contains("array-next"));
}

#[test]
fn fmt_numeric_range_error() {
    jt().arg("fmt")
        .write_stdin("[99999999999999999999]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn fmt_missing_file_fails() {
    jt().args(["fmt", "-i", "/nonexistent/input.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn fmt_writes_output_file() {
    let dir = std::env::temp_dir().join(format!("jt-cli-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let out = dir.join("out.json");

    jt().args(["fmt", "-o", out.to_str().unwrap()])
        .write_stdin("[ true ]")
        .assert()
        .success()
        .stdout("");

    assert_eq!(std::fs::read_to_string(&out).unwrap(), "[true]\n");
    std::fs::remove_dir_all(&dir).ok();
}

// ─────────────────────────────────────────────────────────────────────────────
// get / paths
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn get_nested_value() {
    jt().args(["get", "items/1/label", "-i", sample_json_path()])
        .assert()
        .success()
        .stdout("\"gear\"\n");
}

#[test]
fn get_array_length() {
    jt().args(["get", "items/#", "-i", sample_json_path()])
        .assert()
        .success()
        .stdout("3\n");
}

#[test]
fn get_wildcard_returns_first_match() {
    jt().args(["get", "items/*/secret", "-i", sample_json_path()])
        .assert()
        .success()
        .stdout("\"x\"\n");
}

#[test]
fn get_missing_fails() {
    jt().args(["get", "meta/missing", "-i", sample_json_path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No value at path"));
}

#[test]
fn get_pretty_subtree() {
    jt().args(["get", "meta", "--pretty", "-i", sample_json_path()])
        .assert()
        .success()
        .stdout("{\n  \"owner\": null,\n  \"active\": true\n}\n");
}

#[test]
fn paths_lists_concrete_matches() {
    jt().args(["paths", "items/*/tags/*", "-i", sample_json_path()])
        .assert()
        .success()
        .stdout("items/0/tags/0\nitems/0/tags/1\nitems/2/tags/0\n");
}

#[test]
fn paths_no_match_prints_nothing() {
    jt().args(["paths", "nope/*"])
        .write_stdin("{}")
        .assert()
        .success()
        .stdout("");
}

// ─────────────────────────────────────────────────────────────────────────────
// set / rm
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn set_materializes_structure() {
    let value = run_json(&["set", "e/#", "5"], r#"{"a":1}"#);
    assert_eq!(value, serde_json::json!({"a": 1, "e": [5]}));
}

#[test]
fn set_object_literal() {
    let value = run_json(&["set", "b", r#"{"k":[true]}"#], r#"{"a":1}"#);
    assert_eq!(value, serde_json::json!({"a": 1, "b": {"k": [true]}}));
}

#[test]
fn set_no_insert_leaves_document() {
    jt().args(["set", "b", "2", "--no-insert"])
        .write_stdin(r#"{"a":1}"#)
        .assert()
        .success()
        .stdout("{\"a\":1}\n");
}

#[test]
fn set_wildcard_updates_every_element() {
    let value = run_json(&["set", "*/n", "0"], r#"[{"n":1},{"n":2}]"#);
    assert_eq!(value, serde_json::json!([{"n": 0}, {"n": 0}]));
}

#[test]
fn set_through_atom_fails() {
    jt().args(["set", "a/b", "1"])
        .write_stdin(r#"{"a":3}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to set 'a/b'"))
        .stderr(predicate::str::contains("cannot descend into Integer"));
}

#[test]
fn set_invalid_value_fails() {
    jt().args(["set", "a", "{oops"])
        .write_stdin("{}")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse value"));
}

#[test]
fn rm_wildcard_key() {
    let value = run_json(&["rm", "items/*/secret", "-i", sample_json_path()], "");
    let items = value["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|item| item.get("secret").is_none()));
    assert_eq!(value["name"], "inventory");
}

#[test]
fn rm_nothing_fails() {
    jt().args(["rm", "missing"])
        .write_stdin(r#"{"a":1}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to remove"));
}

#[test]
fn rm_array_element() {
    let value = run_json(&["rm", "1"], "[1,2,3]");
    assert_eq!(value, serde_json::json!([1, 3]));
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn verbose_logs_to_stderr_only() {
    jt().args(["-v", "fmt", "--chunk-size", "2"])
        .write_stdin("[1, 2]")
        .assert()
        .success()
        .stdout("[1,2]\n")
        .stderr(predicate::str::contains("fed input in chunks"));
}

#[test]
fn no_subcommand_shows_usage() {
    jt().assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
