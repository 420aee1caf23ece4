//! E2E planning workflow: `cgraph plan`, `cgraph graph` and `cgraph explore`
//! against a catalog written to a temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

const MATH: &str = r#"{
    "MATH 332": [["MATH 220", "prereq"], ["MATH 251", "coreq"]],
    "MATH 251": [["MATH 100", "prereq"]],
    "MATH 220": [["MATH 100", "prereq"]]
}"#;

fn cgraph_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cgraph"));
    cmd.current_dir(dir);
    cmd.env("COURSEGRAPH_LOG", "error");
    cmd.env("FORMAT", "text");
    cmd.env("XDG_CONFIG_HOME", dir.join(".config"));
    cmd
}

fn project(catalog: &str) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("math.json"), catalog).expect("write catalog");
    dir
}

fn plan_json(dir: &Path, args: &[&str]) -> Value {
    let output = cgraph_cmd(dir)
        .args(["--catalog", "math.json", "plan", "--json"])
        .args(args)
        .output()
        .expect("plan should not crash");
    assert!(
        output.status.success(),
        "plan failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

#[test]
fn plan_text_lists_layers() {
    let dir = project(MATH);
    cgraph_cmd(dir.path())
        .args(["--catalog", "math.json", "plan", "MATH 332"])
        .assert()
        .success()
        .stdout("0\tMATH 100\n1\tMATH 220 MATH 251\n2\tMATH 332\n");
}

#[test]
fn plan_json_reports_selection() {
    let dir = project(MATH);
    let json = plan_json(dir.path(), &["MATH 332", "-x", "MATH 220"]);
    assert_eq!(json["targets"], serde_json::json!(["MATH 332"]));
    assert_eq!(json["excluded"], serde_json::json!(["MATH 220"]));
    assert_eq!(json["excluded_targets"], "drop");
    assert_eq!(
        json["layers"],
        serde_json::json!([["MATH 100"], ["MATH 251"], ["MATH 332"]])
    );
}

#[test]
fn plan_without_coreqs_drops_coreq_branch() {
    let dir = project(MATH);
    let json = plan_json(dir.path(), &["MATH 332", "--no-coreqs"]);
    assert_eq!(json["include_coreqs"], false);
    assert_eq!(
        json["layers"],
        serde_json::json!([["MATH 100"], ["MATH 220"], ["MATH 332"]])
    );
}

#[test]
fn excluded_target_follows_policy() {
    let dir = project(MATH);
    let dropped = plan_json(dir.path(), &["MATH 332", "-x", "MATH 332"]);
    assert_eq!(dropped["layers"], serde_json::json!([]));

    let retained = plan_json(
        dir.path(),
        &["MATH 332", "-x", "MATH 332", "--excluded-targets", "retain"],
    );
    assert_eq!(retained["layers"][2], serde_json::json!(["MATH 332"]));
}

#[test]
fn short_codes_merge_spellings() {
    let dir = project(MATH);
    cgraph_cmd(dir.path())
        .args(["--catalog", "math.json", "--short-codes", "plan", "MATH\u{a0}220"])
        .assert()
        .success()
        .stdout("0\tM100\n1\tM220\n");
}

#[test]
fn unknown_target_is_planned_alone() {
    let dir = project(MATH);
    let json = plan_json(dir.path(), &["PHYS 101"]);
    assert_eq!(json["layers"], serde_json::json!([["PHYS 101"]]));
    assert_eq!(json["unknown_targets"], serde_json::json!(["PHYS 101"]));
}

#[test]
fn cyclic_plan_fails_with_code() {
    let dir = project(r#"{"A": [["B", "prereq"]], "B": [["A", "prereq"]]}"#);
    cgraph_cmd(dir.path())
        .args(["--catalog", "math.json", "plan", "A"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E2003]"))
        .stderr(predicate::str::contains("A, B"));
}

#[test]
fn cyclic_plan_error_is_json_in_json_mode() {
    let dir = project(r#"{"A": [["A", "prereq"]]}"#);
    let output = cgraph_cmd(dir.path())
        .args(["--catalog", "math.json", "--json", "plan", "A"])
        .output()
        .expect("plan should not crash");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let start = stderr.find('{').expect("json error");
    let end = stderr.rfind('}').expect("json error");
    let json: Value = serde_json::from_str(&stderr[start..=end]).expect("valid JSON");
    assert_eq!(json["error"]["error_code"], "E2003");
}

#[test]
fn graph_dot_output() {
    let dir = project(MATH);
    cgraph_cmd(dir.path())
        .args(["--catalog", "math.json", "graph", "MATH 332", "--dot"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph prerequisites {"))
        .stdout(predicate::str::contains(
            "\"MATH 251\" -> \"MATH 332\" [color=\"blue\", style=dashed];",
        ));
}

#[test]
fn graph_json_has_positions() {
    let dir = project(MATH);
    let output = cgraph_cmd(dir.path())
        .args(["--catalog", "math.json", "graph", "MATH 332", "--json"])
        .output()
        .expect("graph should not crash");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    let nodes = json["nodes"].as_array().expect("nodes");
    assert_eq!(nodes.len(), 4);
    assert_eq!(nodes[0]["course"], "MATH 100");
    assert_eq!(nodes[0]["y"], 0.0);
    assert_eq!(json["edges"].as_array().expect("edges").len(), 4);
}

#[test]
fn explore_session_from_stdin() {
    let dir = project(MATH);
    cgraph_cmd(dir.path())
        .args(["--catalog", "math.json", "explore"])
        .write_stdin("target MATH 220\nexclude MATH 100\nbogus\ncoreqs off\nquit\n")
        .assert()
        .success()
        .stdout("0\tMATH 100\n1\tMATH 220\n0\tMATH 220\n0\tMATH 220\n")
        .stderr(predicate::str::contains("error[E2005]"));
}
