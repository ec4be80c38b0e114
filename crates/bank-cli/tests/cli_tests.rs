// bank-predict 二进制的端到端测试

use assert_cmd::Command;
use bank_core::fixtures::write_artifacts;
use bank_core::schema::FIELDS;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn cmd(model_dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("bank-predict").unwrap();
    cmd.arg("--model-dir").arg(model_dir).arg("--log").arg("warn");
    cmd
}

fn default_answers() -> Vec<String> {
    vec![String::new(); FIELDS.len()]
}

#[test]
fn sample_one_shot_prints_probabilities() {
    let dir = tempdir().unwrap();
    write_artifacts(dir.path()).unwrap();

    cmd(dir.path())
        .arg("--sample")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Predicted probabilities: no = 0.82, yes = 0.18",
        ))
        .stdout(predicate::str::contains("The predicted outcome is: no"));
}

#[test]
fn input_file_json_output() {
    let dir = tempdir().unwrap();
    write_artifacts(dir.path()).unwrap();
    let record = dir.path().join("record.json");
    fs::write(&record, r#"{"age": 29, "poutcome": "success"}"#).unwrap();

    let out = cmd(dir.path())
        .arg("--input")
        .arg(&record)
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["label"], "yes");
    assert!(v["proba_positive"].as_f64().unwrap() > 0.8);
    assert!(v["trace_id"].is_string());
}

#[test]
fn threshold_flag_overrides_policy() {
    let dir = tempdir().unwrap();
    write_artifacts(dir.path()).unwrap();

    cmd(dir.path())
        .args(["--sample", "--threshold", "0.1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("The predicted outcome is: yes"));
}

#[test]
fn interactive_session_round_trip() {
    let dir = tempdir().unwrap();
    write_artifacts(dir.path()).unwrap();

    let mut answers = default_answers();
    answers[0] = "not-a-number".into();
    answers.push("no".into());

    cmd(dir.path())
        .write_stdin(answers.join("\n") + "\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Welcome to the Interactive Prediction Program!",
        ))
        .stdout(predicate::str::contains(
            "Invalid input for age. Using default value 35.",
        ))
        .stdout(predicate::str::contains("Exiting the program. Thank you!"));
}

#[test]
fn metrics_snapshot_goes_to_stderr() {
    let dir = tempdir().unwrap();
    write_artifacts(dir.path()).unwrap();

    cmd(dir.path())
        .args(["--sample", "--metrics"])
        .assert()
        .success()
        .stderr(predicate::str::contains("predictions_total"))
        .stderr(predicate::str::contains("stage_fill_us"))
        .stderr(predicate::str::contains("stage_assemble_us"));
}

#[test]
fn missing_artifacts_fail_startup() {
    let dir = tempdir().unwrap();

    cmd(dir.path())
        .arg("--sample")
        .assert()
        .failure()
        .stderr(predicate::str::contains("load artifacts"));
}

#[test]
fn non_object_input_is_rejected() {
    let dir = tempdir().unwrap();
    write_artifacts(dir.path()).unwrap();
    let record = dir.path().join("record.json");
    fs::write(&record, "[1, 2, 3]").unwrap();

    cmd(dir.path())
        .arg("--input")
        .arg(&record)
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be a JSON object"));
}
