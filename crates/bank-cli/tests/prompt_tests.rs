// 交互式会话：通过 stdin 驱动 bank-predict

use assert_cmd::Command;
use bank_core::fixtures::write_artifacts;
use bank_core::schema::FIELDS;
use tempfile::{tempdir, TempDir};

const WELCOME: &str = "Welcome to the Interactive Prediction Program!";
const GOODBYE: &str = "Exiting the program. Thank you!";

fn model_dir() -> TempDir {
    let dir = tempdir().unwrap();
    write_artifacts(dir.path()).unwrap();
    dir
}

/// 跑一次会话，返回 stdout
fn session(dir: &TempDir, lines: &[&str]) -> String {
    let out = Command::cargo_bin("bank-predict")
        .unwrap()
        .arg("--model-dir")
        .arg(dir.path())
        .arg("--log")
        .arg("warn")
        .write_stdin(lines.join("\n") + "\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8(out).unwrap()
}

fn position(name: &str) -> usize {
    FIELDS.iter().position(|f| f.name == name).unwrap()
}

#[test]
fn all_empty_answers_report_every_default() {
    let dir = model_dir();
    let mut lines = vec![""; FIELDS.len()];
    lines.push("no");

    let out = session(&dir, &lines);
    assert!(out.starts_with(WELCOME));
    assert!(out.contains("Valid options for job: ['housemaid', 'services',"));
    assert_eq!(out.matches("Invalid input").count(), FIELDS.len());
    assert!(out.contains(" <<<- Invalid input for pdays. Using default value 999."));
    assert!(out.contains(" <<<- Invalid input for emp.var.rate. Using default value 1.1."));
    assert!(out.contains("Predicted probabilities: no = 0.82, yes = 0.18"));
    assert!(out.contains("The predicted outcome is: no"));
    assert!(out.trim_end().ends_with(GOODBYE));
}

#[test]
fn valid_answers_print_no_notice() {
    let dir = model_dir();
    let mut lines: Vec<String> = FIELDS.iter().map(|f| f.default.to_value().to_string()).collect();
    lines[position("age")] = "52".into();
    lines[position("euribor3m")] = "1.25".into();
    lines.push("no".into());
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();

    let out = session(&dir, &lines);
    assert!(!out.contains("Invalid input"));
    assert!(out.contains("The predicted outcome is: no"));
}

#[test]
fn invalid_values_are_reported_with_default() {
    let dir = model_dir();
    let mut lines = vec!["1"; FIELDS.len()];
    lines[position("age")] = "thirty";
    lines[position("job")] = "astronaut";
    lines[position("campaign")] = "1e5";
    lines.push("no");

    let out = session(&dir, &lines);
    assert!(out.contains(" <<<- Invalid input for age. Using default value 35."));
    assert!(out.contains(" <<<- Invalid input for job. Using default value technician."));
    assert!(out.contains(" <<<- Invalid input for campaign. Using default value 1."));
}

#[test]
fn yes_loops_for_another_record() {
    let dir = model_dir();
    let mut lines = vec![""; FIELDS.len()];
    lines.push(" YES ");
    let mut second = vec![""; FIELDS.len()];
    second[position("poutcome")] = "success";
    lines.extend(second);
    lines.push("no");

    let out = session(&dir, &lines);
    assert_eq!(out.matches("Predicted probabilities").count(), 2);
    assert!(out.contains("The predicted outcome is: no"));
    assert!(out.contains("The predicted outcome is: yes"));
}

#[test]
fn eof_mid_record_exits_cleanly() {
    let dir = model_dir();
    let out = session(&dir, &["40", "student"]);
    assert!(out.trim_end().ends_with(GOODBYE));
    assert!(!out.contains("Predicted probabilities"));
}
