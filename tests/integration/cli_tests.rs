use super::Sandbox;
use assert_cmd::Command;
use predicates::prelude::*;

#[allow(deprecated)]
#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("codeflux").unwrap();
    cmd.arg("--version").assert().success();
}

#[allow(deprecated)]
#[test]
fn test_cli_help_lists_commands() {
    let mut cmd = Command::cargo_bin("codeflux").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("patterns"))
        .stdout(predicate::str::contains("quiz"));
}

#[test]
fn test_patterns_json_lists_bundled_content() {
    let sandbox = Sandbox::new();
    let output = sandbox
        .command()
        .args(["patterns", "--output-format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["fastSlowPointers", "slidingWindow", "twoPointers"]);
    assert_eq!(rows[1]["status"], "yet-to-start");
}

#[test]
fn test_quiz_with_answers_records_score() {
    let sandbox = Sandbox::new();
    sandbox
        .command()
        .args(["quiz", "twoPointers", "--seed", "7", "--answers", "0,0,0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("You scored"));

    let store = std::fs::read_to_string(sandbox.store_path()).unwrap();
    assert!(store.contains("pattern_quiz_score_twoPointers"));
    assert!(store.contains("completed"));
}

#[test]
fn test_quiz_with_missing_answers_asks_for_all() {
    let sandbox = Sandbox::new();
    sandbox
        .command()
        .args(["quiz", "twoPointers", "--answers", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Please answer all questions"));
    assert!(!sandbox.store_path().exists());
}

#[test]
fn test_unknown_pattern_is_content_error() {
    let sandbox = Sandbox::new();
    sandbox
        .command()
        .args(["note", "bubbleSort"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("bubbleSort"));
}

#[test]
fn test_note_round_trip() {
    let sandbox = Sandbox::new();
    sandbox
        .command()
        .args(["note", "slidingWindow"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No note yet"));

    sandbox
        .command()
        .args(["note", "slidingWindow", "add right, drop left"])
        .assert()
        .success();

    sandbox
        .command()
        .args(["note", "slidingWindow"])
        .assert()
        .success()
        .stdout(predicate::str::contains("add right, drop left"));
}

#[test]
fn test_play_fast_completes_and_records_progress() {
    let sandbox = Sandbox::new();
    sandbox
        .command()
        .args(["play", "slidingWindow", "--fast", "--array", "1,2,3,4", "--window", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Walkthrough complete"));

    sandbox
        .command()
        .args(["status", "--output-format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"completed\": 1"));
}

#[test]
fn test_play_reports_corrected_input() {
    let sandbox = Sandbox::new();
    sandbox
        .command()
        .args(["play", "slidingWindow", "--fast", "--window", "zero"])
        .assert()
        .success()
        .stdout(predicate::str::contains("zero"));
}

#[test]
fn test_ask_without_key_is_config_error() {
    let sandbox = Sandbox::new();
    sandbox
        .command()
        .args(["ask", "slidingWindow", "why drop the left element?"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("API key"));
}

#[test]
fn test_broken_config_is_config_error() {
    let sandbox = Sandbox::new();
    std::fs::write(sandbox.dir.path().join("broken.toml"), "[tutor\n").unwrap();
    sandbox
        .command()
        .args(["--config", "broken.toml", "status"])
        .assert()
        .code(2);
}
