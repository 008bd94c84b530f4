//! CLI integration tests using assert_cmd.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn quizmark() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("quizmark").unwrap()
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../quizzes")
        .join(name)
}

/// A command running in `dir` with no user config and data kept in `dir`.
fn quizmark_in(dir: &TempDir) -> Command {
    let mut cmd = quizmark();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("QUIZMARK_DATA_DIR", dir.path().join("data"));
    cmd
}

fn write_answers(dir: &TempDir, json: &str) -> PathBuf {
    let path = dir.path().join("answers.json");
    std::fs::write(&path, json).unwrap();
    path
}

#[test]
fn validate_question_file() {
    quizmark()
        .arg("validate")
        .arg("--questions")
        .arg(fixture("rust-basics.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("5 questions, 1 multi-select"))
        .stdout(predicate::str::contains("All question sets valid"));
}

#[test]
fn validate_directory() {
    quizmark()
        .arg("validate")
        .arg("--questions")
        .arg("../../quizzes")
        .assert()
        .success()
        .stdout(predicate::str::contains("rust-basics"))
        .stdout(predicate::str::contains("first-letters"));
}

#[test]
fn validate_nonexistent_file() {
    quizmark()
        .arg("validate")
        .arg("--questions")
        .arg("nonexistent.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_rejects_bad_correct_index() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(
        &path,
        r#"[{"question": "Q?", "options": ["a", "b"], "correct": [5]}]"#,
    )
    .unwrap();

    quizmark()
        .arg("validate")
        .arg("--questions")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid question"));
}

#[test]
fn grade_text_output() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(&dir, r#"{"0": [0], "1": [0], "2": [2], "3": [1], "4": [0]}"#);

    quizmark_in(&dir)
        .arg("grade")
        .arg("--questions")
        .arg(fixture("rust-basics.json"))
        .arg("--answers")
        .arg(&answers)
        .arg("--time-taken")
        .arg("125")
        .assert()
        .success()
        .stdout(predicate::str::contains("rust-basics: 3/5 (60%) in 02:05"))
        .stdout(predicate::str::contains("Good job."))
        .stdout(predicate::str::contains("Correct: 3  Partial: 1  Incorrect: 1"));
}

#[test]
fn grade_json_output() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(&dir, r#"{"0": [0], "1": [0, 2], "2": [1], "3": [1], "4": [0]}"#);

    let output = quizmark_in(&dir)
        .arg("grade")
        .arg("--questions")
        .arg(fixture("rust-basics.json"))
        .arg("--answers")
        .arg(&answers)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["quiz_title"], "rust-basics");
    assert_eq!(report["result"]["score"], 5);
    assert_eq!(report["result"]["percentage"], 100);
    assert_eq!(report["result"]["time_taken_seconds"], serde_json::Value::Null);
}

#[test]
fn grade_missing_answers_count_as_incorrect() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(&dir, "{}");

    quizmark_in(&dir)
        .arg("grade")
        .arg("--questions")
        .arg(fixture("first-letters.json"))
        .arg("--answers")
        .arg(&answers)
        .assert()
        .success()
        .stdout(predicate::str::contains("0/3 (0%) in N/A"))
        .stdout(predicate::str::contains("Incorrect: 3"));
}

#[test]
fn grade_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(&dir, "{}");

    quizmark_in(&dir)
        .arg("grade")
        .arg("--questions")
        .arg(fixture("first-letters.json"))
        .arg("--answers")
        .arg(&answers)
        .arg("--format")
        .arg("xml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn grade_writes_csv_and_html() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(&dir, r#"{"0": [0], "1": [1], "2": [0]}"#);
    let csv = dir.path().join("out/results.csv");
    let html = dir.path().join("out/results.html");

    quizmark_in(&dir)
        .arg("grade")
        .arg("--questions")
        .arg(fixture("first-letters.json"))
        .arg("--answers")
        .arg(&answers)
        .arg("--csv")
        .arg(&csv)
        .arg("--html")
        .arg(&html)
        .assert()
        .success()
        .stderr(predicate::str::contains("CSV export"))
        .stderr(predicate::str::contains("HTML report"));

    let csv = std::fs::read_to_string(&csv).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some(r#""Question","Your answer","Correct answer","Result","Explanation""#)
    );
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.contains(r#""Which number is smallest?","2","1","Incorrect","""#));

    let html = std::fs::read_to_string(&html).unwrap();
    assert!(html.contains("<!DOCTYPE html>"));
    assert!(html.contains("Which letter comes first in the alphabet?"));
}

#[test]
fn grade_records_high_score() {
    let dir = TempDir::new().unwrap();
    let good = write_answers(&dir, r#"{"0": [0], "1": [0], "2": [0]}"#);

    quizmark_in(&dir)
        .arg("grade")
        .arg("--questions")
        .arg(fixture("first-letters.json"))
        .arg("--answers")
        .arg(&good)
        .arg("--quiz")
        .arg("letters")
        .assert()
        .success()
        .stdout(predicate::str::contains("New high score for letters!"));

    let worse = write_answers(&dir, r#"{"0": [1], "1": [0], "2": [0]}"#);
    quizmark_in(&dir)
        .arg("grade")
        .arg("--questions")
        .arg(fixture("first-letters.json"))
        .arg("--answers")
        .arg(&worse)
        .arg("--quiz")
        .arg("letters")
        .assert()
        .success()
        .stdout(predicate::str::contains("New high score").not());

    quizmark_in(&dir)
        .arg("scores")
        .assert()
        .success()
        .stdout(predicate::str::contains("letters"))
        .stdout(predicate::str::contains("100%"))
        .stdout(predicate::str::contains("3/3"));
}

#[test]
fn scores_empty() {
    let dir = TempDir::new().unwrap();
    quizmark_in(&dir)
        .arg("scores")
        .assert()
        .success()
        .stdout(predicate::str::contains("No high scores recorded yet."));

    quizmark_in(&dir)
        .arg("scores")
        .arg("--quiz")
        .arg("sample")
        .assert()
        .success()
        .stdout(predicate::str::contains("No high score recorded for sample."));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();
    quizmark_in(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created quizmark.toml"))
        .stdout(predicate::str::contains("Created quizzes/sample.json"));

    assert!(dir.path().join("quizmark.toml").exists());
    assert!(dir.path().join("quizzes/sample.json").exists());

    quizmark_in(&dir)
        .arg("validate")
        .arg("--questions")
        .arg("quizzes/sample.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 questions"));
}

#[test]
fn init_skips_existing_files() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("quizmark.toml"), "# mine\n").unwrap();

    quizmark_in(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("quizmark.toml already exists, skipping."));

    let content = std::fs::read_to_string(dir.path().join("quizmark.toml")).unwrap();
    assert_eq!(content, "# mine\n");
}

#[test]
fn list_without_config() {
    let dir = TempDir::new().unwrap();
    quizmark_in(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No quizzes configured"));
}

#[test]
fn list_after_init() {
    let dir = TempDir::new().unwrap();
    quizmark_in(&dir).arg("init").assert().success();

    quizmark_in(&dir)
        .arg("list")
        .arg("--check")
        .assert()
        .success()
        .stdout(predicate::str::contains("sample"))
        .stdout(predicate::str::contains("Rust warm-up"))
        .stdout(predicate::str::contains("3"));
}

#[test]
fn help_lists_commands() {
    quizmark()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("take"))
        .stdout(predicate::str::contains("grade"))
        .stdout(predicate::str::contains("validate"));
}
