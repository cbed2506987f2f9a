//! End-to-end tests of the `invoscan` binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn invoscan() -> Command {
    Command::cargo_bin("invoscan").unwrap()
}

#[test]
fn test_rules_init_prints_default_table() {
    invoscan()
        .args(["rules", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"termsAndConditions\""))
        .stdout(predicate::str::contains("\"collapse_whitespace\": true"));
}

#[test]
fn test_rules_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let rules = dir.path().join("rules.json");
    let text = dir.path().join("invoice.txt");
    std::fs::write(&text, "Description Unit Cost Quantity Amount\nWidget A 10.00 3 30.00\nTOTAL: $1,234.56\n").unwrap();

    invoscan()
        .args(["rules", "init", "--output"])
        .arg(&rules)
        .assert()
        .success();

    invoscan()
        .args(["rules", "test", "--json", "--rules"])
        .arg(&rules)
        .arg(&text)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total\": \"1,234.56\""))
        .stdout(predicate::str::contains("\"description\": \"Widget A\""))
        .stdout(predicate::str::contains("\"discount\": \"Not found\""));
}

#[test]
fn test_invalid_rules_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let rules = dir.path().join("rules.json");
    let text = dir.path().join("invoice.txt");
    std::fs::write(&rules, r#"{"payment": [{"key": "total", "pattern": "("}]}"#).unwrap();
    std::fs::write(&text, "TOTAL: 1").unwrap();

    invoscan()
        .args(["rules", "test", "--rules"])
        .arg(&rules)
        .arg(&text)
        .assert()
        .failure()
        .stderr(predicate::str::contains("rules file"));
}

#[test]
fn test_config_init_and_get() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");

    invoscan()
        .arg("-c")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();

    invoscan()
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "server.port"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3000"));

    invoscan()
        .arg("-c")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .failure();
}

#[test]
fn test_extract_rejects_unsupported_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.txt");
    std::fs::write(&input, "hello").unwrap();

    invoscan()
        .arg("extract")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported file type"));

    assert!(input.exists());
}

#[test]
fn test_extract_missing_file() {
    invoscan()
        .args(["extract", "/definitely/not/here.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}
