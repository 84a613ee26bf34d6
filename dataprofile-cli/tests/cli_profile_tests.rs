use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("dataprofile-cli").unwrap();
    cmd.env("RUST_LOG", "warn");
    cmd
}

#[test]
fn test_profile_writes_report_next_to_output_dir() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let file = write_file(input.path(), "data.csv", "a,b\n1,x\n2,y\n");

    cli()
        .arg("profile")
        .arg("--file")
        .arg(&file)
        .arg("--output-dir")
        .arg(output.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Here's a preview of your data:"))
        .stdout(predicate::str::contains("Profile report generated successfully!"))
        .stdout(predicate::str::contains("Summarize dataset"));

    let report = fs::read_to_string(output.path().join("data_report.html")).unwrap();
    assert!(report.contains("<html"));
}

#[test]
fn test_profile_json_summary() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let file = write_file(
        input.path(),
        "sales.json",
        r#"[{"region": "north", "units": 3}, {"region": "south", "units": 5}]"#,
    );

    let assert = cli()
        .arg("profile")
        .arg("--file")
        .arg(&file)
        .arg("--output-dir")
        .arg(output.path())
        .arg("--title")
        .arg("Sales")
        .arg("--json")
        .assert()
        .success();

    let summary: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(summary["success"], true);
    assert_eq!(summary["report_file_name"], "sales_report.html");
    assert_eq!(summary["rows"], 2);
    assert_eq!(summary["columns"], 2);
    assert!(summary["log"].as_str().unwrap().contains("Summarize dataset"));

    let report = fs::read_to_string(output.path().join("sales_report.html")).unwrap();
    assert!(report.contains("Sales"));
}

#[test]
fn test_profile_rejects_unsupported_format() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let file = write_file(input.path(), "notes.txt", "hello");

    cli()
        .arg("profile")
        .arg("--file")
        .arg(&file)
        .arg("--output-dir")
        .arg(output.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"))
        .stdout(predicate::str::contains("Generating profiling report").not());

    assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
}

#[test]
fn test_profile_empty_table_fails_with_log() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let file = write_file(input.path(), "empty.csv", "a,b\n");

    cli()
        .arg("profile")
        .arg("--file")
        .arg(&file)
        .arg("--output-dir")
        .arg(output.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("An error occurred during profiling"));

    assert!(!output.path().join("empty_report.html").exists());
}

#[test]
fn test_preview_prints_requested_rows() {
    let input = TempDir::new().unwrap();
    let file = write_file(input.path(), "data.csv", "a,b\n1,x\n2,y\n3,z\n");

    cli()
        .arg("preview")
        .arg("--file")
        .arg(&file)
        .arg("--rows")
        .arg("2")
        .assert()
        .success()
        .stdout(predicate::str::contains("data.csv (3 rows x 2 columns)"))
        .stdout(predicate::str::contains("1  2  y"))
        .stdout(predicate::str::contains("z").not());
}
