use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::path::Path;

fn preq() -> Command {
    Command::cargo_bin("preq").unwrap()
}

/// `rows` instances `x,y,label` with label 1 when x >= 0.5
fn stream_csv(rows: usize) -> String {
    let mut content = String::from("x,y,label\n");
    for i in 0..rows {
        let x = (i % 10) as f64 / 10.0;
        let y = (i % 7) as f64;
        let label = if x >= 0.5 { 1 } else { 0 };
        content.push_str(&format!("{},{},{}\n", x, y, label));
    }
    content
}

fn write_csv(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8(output.stdout.clone()).unwrap();
    serde_json::from_str(&stdout).unwrap()
}

// =============================================================================
// GENERAL
// =============================================================================

#[test]
fn test_no_args_shows_help() {
    preq()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_version_flag() {
    preq()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("preq"));
}

#[test]
fn test_help_flag() {
    preq()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Prequential evaluation"));
}

// =============================================================================
// CLASSIFIERS SUBCOMMAND
// =============================================================================

#[test]
fn test_classifiers_table() {
    preq()
        .arg("classifiers")
        .assert()
        .success()
        .stdout(predicate::str::contains("naive-bayes"))
        .stdout(predicate::str::contains("majority"));
}

#[test]
fn test_classifiers_json() {
    let output = preq().args(["classifiers", "--json"]).assert().success();
    let parsed = stdout_json(output.get_output());
    let names: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.get("name").unwrap().as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["naive-bayes", "majority"]);
}

// =============================================================================
// VALIDATE SUBCOMMAND
// =============================================================================

#[test]
fn test_validate_nonexistent_file() {
    preq()
        .args(["validate", "--file", "/nonexistent/stream.csv"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_validate_unsupported_extension() {
    let tmp = tempfile::Builder::new()
        .suffix(".arff")
        .tempfile()
        .unwrap();

    preq()
        .args(["validate", "--file", tmp.path().to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unsupported file extension"));
}

#[test]
fn test_validate_valid_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "stream.csv", &stream_csv(300));

    preq()
        .args(["validate", "--file", &path])
        .assert()
        .success()
        .stdout(predicate::str::contains("300 instances"))
        .stdout(predicate::str::contains("2 features"));
}

#[test]
fn test_validate_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "stream.csv", &stream_csv(40));

    let output = preq()
        .args(["validate", "--file", &path, "--json"])
        .assert()
        .success();
    let parsed = stdout_json(output.get_output());
    assert_eq!(parsed["valid"], true);
    assert_eq!(parsed["instances"], 40);
    assert_eq!(parsed["n_features"], 2);
    assert_eq!(parsed["classes"], serde_json::json!([0, 1]));
    assert_eq!(parsed["feature_names"], serde_json::json!(["x", "y"]));
}

#[test]
fn test_validate_ragged_csv() {
    let mut tmp = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .unwrap();
    write!(tmp, "1.0,2.0,0\n1.0,1\n").unwrap();

    preq()
        .args(["validate", "--file", tmp.path().to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("columns"));
}

// =============================================================================
// RUN SUBCOMMAND
// =============================================================================

#[test]
fn test_run_requires_source() {
    preq()
        .args(["run", "--quiet"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--file or --generator"));
}

#[test]
fn test_run_sea_generator_budget() {
    let output = preq()
        .args([
            "run",
            "--generator",
            "sea",
            "--seed",
            "3",
            "--max-instances",
            "1000",
            "--n-wait",
            "100",
            "--compact",
            "--quiet",
        ])
        .assert()
        .success();
    let report = stdout_json(output.get_output());
    assert_eq!(report["instances_processed"], 1000);
    assert_eq!(report["pretrain_instances"], 200);
    assert_eq!(report["snapshot_count"], 10);
    assert_eq!(report["termination"], "instance_budget");
    assert_eq!(report["stream"], "sea_f0");
    assert_eq!(report["classifier"], "naive_bayes");
    let accuracy = report["accuracy"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&accuracy));
}

#[test]
fn test_run_file_until_exhausted() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "stream.csv", &stream_csv(300));

    let output = preq()
        .args([
            "run",
            "--file",
            &path,
            "--classifier",
            "majority",
            "--pretrain-size",
            "0",
            "--n-wait",
            "50",
            "--batch-size",
            "10",
            "--quiet",
        ])
        .assert()
        .success();
    let report = stdout_json(output.get_output());
    assert_eq!(report["instances_processed"], 300);
    assert_eq!(report["pretrain_instances"], 0);
    assert_eq!(report["snapshot_count"], 6);
    assert_eq!(report["termination"], "stream_exhausted");
    assert_eq!(report["classifier"], "majority_class");
    assert_eq!(report["snapshots"].as_array().unwrap().len(), 6);
}

#[test]
fn test_run_invalid_classifier() {
    preq()
        .args(["run", "--generator", "sea", "--classifier", "hoeffding-tree"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown classifier"));
}

#[test]
fn test_run_unknown_setting() {
    preq()
        .args(["run", "--generator", "sea", "--set", "max_window=10"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown parameter"));
}

#[test]
fn test_run_invalid_batch_size() {
    preq()
        .args(["run", "--generator", "sea", "--batch-size", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("batch_size"));
}

#[test]
fn test_run_writes_snapshot_lines() {
    let dir = tempfile::tempdir().unwrap();
    let snapshots = dir.path().join("snapshots.jsonl");

    preq()
        .args([
            "run",
            "--generator",
            "sea",
            "--max-instances",
            "500",
            "--n-wait",
            "100",
            "--show-kappa",
            "--quiet",
            "--snapshots",
            snapshots.to_str().unwrap(),
        ])
        .assert()
        .success();

    let content = std::fs::read_to_string(&snapshots).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0]["sample_count"], 100);
    assert_eq!(lines[4]["sample_count"], 500);
    assert_eq!(lines[0]["values"].as_array().unwrap().len(), 2);
}

#[test]
fn test_run_output_file_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("report.json");
    let config_path = dir.path().join("config.json");
    std::fs::write(
        &config_path,
        format!(
            r#"{{"max_instances": 300, "n_wait": 100, "output_file": {}}}"#,
            serde_json::to_string(report_path.to_str().unwrap()).unwrap()
        ),
    )
    .unwrap();

    preq()
        .args([
            "run",
            "--generator",
            "sea",
            "--config",
            config_path.to_str().unwrap(),
            "--quiet",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["instances_processed"], 300);
    assert_eq!(report["snapshot_count"], 3);
}

#[test]
fn test_run_config_rejects_unknown_keys() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, r#"{"n_wait": 100, "plot_style": "dark"}"#).unwrap();

    preq()
        .args([
            "run",
            "--generator",
            "sea",
            "--config",
            config_path.to_str().unwrap(),
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid config file"));
}

// =============================================================================
// BATCH SUBCOMMAND
// =============================================================================

#[test]
fn test_batch_glob() {
    let dir = tempfile::tempdir().unwrap();
    write_csv(dir.path(), "a.csv", &stream_csv(120));
    write_csv(dir.path(), "b.csv", &stream_csv(80));
    let pattern = format!("{}/*.csv", dir.path().display());

    let output = preq()
        .args([
            "batch",
            "--glob",
            &pattern,
            "--pretrain-size",
            "0",
            "--n-wait",
            "40",
            "--quiet",
        ])
        .assert()
        .success();
    let reports = stdout_json(output.get_output());
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["stream"], "a");
    assert_eq!(reports[0]["instances_processed"], 120);
    assert_eq!(reports[1]["stream"], "b");
    assert_eq!(reports[1]["snapshot_count"], 2);
    assert_ne!(reports[0]["run_id"], reports[1]["run_id"]);
}

#[test]
fn test_batch_partial_failure() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_csv(dir.path(), "good.csv", &stream_csv(60));
    let bad = write_csv(dir.path(), "bad.csv", "a,b,label\n1.0,x,0\n");

    let output = preq()
        .args([
            "batch",
            "--files",
            &bad,
            &good,
            "--continue-on-error",
            "--pretrain-size",
            "0",
        ])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("1/2 succeeded"));
    let reports = stdout_json(output.get_output());
    assert_eq!(reports.as_array().unwrap().len(), 1);
}

#[test]
fn test_batch_stops_at_first_failure() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_csv(dir.path(), "good.csv", &stream_csv(60));

    preq()
        .args(["batch", "--files", "/nonexistent/a.csv", &good, "--quiet"])
        .assert()
        .code(2);
}

#[test]
fn test_batch_no_matches() {
    let dir = tempfile::tempdir().unwrap();
    let pattern = format!("{}/*.csv", dir.path().display());

    preq()
        .args(["batch", "--glob", &pattern])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No matching files"));
}
