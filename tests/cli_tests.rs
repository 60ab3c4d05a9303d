// End-to-end tests for the driftwatch binary: replay from file and stdin,
// output formats, configuration files, simulation, and input errors.

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn zeros_then_ones(n: usize) -> String {
    let mut input = String::new();
    for _ in 0..n {
        input.push_str("0\n");
    }
    for _ in 0..n {
        input.push_str("1\n");
    }
    input
}

fn write_input(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

// ============================================================================
// Replay
// ============================================================================

#[test]
fn test_replay_file_reports_change() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "errors.txt", &zeros_then_ones(200));

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("driftwatch");
    cmd.arg("replay")
        .arg("--detector")
        .arg("ddm")
        .arg("--input")
        .arg(&input);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("change at instance"))
        .stdout(predicate::str::contains("DDM: 400 instances"));
}

#[test]
fn test_replay_stdin() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("driftwatch");
    cmd.arg("replay").arg("-d").arg("hddm_a");
    cmd.write_stdin(zeros_then_ones(200));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("HDDM_A: 400 instances"))
        .stdout(predicate::str::contains("change at instance"));
}

#[test]
fn test_replay_skips_comments_and_blank_lines() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("driftwatch");
    cmd.arg("replay").arg("-d").arg("cusum");
    cmd.write_stdin("# prediction errors\n0\n\n1\n  0  \n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("CUSUM: 3 instances, 0 change(s)"));
}

#[test]
fn test_replay_json_output() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("driftwatch");
    cmd.arg("replay").arg("-d").arg("ddm").arg("--format").arg("json");
    cmd.write_stdin(zeros_then_ones(200));

    let output = cmd.assert().success().get_output().stdout.clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["format"], "driftwatch-json-v1");
    assert_eq!(json["detector"], "DDM");
    assert_eq!(json["summary"]["instances"], 400);
    assert!(json["summary"]["changes"].as_u64().unwrap() >= 1);
    assert_eq!(json["events"][0]["kind"], "change");
    assert!(json.get("evaluation").is_none());
}

#[test]
fn test_replay_csv_output() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("driftwatch");
    cmd.arg("replay").arg("-d").arg("ddm").arg("--format").arg("csv");
    cmd.write_stdin(zeros_then_ones(200));

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with(
            "detector,instance,event,estimation\n",
        ))
        .stdout(predicate::str::contains("DDM,").and(predicate::str::contains(",change,")));
}

#[test]
fn test_replay_with_config_file() {
    let dir = TempDir::new().unwrap();
    let config = write_input(
        &dir,
        "ensemble.toml",
        "type = \"ensemble\"\npolicy = \"min\"\n\n[[children]]\ntype = \"ddm\"\n\n[[children]]\ntype = \"adwin\"\n",
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("driftwatch");
    cmd.arg("replay").arg("--config").arg(&config);
    cmd.write_stdin(zeros_then_ones(200));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Ensemble: 400 instances"));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_non_numeric_input_fails_with_line_number() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("driftwatch");
    cmd.arg("replay");
    cmd.write_stdin("0\n1\nabc\n");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("line 3"));
}

#[test]
fn test_non_finite_input_fails() {
    for (text, detector) in [("NaN", "adwin"), ("inf", "ddm"), ("-inf", "hddm_a")] {
        let mut input = "0\n".repeat(300);
        input.push_str(text);
        input.push('\n');
        input.push_str(&"1\n".repeat(300));

        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("driftwatch");
        cmd.arg("replay").arg("-d").arg(detector);
        cmd.write_stdin(input);

        cmd.assert()
            .failure()
            .stderr(predicate::str::contains(format!(
                "line 301: '{}' is not a finite number",
                text
            )))
            .stdout(predicate::str::contains("instances").not());
    }
}

#[test]
fn test_unknown_detector_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("driftwatch");
    cmd.arg("replay").arg("-d").arg("page_hinkley");
    cmd.write_stdin("0\n");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown detector"));
}

#[test]
fn test_invalid_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_input(&dir, "bad.toml", "type = \"adwin\"\ndelta = 3.0\n");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("driftwatch");
    cmd.arg("replay").arg("-c").arg(&config);
    cmd.write_stdin("0\n");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("delta"));
}

#[test]
fn test_missing_input_file_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("driftwatch");
    cmd.arg("replay").arg("-i").arg("/nonexistent/errors.txt");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open input"));
}

// ============================================================================
// Simulate
// ============================================================================

#[test]
fn test_simulate_reports_evaluation() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("driftwatch");
    cmd.arg("simulate").arg("-d").arg("adwin");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("ADWIN: 10000 instances"))
        .stdout(predicate::str::contains("1 drift point(s)"))
        .stdout(predicate::str::contains("true positives:  1"));
}

#[test]
fn test_simulate_json_includes_evaluation() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("driftwatch");
    cmd.args([
        "simulate",
        "-d",
        "seqdrift1",
        "--p0",
        "0.1",
        "--p1",
        "0.5",
        "--length",
        "8000",
        "--format",
        "json",
    ]);

    let output = cmd.assert().success().get_output().stdout.clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["detector"], "SeqDrift1");
    assert_eq!(json["summary"]["instances"], 8000);
    assert_eq!(json["evaluation"]["drifts"], 1);
    assert_eq!(json["evaluation"]["true_positives"], 1);
}

#[test]
fn test_simulate_without_drift_has_no_drift_points() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("driftwatch");
    cmd.args(["simulate", "--p0", "0.2", "--p1", "0.2", "--length", "2000"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0 drift point(s)"));
}

#[test]
fn test_simulate_rejects_bad_probability() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("driftwatch");
    cmd.args(["simulate", "--p0", "1.5"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Probabilities must be in [0, 1]"));
}
