use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cli() -> Command {
    Command::cargo_bin("ballistics-cli").expect("binary builds")
}

fn stdout_json(args: &[&str]) -> serde_json::Value {
    let output = cli().args(args).output().expect("Failed to execute command");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("table"))
        .stdout(predicate::str::contains("zero"))
        .stdout(predicate::str::contains("pbr"))
        .stdout(predicate::str::contains("compare"))
        .stdout(predicate::str::contains("info"));
}

#[test]
fn test_cli_invalid_command() {
    cli().arg("invalid-command").assert().failure();
}

#[test]
fn test_cli_info_lists_drag_models() {
    cli()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ingalls"))
        .stdout(predicate::str::contains("no table"));
}

#[test]
fn test_cli_table_basic() {
    cli()
        .args(["table", "--velocity", "2800", "--bc", "0.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Drop(in)"))
        .stdout(predicate::str::contains("2800.0"));
}

#[test]
fn test_cli_table_csv() {
    let output = cli()
        .args(["table", "--max-range", "300", "-o", "csv"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[0].starts_with("range_yd,drop_in,correction_moa"), "header: {}", lines[0]);
    // 0, 100, 200, 300 yards
    assert_eq!(lines.len(), 5, "{stdout}");
    assert!(lines[4].starts_with("300,"));
}

#[test]
fn test_cli_table_json_with_zero_range() {
    let json = stdout_json(&["table", "--zero-range", "200", "--step", "50", "--max-range", "400", "-o", "json"]);

    assert_eq!(json["zero_range_yards"], 200.0);
    let rows = json["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 9);

    let at_200 = rows.iter().find(|r| r["range_yd"] == 200).unwrap();
    assert!(at_200["drop_in"].as_f64().unwrap().abs() < 0.5);
}

#[test]
fn test_cli_zero_reference() {
    let json = stdout_json(&[
        "zero", "--bc", "0.465", "--velocity", "2650", "--sight-height", "1.6", "--range", "200", "-o", "json",
    ]);

    let angle = json["angle_deg"].as_f64().unwrap();
    assert!((angle - 0.0998687744140625).abs() < 1e-6, "angle: {angle}");
    assert_eq!(json["convergence"], "Converged");
}

#[test]
fn test_cli_pbr_table() {
    cli()
        .args(["pbr", "--vital-zone", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("POINT BLANK RANGE"))
        .stdout(predicate::str::contains("Max PBR"));
}

#[test]
fn test_cli_pbr_divergent_fails() {
    cli()
        .args(["pbr", "--velocity", "50"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DivergentTrajectory"));
}

#[test]
fn test_cli_rejects_drag_model_without_table() {
    cli()
        .args(["table", "-d", "g3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidDragLookup"));
}

#[test]
fn test_cli_rejects_unknown_drag_model() {
    cli()
        .args(["zero", "--drag-model", "G9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown drag model"));
}

#[test]
fn test_cli_config_file_with_flag_override() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    write!(config, r#"{{"projectile": {{"drag_model": "G7", "ballistic_coefficient": 0.25, "muzzle_velocity": 2700}}}}"#).unwrap();
    let path = config.path().to_str().unwrap();

    let json = stdout_json(&["table", "--config", path, "--max-range", "100", "-o", "json"]);
    assert_eq!(json["projectile"]["drag_model"], "G7");
    assert_eq!(json["projectile"]["ballistic_coefficient"], 0.25);
    assert_eq!(json["projectile"]["muzzle_velocity"], 2700.0);
    assert_eq!(json["projectile"]["sight_height"], 1.5);

    let json = stdout_json(&["table", "--config", path, "--bc", "0.3", "--max-range", "100", "-o", "json"]);
    assert_eq!(json["projectile"]["drag_model"], "G7");
    assert_eq!(json["projectile"]["ballistic_coefficient"], 0.3);
}

#[test]
fn test_cli_missing_config_file() {
    cli()
        .args(["zero", "--config", "/nonexistent/ballistics.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read config"));
}

#[test]
fn test_cli_compare_csv() {
    let output = cli()
        .args(["compare", "--zero-range", "100", "-o", "csv"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 9, "{stdout}");
    assert!(lines[0].starts_with("drag_model,zero_angle_deg"));
    assert!(!stdout.contains("G3"));
}

#[test]
fn test_cli_verbose_logs_to_stderr() {
    let output = cli()
        .args(["-vv", "zero", "--range", "100", "-o", "json"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("angle search trial"), "stderr: {stderr}");
    serde_json::from_slice::<serde_json::Value>(&output.stdout).expect("stdout stays JSON");
}

#[test]
fn test_cli_config_limits_reach_zeroed_table_and_compare() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    write!(config, r#"{{"limits": {{"max_trials": 3}}}}"#).unwrap();
    let path = config.path().to_str().unwrap();

    cli()
        .args(["table", "--config", path, "--zero-range", "200"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NotConverged"));

    let mut config = tempfile::NamedTempFile::new().unwrap();
    write!(config, r#"{{"limits": {{"max_steps_per_trial": 10}}}}"#).unwrap();
    let path = config.path().to_str().unwrap();

    let json = stdout_json(&["compare", "--config", path, "-o", "json"]);
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 8);
    for row in rows {
        assert!(row["error"].as_str().unwrap().contains("numerical degeneracy"), "{row}");
    }
}
