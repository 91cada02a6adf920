use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/scenarios")
        .join(name)
}

fn replay_cmd(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("metacard-replay").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("METACARD_THROTTLE_MS")
        .env_remove("METACARD_LAYOUT_CONFIG")
        .env_remove("METACARD_LOG");
    cmd
}

#[test]
fn prints_timeline_as_json_lines() {
    let home = TempDir::new().unwrap();
    let output = replay_cmd(&home)
        .arg(fixture("search_then_sync.json"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let lines: Vec<serde_json::Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[3]["cause"], "throttle");
    assert_eq!(lines[3]["at_ms"], 70);
    assert_eq!(lines[3]["flags"]["is_searching"], false);
}

#[test]
fn summary_flag_prints_summary() {
    let home = TempDir::new().unwrap();
    replay_cmd(&home)
        .arg(fixture("search_then_sync.json"))
        .arg("--summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"throttled_runs\": 1"))
        .stdout(predicate::str::contains("\"layout_mounts\": 1"));
}

#[test]
fn throttle_override_applies() {
    let home = TempDir::new().unwrap();
    replay_cmd(&home)
        .arg(fixture("search_then_sync.json"))
        .args(["--summary", "--throttle-ms", "500"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"throttled_runs\": 0"));
}

#[test]
fn env_override_applies_on_top_of_config_file() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("panel.toml");
    std::fs::write(&config, "throttle_ms = 60\n").unwrap();

    replay_cmd(&home)
        .arg(fixture("search_then_sync.json"))
        .arg("--config")
        .arg(&config)
        .arg("--summary")
        .env("METACARD_THROTTLE_MS", "500")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"throttled_runs\": 0"));
}

#[test]
fn throttle_flag_beats_env_override() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("panel.toml");
    std::fs::write(&config, "throttle_ms = 60\n").unwrap();

    replay_cmd(&home)
        .arg(fixture("search_then_sync.json"))
        .arg("--config")
        .arg(&config)
        .args(["--summary", "--throttle-ms", "60"])
        .env("METACARD_THROTTLE_MS", "500")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"throttled_runs\": 1"));
}

#[test]
fn zero_throttle_is_rejected() {
    let home = TempDir::new().unwrap();
    replay_cmd(&home)
        .arg(fixture("search_then_sync.json"))
        .args(["--throttle-ms", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("greater than zero"));
}

#[test]
fn missing_scenario_fails_with_context() {
    let home = TempDir::new().unwrap();
    replay_cmd(&home)
        .arg(home.path().join("nope.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading scenario"));
}
