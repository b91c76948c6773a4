//! CLI tests for the cooploop binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary with logs redirected into a temp dir
fn cooploop(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cooploop").unwrap();
    cmd.env("XDG_DATA_HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env("HOME", home.path())
        .current_dir(home.path());
    cmd
}

#[test]
fn test_list_shows_builtins() {
    let home = TempDir::new().unwrap();
    cooploop(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("breakfast"))
        .stdout(predicate::str::contains("c"));
}

#[test]
fn test_demo_virtual_json() {
    let home = TempDir::new().unwrap();
    let output = cooploop(&home)
        .args(["demo", "c", "--virtual", "--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["elapsed-ms"], 4000.0);
    assert_eq!(value["within-tolerance"], true);
    assert_eq!(value["results"][0]["result"], "first");
}

#[test]
fn test_demo_unknown_fails() {
    let home = TempDir::new().unwrap();
    cooploop(&home)
        .args(["demo", "dinner", "--virtual"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("dinner"));
}

#[test]
fn test_run_file_with_short_unit() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("tea.yml");
    std::fs::write(
        &path,
        "name: tea\ntasks:\n  - name: kettle\n    result: hot\n    stages:\n      - kind: sleep\n        units: 1\n",
    )
    .unwrap();

    cooploop(&home)
        .args(["run", path.to_str().unwrap(), "--unit-ms", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hot"));
}

#[test]
fn test_run_failing_scenario_exits_nonzero() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("burnt.yml");
    std::fs::write(
        &path,
        "name: burnt\ntasks:\n  - name: toast\n    stages:\n      - kind: fail\n        message: smoke\n",
    )
    .unwrap();

    cooploop(&home)
        .args(["run", path.to_str().unwrap(), "--virtual"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("burnt"));
}

#[test]
fn test_compare_breakfast() {
    let home = TempDir::new().unwrap();
    cooploop(&home)
        .args(["compare", "breakfast", "--virtual"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2.00x"));
}

#[test]
fn test_config_file_selects_virtual_clock() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("cooploop.yml");
    std::fs::write(&config, "scheduler:\n  clock: virtual\n").unwrap();

    let output = cooploop(&home)
        .args(["demo", "b", "--format", "json", "--config", config.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["clock"], "virtual");
    assert_eq!(value["elapsed-ms"], 3000.0);
}

#[test]
fn test_run_missed_expectation_exits_nonzero() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("slow.yml");
    std::fs::write(
        &path,
        "name: slow\nexpect-elapsed: 1\ntasks:\n  - name: kettle\n    stages:\n      - kind: sleep\n        units: 3\n",
    )
    .unwrap();

    cooploop(&home)
        .args(["run", path.to_str().unwrap(), "--virtual"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside tolerance"));
}

#[test]
fn test_run_oversized_duration_exits_nonzero() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("eternal.yml");
    std::fs::write(
        &path,
        "name: eternal\ntasks:\n  - name: nap\n    stages:\n      - kind: sleep\n        units: 1e30\n",
    )
    .unwrap();

    cooploop(&home)
        .args(["run", path.to_str().unwrap(), "--virtual"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid duration"));
}
