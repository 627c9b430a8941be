//! CLI tests for commands that work without a provider

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn firststrike(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("firststrike").unwrap();
    // Keep logs and config lookups inside the sandbox
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("XDG_CONFIG_HOME", home.path().join("config"));
    cmd
}

#[test]
fn test_incidents_lists_demo_board() {
    let home = TempDir::new().unwrap();
    firststrike(&home)
        .arg("incidents")
        .assert()
        .success()
        .stdout(predicate::str::contains("INC-001"))
        .stdout(predicate::str::contains("Angeles National Forest - Sector B"))
        .stdout(predicate::str::contains("INC-002"));
}

#[test]
fn test_resources_lists_demo_units() {
    let home = TempDir::new().unwrap();
    firststrike(&home)
        .arg("resources")
        .assert()
        .success()
        .stdout(predicate::str::contains("UNIT-D1"))
        .stdout(predicate::str::contains("Guardian-1"))
        .stdout(predicate::str::contains("Thermal Imaging"));
}

#[test]
fn test_scenario_file() {
    let home = TempDir::new().unwrap();
    let scenario = home.path().join("board.yml");
    std::fs::write(
        &scenario,
        r#"
incidents:
  - id: INC-900
    type: Flood
    location: { lat: 29.76, lng: -95.37, address: "Buffalo Bayou" }
    severity: High
resources: []
"#,
    )
    .unwrap();

    firststrike(&home)
        .args(["--scenario", "board.yml", "incidents"])
        .assert()
        .success()
        .stdout(predicate::str::contains("INC-900"))
        .stdout(predicate::str::contains("Buffalo Bayou"))
        .stdout(predicate::str::contains("INC-001").not());
}

#[test]
fn test_plan_without_key_fails_fast() {
    let home = TempDir::new().unwrap();
    firststrike(&home)
        .arg("plan")
        .env_remove("GEMINI_API_KEY")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}

#[test]
fn test_unknown_command() {
    let home = TempDir::new().unwrap();
    firststrike(&home).arg("dispatch").assert().failure();
}
