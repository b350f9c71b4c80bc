//! Integration tests for the lift binary.
//!
//! These tests verify end-to-end behavior including:
//! - Roster management (users, exercises)
//! - Logging sessions non-interactively and through prompts
//! - Persistence of progression state between runs
//! - Handling of bad input and corrupted rosters

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI binary, isolated from the user's real config
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("lift").expect("Failed to find lift binary");
    cmd.env("XDG_CONFIG_HOME", dir.join("config"))
        .env_remove("RUST_LOG");
    cmd
}

fn roster_path(dir: &Path) -> PathBuf {
    dir.join("gym_roster.json")
}

fn read_roster(dir: &Path) -> Value {
    let contents = fs::read_to_string(roster_path(dir)).expect("Failed to read roster");
    serde_json::from_str(&contents).expect("Roster is not valid JSON")
}

fn write_record(dir: &Path, state: &str, weight: f64, previous_total_reps: u32) {
    let roster = serde_json::json!({
        "alice": {
            "squat": {
                "current_weight": weight,
                "weight_increment": 2.5,
                "base_sets": 3,
                "base_reps": 8,
                "current_state": state,
                "stuck_counter": 0,
                "previous_total_reps": previous_total_reps
            }
        }
    });
    fs::write(roster_path(dir), serde_json::to_string_pretty(&roster).unwrap())
        .expect("Failed to write roster");
}

fn log_reps(dir: &Path, reps: &str) -> assert_cmd::assert::Assert {
    cli(dir)
        .arg("log")
        .arg("--roster")
        .arg(roster_path(dir))
        .args(["--user", "alice", "--exercise", "squat", "--reps", reps])
        .assert()
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Triple-progression strength training tracker",
        ));
}

#[test]
fn test_add_user_and_exercise() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    cli(dir)
        .args(["add-user", "alice", "--roster"])
        .arg(roster_path(dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("Added user alice"));

    cli(dir)
        .args(["add-exercise", "--user", "alice", "squat", "--weight", "60"])
        .arg("--roster")
        .arg(roster_path(dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("State A: complete 3 sets of at least 8 reps"));

    let roster = read_roster(dir);
    let squat = &roster["alice"]["squat"];
    assert_eq!(squat["current_weight"], 60.0);
    assert_eq!(squat["weight_increment"], 2.5);
    assert_eq!(squat["current_state"], "A");
    assert_eq!(squat["stuck_counter"], 0);
    assert_eq!(squat["previous_total_reps"], 0);
}

#[test]
fn test_duplicate_user_rejected() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    for expect_success in [true, false] {
        let assert = cli(dir)
            .args(["add-user", "alice", "--roster"])
            .arg(roster_path(dir))
            .assert();
        if expect_success {
            assert.success();
        } else {
            assert.failure().stderr(predicate::str::contains("AlreadyExists"));
        }
    }
}

#[test]
fn test_add_exercise_unknown_user_fails() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    cli(dir)
        .args(["add-exercise", "--user", "nobody", "squat", "--roster"])
        .arg(roster_path(dir))
        .assert()
        .failure();

    assert!(!roster_path(dir).exists());
}

#[test]
fn test_log_success_adds_weight() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    write_record(dir, "A", 60.0, 0);

    log_reps(dir, "8 8 8")
        .success()
        .stdout(predicate::str::contains("State A cleared"))
        .stdout(predicate::str::contains("New working weight: 62.5kg"))
        .stdout(predicate::str::contains("Current weight: 62.5kg"));

    let roster = read_roster(dir);
    assert_eq!(roster["alice"]["squat"]["current_weight"], 62.5);
    assert_eq!(roster["alice"]["squat"]["current_state"], "A");
}

#[test]
fn test_progression_persists_across_runs() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    write_record(dir, "A", 60.0, 0);

    log_reps(dir, "8 8 7")
        .success()
        .stdout(predicate::str::contains("Entering state B"));
    log_reps(dir, "8 8 7")
        .success()
        .stdout(predicate::str::contains("Staying in state B"));
    log_reps(dir, "8 7 8")
        .success()
        .stdout(predicate::str::contains("Moving to state C"));

    let roster = read_roster(dir);
    assert_eq!(roster["alice"]["squat"]["current_state"], "C");
    assert_eq!(roster["alice"]["squat"]["stuck_counter"], 0);
    assert_eq!(roster["alice"]["squat"]["current_weight"], 60.0);
}

#[test]
fn test_deload_then_recovery() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    write_record(dir, "C", 60.0, 23);

    log_reps(dir, "8 8 8 7")
        .success()
        .stdout(predicate::str::contains("Deload triggered"))
        .stdout(predicate::str::contains("55kg"));

    let roster = read_roster(dir);
    assert_eq!(roster["alice"]["squat"]["current_state"], "D");
    assert_eq!(roster["alice"]["squat"]["current_weight"], 55.0);

    log_reps(dir, "5 5")
        .success()
        .stdout(predicate::str::contains("Deload complete"));

    let roster = read_roster(dir);
    assert_eq!(roster["alice"]["squat"]["current_state"], "A");
    assert_eq!(roster["alice"]["squat"]["current_weight"], 55.0);
}

#[test]
fn test_wrong_set_count_leaves_roster_untouched() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    write_record(dir, "A", 60.0, 0);
    let before = fs::read_to_string(roster_path(dir)).unwrap();

    log_reps(dir, "8 8")
        .failure()
        .stderr(predicate::str::contains("InvalidInput"));

    assert_eq!(fs::read_to_string(roster_path(dir)).unwrap(), before);
}

#[test]
fn test_oversized_rep_count_rejected() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    write_record(dir, "A", 60.0, 0);
    let before = fs::read_to_string(roster_path(dir)).unwrap();

    log_reps(dir, "4294967295 1 1")
        .failure()
        .stderr(predicate::str::contains("InvalidInput"));

    assert_eq!(fs::read_to_string(roster_path(dir)).unwrap(), before);
}

#[test]
fn test_oversized_baseline_rejected() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    cli(dir)
        .args(["add-user", "alice", "--roster"])
        .arg(roster_path(dir))
        .assert()
        .success();

    cli(dir)
        .args(["add-exercise", "--user", "alice", "squat"])
        .args(["--sets", "70000", "--reps", "70000", "--roster"])
        .arg(roster_path(dir))
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidRecord"));

    let roster = read_roster(dir);
    assert!(roster["alice"].as_object().unwrap().is_empty());
}

#[test]
fn test_fractional_increment_prints_clean_weight() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    cli(dir)
        .args(["add-user", "alice", "--roster"])
        .arg(roster_path(dir))
        .assert()
        .success();
    cli(dir)
        .args(["add-exercise", "--user", "alice", "squat"])
        .args(["--weight", "60", "--increment", "0.1", "--roster"])
        .arg(roster_path(dir))
        .assert()
        .success();

    log_reps(dir, "8 8 8").success();
    log_reps(dir, "8 8 8").success();
    log_reps(dir, "8 8 8")
        .success()
        .stdout(predicate::str::contains("New working weight: 60.3kg"))
        .stdout(predicate::str::contains("Current weight: 60.3kg"));

    let roster = read_roster(dir);
    assert_eq!(roster["alice"]["squat"]["current_weight"], 60.3);
}

#[test]
fn test_plan_command() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    write_record(dir, "B", 60.0, 23);

    cli(dir)
        .args(["plan", "--user", "alice", "--exercise", "squat", "--roster"])
        .arg(roster_path(dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("at least 27 total reps"))
        .stdout(predicate::str::contains("60kg"));
}

#[test]
fn test_unknown_state_reported() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    write_record(dir, "X", 60.0, 0);
    let before = fs::read_to_string(roster_path(dir)).unwrap();

    cli(dir)
        .args(["plan", "--user", "alice", "--exercise", "squat", "--roster"])
        .arg(roster_path(dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("Unrecognized state"));

    log_reps(dir, "8 8 8")
        .failure()
        .stderr(predicate::str::contains("UnknownState"));

    assert_eq!(fs::read_to_string(roster_path(dir)).unwrap(), before);
}

#[test]
fn test_corrupted_roster_is_not_overwritten() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    fs::write(roster_path(dir), "{ invalid json }}}}").unwrap();

    log_reps(dir, "8 8 8").failure();
    cli(dir)
        .args(["add-user", "bob", "--roster"])
        .arg(roster_path(dir))
        .assert()
        .failure();

    assert_eq!(
        fs::read_to_string(roster_path(dir)).unwrap(),
        "{ invalid json }}}}"
    );
}

#[test]
fn test_list_users_and_exercises() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    write_record(dir, "B", 60.0, 23);

    cli(dir)
        .args(["list", "--roster"])
        .arg(roster_path(dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("alice (1 exercises)"));

    cli(dir)
        .args(["list", "--user", "alice", "--roster"])
        .arg(roster_path(dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("squat: state B, 60kg, 3 x 8"));
}

#[test]
fn test_interactive_first_session() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    // new user, new exercise with defaults, onboarding at 60kg,
    // one wrong set count, then a real session
    let stdin = "0\nalice\n0\nsquat\n\n\n\n60\n\nn\n8 8\n8 8 7\n";

    cli(dir)
        .arg("--roster")
        .arg(roster_path(dir))
        .write_stdin(stdin)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created user alice"))
        .stdout(predicate::str::contains("Starting weight set to 60kg"))
        .stdout(predicate::str::contains("Please try again"))
        .stdout(predicate::str::contains("Entering state B"))
        .stdout(predicate::str::contains("at least 27 total reps"));

    let roster = read_roster(dir);
    let squat = &roster["alice"]["squat"];
    assert_eq!(squat["current_state"], "B");
    assert_eq!(squat["current_weight"], 60.0);
    assert_eq!(squat["previous_total_reps"], 23);
}

#[test]
fn test_interactive_baseline_override() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    cli(dir)
        .args(["add-user", "alice", "--roster"])
        .arg(roster_path(dir))
        .assert()
        .success();
    cli(dir)
        .args(["add-exercise", "--user", "alice", "squat", "--roster"])
        .arg(roster_path(dir))
        .assert()
        .success();

    // pick user 1, exercise 1, weight 100, step 5, override to 5x5, log 5 sets
    let stdin = "1\n1\n100\n5\ny\n5\n5\n5 5 5 5 5\n";

    cli(dir)
        .arg("log")
        .arg("--roster")
        .arg(roster_path(dir))
        .write_stdin(stdin)
        .assert()
        .success()
        .stdout(predicate::str::contains("Baseline set to 5 sets x 5 reps"))
        .stdout(predicate::str::contains("Current weight: 105kg"));

    let roster = read_roster(dir);
    let squat = &roster["alice"]["squat"];
    assert_eq!(squat["base_sets"], 5);
    assert_eq!(squat["base_reps"], 5);
    assert_eq!(squat["weight_increment"], 5.0);
    assert_eq!(squat["current_weight"], 105.0);
}

#[test]
fn test_interactive_closed_input_fails_cleanly() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    write_record(dir, "A", 60.0, 0);
    let before = fs::read_to_string(roster_path(dir)).unwrap();

    cli(dir)
        .args(["log", "--user", "alice", "--exercise", "squat", "--roster"])
        .arg(roster_path(dir))
        .write_stdin("8 8\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("input closed"));

    assert_eq!(fs::read_to_string(roster_path(dir)).unwrap(), before);
}
