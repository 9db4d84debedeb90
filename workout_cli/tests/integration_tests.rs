//! Integration tests for the workout binary.
//!
//! These tests verify end-to-end behavior including:
//! - The session lifecycle from plan file to workout history
//! - Rejection of unknown sessions and invalid transitions
//! - History summary, export and cleanup

mod common;

use common::{cli, run, setup_test_dir, start_session, write_plan};
use predicates::prelude::*;
use std::fs;

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout session logger"));
}

#[test]
fn test_start_creates_store() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let plan = write_plan(temp_dir.path());

    cli()
        .arg("start")
        .arg(&plan)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created session"))
        .stdout(predicate::str::contains("Full Body A: 2 exercises, 4 sets"));

    let store = data_dir.join("store/active_sessions.json");
    assert!(store.exists());
    let contents = fs::read_to_string(&store).unwrap();
    assert!(contents.contains("not-started"));
}

#[test]
fn test_full_workout_reaches_history() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let plan = write_plan(temp_dir.path());
    let id = start_session(&data_dir, &plan).to_string();

    run(&data_dir, &["begin", &id])
        .success()
        .stdout(predicate::str::contains("Next: goblet_squat (1/2)"));

    run(
        &data_dir,
        &["log-set", &id, "goblet_squat", "--reps", "10", "--weight", "50", "--rpe", "7"],
    )
    .success()
    .stdout(predicate::str::contains("Set 1 logged"))
    .stdout(predicate::str::contains("Rest 90s"));

    run(
        &data_dir,
        &["log-set", &id, "goblet_squat", "--reps", "9", "--weight", "50", "--effort", "hard"],
    )
    .success()
    .stdout(predicate::str::contains("Set 2 logged"));

    run(&data_dir, &["next", &id, "--notes", "grip gave out"])
        .success()
        .stdout(predicate::str::contains("Next: rower (2/2)"));

    run(
        &data_dir,
        &["log-segment", &id, "rower", "--duration", "90", "--distance", "400", "--distance-unit", "m", "--avg-hr", "150"],
    )
    .success()
    .stdout(predicate::str::contains("Segment 1 logged for rower (90s total)"));

    run(&data_dir, &["progress", &id])
        .success()
        .stdout(predicate::str::contains("Exercises: 1/2"))
        .stdout(predicate::str::contains("Sets: 3/4"));

    run(&data_dir, &["next", &id])
        .success()
        .stdout(predicate::str::contains("All exercises done"));

    run(&data_dir, &["complete", &id, "--rating", "4"])
        .success()
        .stdout(predicate::str::contains("Workout saved to history"))
        .stdout(predicate::str::contains("Volume: 950.0 lb"));

    let history = fs::read_to_string(data_dir.join("store/workout_logs.json")).unwrap();
    assert!(history.contains(&id));
    assert!(history.contains("grip gave out"));

    run(&data_dir, &["summary"])
        .success()
        .stdout(predicate::str::contains("Workouts: 1"))
        .stdout(predicate::str::contains("Average rating: 4.0"))
        .stdout(predicate::str::contains("Distance: 0.40 km"));
}

#[test]
fn test_unknown_session_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let missing = uuid::Uuid::new_v4().to_string();

    run(&data_dir, &["pause", &missing])
        .failure()
        .stderr(predicate::str::contains("NotFound"));

    // Nothing was written for the failed command
    assert!(!data_dir.join("store/active_sessions.json").exists());
}

#[test]
fn test_invalid_transition_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let plan = write_plan(temp_dir.path());
    let id = start_session(&data_dir, &plan).to_string();

    run(&data_dir, &["resume", &id])
        .failure()
        .stderr(predicate::str::contains("InvalidTransition"));

    run(&data_dir, &["begin", &id]).success();
    run(&data_dir, &["pause", &id]).success();
    run(&data_dir, &["pause", &id])
        .failure()
        .stderr(predicate::str::contains("InvalidTransition"));
    run(&data_dir, &["resume", &id])
        .success()
        .stdout(predicate::str::contains("Session resumed"));
}

#[test]
fn test_invalid_set_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let plan = write_plan(temp_dir.path());
    let id = start_session(&data_dir, &plan).to_string();
    run(&data_dir, &["begin", &id]).success();

    run(&data_dir, &["log-set", &id, "goblet_squat", "--reps", "8", "--rpe", "12"])
        .failure()
        .stderr(predicate::str::contains("Validation"));
}

#[test]
fn test_abandon_keeps_history_empty() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let plan = write_plan(temp_dir.path());
    let id = start_session(&data_dir, &plan).to_string();

    run(&data_dir, &["begin", &id]).success();
    run(&data_dir, &["log-set", &id, "goblet_squat", "--reps", "10"]).success();
    run(&data_dir, &["abandon", &id])
        .success()
        .stdout(predicate::str::contains("Session abandoned"));

    assert!(!data_dir.join("store/workout_logs.json").exists());
    run(&data_dir, &["summary"])
        .success()
        .stdout(predicate::str::contains("No workouts recorded yet."));
    run(&data_dir, &["list"])
        .success()
        .stdout(predicate::str::contains("abandoned"));
}

#[test]
fn test_export_writes_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let plan = write_plan(temp_dir.path());
    let id = start_session(&data_dir, &plan).to_string();

    run(&data_dir, &["begin", &id]).success();
    run(&data_dir, &["log-set", &id, "goblet_squat", "--reps", "10", "--weight", "20", "--unit", "kg"]).success();
    run(&data_dir, &["complete", &id]).success();

    let csv_path = temp_dir.path().join("export.csv");
    run(&data_dir, &["export", csv_path.to_str().unwrap()])
        .success()
        .stdout(predicate::str::contains("Exported 1 rows from 1 workouts"));

    let csv_content = fs::read_to_string(&csv_path).unwrap();
    assert!(csv_content.contains("workout_id,plan_id"));
    assert!(csv_content.contains(",kg,"));
}

#[test]
fn test_cleanup_keeps_recent_sessions() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let plan = write_plan(temp_dir.path());
    start_session(&data_dir, &plan);

    run(&data_dir, &["cleanup"])
        .success()
        .stdout(predicate::str::contains("Removed 0 stale sessions"));
    run(&data_dir, &["list"])
        .success()
        .stdout(predicate::str::contains("not-started"));
}

#[test]
fn test_cleanup_rejects_empty_window() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let plan = write_plan(temp_dir.path());
    let id = start_session(&data_dir, &plan).to_string();

    run(&data_dir, &["cleanup", "--days", "0"])
        .failure()
        .stderr(predicate::str::contains("Validation"));
    run(&data_dir, &["summary", "--days=-1"])
        .failure()
        .stderr(predicate::str::contains("Validation"));

    run(&data_dir, &["list"])
        .success()
        .stdout(predicate::str::contains(id.as_str()));
}

#[test]
fn test_empty_list() {
    let temp_dir = setup_test_dir();

    run(temp_dir.path(), &["list"])
        .success()
        .stdout(predicate::str::contains("No sessions."));
}
