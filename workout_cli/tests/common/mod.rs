//! Shared helpers for CLI integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use uuid::Uuid;

pub const PLAN: &str = r#"
id = "full_body_a"
name = "Full Body A"

[[exercises]]
kind = "strength"
exercise_id = "goblet_squat"
name = "Goblet Squat"

[[exercises.sets]]
reps = { min = 8, max = 12 }
weight = { value = 50.0, unit = "lb" }
rest_seconds = 90

[[exercises.sets]]
reps = { min = 8, max = 12 }
weight = { value = 50.0, unit = "lb" }

[[exercises]]
kind = "cardio"
exercise_id = "rower"
mode = "row"
intervals = [
    { hard_seconds = 30, easy_seconds = 60 },
    { hard_seconds = 30, easy_seconds = 60 },
]
"#;

/// Helper to create a test data directory
pub fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
pub fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("workout"))
}

pub fn write_plan(dir: &Path) -> PathBuf {
    let path = dir.join("plan.toml");
    std::fs::write(&path, PLAN).expect("Failed to write plan");
    path
}

/// Pull the session id out of `start` output
pub fn created_session_id(stdout: &[u8]) -> Uuid {
    let text = String::from_utf8_lossy(stdout);
    text.split_whitespace()
        .find_map(|token| Uuid::parse_str(token).ok())
        .unwrap_or_else(|| panic!("No session id in output: {}", text))
}

/// Create a session and return its id
pub fn start_session(data_dir: &Path, plan: &Path) -> Uuid {
    let output = cli()
        .arg("start")
        .arg(plan)
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    created_session_id(&output)
}

/// Run a subcommand against a session and data directory
pub fn run(data_dir: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    cli().args(args).arg("--data-dir").arg(data_dir).assert()
}
