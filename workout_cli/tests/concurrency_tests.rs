//! Concurrency tests for the workout CLI.
//!
//! These tests verify that multiple processes can safely write to the same
//! store (file locking plus atomic replacement).

mod common;

use common::{cli, created_session_id, setup_test_dir, write_plan};
use std::thread;

#[test]
fn test_concurrent_session_creation() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let plan = write_plan(temp_dir.path());

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let data_dir = data_dir.clone();
            let plan = plan.clone();
            thread::spawn(move || {
                let output = cli()
                    .arg("start")
                    .arg(&plan)
                    .arg("--data-dir")
                    .arg(&data_dir)
                    .assert()
                    .success()
                    .get_output()
                    .stdout
                    .clone();
                created_session_id(&output)
            })
        })
        .collect();

    let ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // Every process's session must have survived the others' writes
    let store_path = data_dir.join("store/active_sessions.json");
    let contents = std::fs::read_to_string(&store_path).expect("Failed to read store");
    let sessions: serde_json::Value = serde_json::from_str(&contents).expect("Store is not JSON");
    let sessions = sessions.as_object().expect("Store is not an object");

    assert_eq!(sessions.len(), 5, "Expected 5 sessions, got {}", sessions.len());
    for id in ids {
        assert!(sessions.contains_key(&id.to_string()));
    }
}
