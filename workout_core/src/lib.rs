#![forbid(unsafe_code)]

//! Core domain model and business logic for workout session tracking.
//!
//! This crate provides:
//! - Domain types (plans, performed sets, cardio segments, workout logs)
//! - The session lifecycle engine (start, log, pause, resume, complete)
//! - Progress and summary calculators
//! - Persistence (store contract, file-backed store, typed repositories)
//! - Configuration, history queries and CSV export

pub mod types;
pub mod error;
pub mod units;
pub mod clock;
pub mod config;
pub mod logging;
pub mod validation;
pub mod plan;
pub mod store;
pub mod file_store;
pub mod repository;
pub mod progress;
pub mod summary;
pub mod history;
pub mod export;
pub mod engine;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, SessionConfig};
pub use store::{MemoryStore, Store};
pub use file_store::JsonDirStore;
pub use repository::{Entity, Repository};
pub use progress::{calculate_session_progress, SessionProgress};
pub use summary::{
    calculate_workout_stats, generate_workout_summary, volume_trend, WorkoutStats,
    WorkoutSummary,
};
pub use history::{load_all_workouts, load_recent_workouts};
pub use export::export_workouts_csv;
pub use engine::{FlexibilityHold, SessionEngine};
