//! Workout history queries over the finalized log collection.

use crate::repository::Repository;
use crate::store::Store;
use crate::validation::day_window_cutoff;
use crate::{Result, WorkoutLog};
use chrono::{DateTime, Utc};

/// Load finalized workouts that started within the last `days` days
///
/// Returns workouts sorted by start time (newest first). `days` must be
/// at least 1.
pub fn load_recent_workouts<S: Store + ?Sized>(
    workouts: &Repository<S, WorkoutLog>,
    now: DateTime<Utc>,
    days: i64,
) -> Result<Vec<WorkoutLog>> {
    let cutoff = day_window_cutoff(now, days)?;
    let mut recent: Vec<WorkoutLog> = workouts
        .all()?
        .into_iter()
        .filter(|w| w.date_time_end.is_some() && w.date_time_start >= cutoff)
        .collect();

    recent.sort_by(|a, b| b.date_time_start.cmp(&a.date_time_start));

    tracing::info!(
        "Loaded {} workouts from last {} days",
        recent.len(),
        days
    );
    Ok(recent)
}

/// Every finalized workout, newest first
pub fn load_all_workouts<S: Store + ?Sized>(
    workouts: &Repository<S, WorkoutLog>,
) -> Result<Vec<WorkoutLog>> {
    let mut all: Vec<WorkoutLog> = workouts
        .all()?
        .into_iter()
        .filter(|w| w.date_time_end.is_some())
        .collect();
    all.sort_by(|a, b| b.date_time_start.cmp(&a.date_time_start));
    Ok(all)
}
