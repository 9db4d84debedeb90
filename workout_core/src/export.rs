//! CSV export of finalized workouts.
//!
//! Each performed set, cardio segment and flexibility entry becomes one
//! row. Exports append to an existing file, writing headers only when the
//! file is new.

use crate::{ExerciseEntry, Result, WorkoutLog};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    workout_id: String,
    plan_id: String,
    started_at: String,
    completed_at: Option<String>,
    exercise_id: String,
    entry_type: &'static str,
    item: usize,
    reps: Option<u32>,
    weight: Option<f64>,
    weight_unit: Option<String>,
    rpe: Option<u8>,
    duration_seconds: Option<u32>,
    distance_km: Option<f64>,
    avg_hr: Option<u16>,
    rating: Option<u8>,
}

impl CsvRow {
    fn base(workout: &WorkoutLog, exercise_id: &str, entry_type: &'static str, item: usize) -> Self {
        CsvRow {
            workout_id: workout.id().to_string(),
            plan_id: workout.plan_id.clone(),
            started_at: workout.date_time_start.to_rfc3339(),
            completed_at: workout.date_time_end.map(|t| t.to_rfc3339()),
            exercise_id: exercise_id.to_string(),
            entry_type,
            item,
            reps: None,
            weight: None,
            weight_unit: None,
            rpe: None,
            duration_seconds: None,
            distance_km: None,
            avg_hr: None,
            rating: workout.overall_rating,
        }
    }
}

fn rows_for(workout: &WorkoutLog) -> Vec<CsvRow> {
    let mut rows = Vec::new();
    for entry in &workout.entries {
        match entry {
            ExerciseEntry::Strength(e) => {
                for (i, set) in e.sets.iter().enumerate() {
                    let mut row = CsvRow::base(workout, &e.exercise_id, "strength", i + 1);
                    row.reps = Some(set.reps);
                    row.weight = set.weight.map(|w| w.value);
                    row.weight_unit = set.weight.map(|w| format!("{:?}", w.unit).to_lowercase());
                    row.rpe = set.rpe;
                    row.duration_seconds = set.rest_seconds;
                    rows.push(row);
                }
            }
            ExerciseEntry::Cardio(e) => {
                for segment in &e.segments {
                    let mut row = CsvRow::base(
                        workout,
                        &e.exercise_id,
                        "cardio",
                        segment.segment_number as usize,
                    );
                    row.duration_seconds = Some(segment.duration_seconds);
                    row.distance_km = segment.distance.map(|d| d.to_km());
                    row.avg_hr = segment.average_heart_rate_bpm;
                    rows.push(row);
                }
            }
            ExerciseEntry::Flexibility(e) => {
                let mut row = CsvRow::base(workout, &e.exercise_id, "flexibility", 1);
                row.reps = e.reps;
                row.duration_seconds = Some(e.duration_seconds);
                rows.push(row);
            }
        }
    }
    rows
}

/// Append workouts to a CSV file, returning the number of rows written
///
/// The file is fsynced before returning.
pub fn export_workouts_csv(workouts: &[WorkoutLog], csv_path: &Path) -> Result<usize> {
    // Ensure parent directory exists
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // For appending, skip headers if file already has content
    let needs_headers = file.metadata()?.len() == 0;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    let mut count = 0;
    for workout in workouts {
        for row in rows_for(workout) {
            writer.serialize(row)?;
            count += 1;
        }
    }

    // Flush and sync to disk
    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!(
        "Exported {} rows from {} workouts to {:?}",
        count,
        workouts.len(),
        csv_path
    );
    Ok(count)
}
