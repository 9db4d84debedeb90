//! Aggregate statistics over finalized workout logs.
//!
//! All weights are normalized through [`crate::units`] so every total uses
//! the same conversion factor.

use crate::{ExerciseEntry, PerformedSet, WeightUnit, WorkoutLog};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ExerciseFrequency {
    pub exercise_id: String,
    pub count: usize,
}

/// Totals across a collection of workouts
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct WorkoutSummary {
    pub total_workouts: usize,
    /// Sum over workouts that have an end time
    pub total_duration_seconds: u64,
    pub exercise_ids: BTreeSet<String>,
    pub total_volume: f64,
    pub volume_unit: WeightUnit,
    pub total_distance_km: f64,
    pub average_rating: Option<f64>,
    pub most_frequent_exercises: Vec<ExerciseFrequency>,
}

impl WorkoutSummary {
    pub fn unique_exercises(&self) -> usize {
        self.exercise_ids.len()
    }
}

/// Per-workout statistics
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct WorkoutStats {
    pub total_volume: f64,
    pub volume_unit: WeightUnit,
    pub average_rpe: Option<f64>,
    pub max_weight: Option<f64>,
    pub total_reps: u32,
    pub total_sets: usize,
    pub exercise_count: usize,
    pub duration_seconds: Option<u64>,
    pub total_distance_km: f64,
}

/// One week of training volume
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TrendPoint {
    /// Monday of the ISO week
    pub week_start: NaiveDate,
    pub workouts: usize,
    pub volume: f64,
}

/// weight × reps in the requested unit; bodyweight sets contribute nothing
pub fn set_volume(set: &PerformedSet, unit: WeightUnit) -> f64 {
    set.weight
        .map_or(0.0, |w| w.to_unit(unit) * f64::from(set.reps))
}

fn strength_sets(workout: &WorkoutLog) -> impl Iterator<Item = &PerformedSet> {
    workout.entries.iter().flat_map(|entry| {
        let sets: &[PerformedSet] = match entry {
            ExerciseEntry::Strength(e) => &e.sets,
            ExerciseEntry::Cardio(_) | ExerciseEntry::Flexibility(_) => &[],
        };
        sets
    })
}

pub fn workout_volume(workout: &WorkoutLog, unit: WeightUnit) -> f64 {
    strength_sets(workout).map(|s| set_volume(s, unit)).sum()
}

pub fn workout_distance_km(workout: &WorkoutLog) -> f64 {
    workout
        .entries
        .iter()
        .map(|entry| match entry {
            ExerciseEntry::Cardio(e) => e
                .segments
                .iter()
                .filter_map(|s| s.distance)
                .map(|d| d.to_km())
                .sum(),
            ExerciseEntry::Strength(_) | ExerciseEntry::Flexibility(_) => 0.0,
        })
        .sum()
}

pub fn calculate_workout_stats(workout: &WorkoutLog, unit: WeightUnit) -> WorkoutStats {
    let mut total_reps = 0u32;
    let mut total_sets = 0usize;
    let mut rpe_sum = 0u32;
    let mut rpe_count = 0u32;
    let mut max_weight: Option<f64> = None;

    for set in strength_sets(workout) {
        total_reps += set.reps;
        total_sets += 1;
        if let Some(rpe) = set.rpe {
            rpe_sum += u32::from(rpe);
            rpe_count += 1;
        }
        if let Some(weight) = set.weight {
            let w = weight.to_unit(unit);
            max_weight = Some(max_weight.map_or(w, |m| m.max(w)));
        }
    }

    WorkoutStats {
        total_volume: workout_volume(workout, unit),
        volume_unit: unit,
        average_rpe: (rpe_count > 0).then(|| f64::from(rpe_sum) / f64::from(rpe_count)),
        max_weight,
        total_reps,
        total_sets,
        exercise_count: workout.entries.len(),
        duration_seconds: workout.duration_seconds(),
        total_distance_km: workout_distance_km(workout),
    }
}

/// Summarize many workouts at once
///
/// `top_n` bounds the most-frequent list, ordered by entry count then id.
pub fn generate_workout_summary(
    workouts: &[WorkoutLog],
    unit: WeightUnit,
    top_n: usize,
) -> WorkoutSummary {
    let mut exercise_ids = BTreeSet::new();
    let mut frequency: HashMap<&str, usize> = HashMap::new();
    let mut ratings = Vec::new();
    let mut total_duration_seconds = 0u64;
    let mut total_volume = 0.0;
    let mut total_distance_km = 0.0;

    for workout in workouts {
        total_duration_seconds += workout.duration_seconds().unwrap_or(0);
        total_volume += workout_volume(workout, unit);
        total_distance_km += workout_distance_km(workout);
        if let Some(rating) = workout.overall_rating {
            ratings.push(f64::from(rating));
        }
        for entry in &workout.entries {
            exercise_ids.insert(entry.exercise_id().to_string());
            *frequency.entry(entry.exercise_id()).or_default() += 1;
        }
    }

    let mut most_frequent: Vec<ExerciseFrequency> = frequency
        .into_iter()
        .map(|(id, count)| ExerciseFrequency {
            exercise_id: id.to_string(),
            count,
        })
        .collect();
    most_frequent.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.exercise_id.cmp(&b.exercise_id))
    });
    most_frequent.truncate(top_n);

    let average_rating =
        (!ratings.is_empty()).then(|| ratings.iter().sum::<f64>() / ratings.len() as f64);

    WorkoutSummary {
        total_workouts: workouts.len(),
        total_duration_seconds,
        exercise_ids,
        total_volume,
        volume_unit: unit,
        total_distance_km,
        average_rating,
        most_frequent_exercises: most_frequent,
    }
}

/// Weekly volume buckets, oldest week first
pub fn volume_trend(workouts: &[WorkoutLog], unit: WeightUnit) -> Vec<TrendPoint> {
    let mut weeks: BTreeMap<NaiveDate, (usize, f64)> = BTreeMap::new();
    for workout in workouts {
        let day = workout.date_time_start.date_naive();
        let week_start = day - Duration::days(i64::from(day.weekday().num_days_from_monday()));
        let bucket = weeks.entry(week_start).or_insert((0, 0.0));
        bucket.0 += 1;
        bucket.1 += workout_volume(workout, unit);
    }

    weeks
        .into_iter()
        .map(|(week_start, (workouts, volume))| TrendPoint {
            week_start,
            workouts,
            volume,
        })
        .collect()
}
