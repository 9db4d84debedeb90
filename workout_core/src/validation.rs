//! Input checks applied before the engine mutates or persists anything.

use crate::{
    CardioSegment, Error, ExercisePrescription, PerformedSet, RepTarget, Result, SessionPlan,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

const MAX_REPS_PER_SET: u32 = 1000;
const MAX_HEART_RATE_BPM: u16 = 250;

fn invalid(msg: impl Into<String>) -> Error {
    Error::Validation(msg.into())
}

fn check_non_negative(field: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => {
            Err(invalid(format!("{} must be a non-negative number, got {}", field, v)))
        }
        _ => Ok(()),
    }
}

fn check_heart_rate(field: &str, value: Option<u16>) -> Result<()> {
    match value {
        Some(bpm) if bpm == 0 || bpm > MAX_HEART_RATE_BPM => Err(invalid(format!(
            "{} must be between 1 and {}, got {}",
            field, MAX_HEART_RATE_BPM, bpm
        ))),
        _ => Ok(()),
    }
}

pub fn validate_performed_set(set: &PerformedSet) -> Result<()> {
    if set.reps > MAX_REPS_PER_SET {
        return Err(invalid(format!("{} reps in one set is not plausible", set.reps)));
    }
    if let Some(weight) = &set.weight {
        check_non_negative("weight", Some(weight.value))?;
    }
    if let Some(rpe) = set.rpe {
        if !(1..=10).contains(&rpe) {
            return Err(invalid(format!("RPE must be between 1 and 10, got {}", rpe)));
        }
    }
    for (region, score) in set.pain.iter() {
        if score > 10 {
            return Err(invalid(format!(
                "{} pain must be between 0 and 10, got {}",
                region, score
            )));
        }
    }
    Ok(())
}

pub fn validate_cardio_segment(segment: &CardioSegment) -> Result<()> {
    if segment.duration_seconds == 0 {
        return Err(invalid("segment duration must be positive"));
    }
    check_non_negative("distance", segment.distance.map(|d| d.value))?;
    check_non_negative("speed", segment.speed)?;
    check_non_negative("incline", segment.incline)?;
    check_non_negative("resistance", segment.resistance)?;
    check_heart_rate("average heart rate", segment.average_heart_rate_bpm)?;
    check_heart_rate("max heart rate", segment.max_heart_rate_bpm)?;
    Ok(())
}

pub fn validate_flexibility(duration_seconds: u32) -> Result<()> {
    if duration_seconds == 0 {
        return Err(invalid("flexibility duration must be positive"));
    }
    Ok(())
}

pub fn validate_rating(rating: Option<u8>) -> Result<()> {
    match rating {
        Some(r) if !(1..=5).contains(&r) => {
            Err(invalid(format!("rating must be between 1 and 5, got {}", r)))
        }
        _ => Ok(()),
    }
}

/// Trim free-text notes, treating blank input as absent
pub fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

/// Start of a look-back window of `days` whole days ending at `now`
///
/// Windows shorter than a day, or too large to represent, are rejected.
pub fn day_window_cutoff(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>> {
    if days < 1 {
        return Err(invalid(format!("day window must be at least 1, got {}", days)));
    }
    Duration::try_days(days)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| invalid(format!("day window of {} days is out of range", days)))
}

pub fn validate_plan(plan: &SessionPlan) -> Result<()> {
    if plan.id.trim().is_empty() {
        return Err(invalid("plan id must not be empty"));
    }
    if plan.exercises.is_empty() {
        return Err(invalid(format!("plan {} has no exercises", plan.id)));
    }

    let mut seen = HashSet::new();
    for exercise in &plan.exercises {
        let id = exercise.exercise_id();
        if id.trim().is_empty() {
            return Err(invalid("exercise id must not be empty"));
        }
        if !seen.insert(id) {
            return Err(invalid(format!("exercise {} appears twice in plan", id)));
        }

        if let ExercisePrescription::Strength { sets, .. } = exercise {
            if sets.is_empty() {
                return Err(invalid(format!("strength exercise {} has no sets", id)));
            }
            for set in sets {
                if let RepTarget::Range { min, max } = set.reps {
                    if min > max {
                        return Err(invalid(format!(
                            "exercise {} has rep range {}-{} with min above max",
                            id, min, max
                        )));
                    }
                }
                if let Some(rpe) = set.rpe_target {
                    if !(1..=10).contains(&rpe) {
                        return Err(invalid(format!(
                            "exercise {} has RPE target {} outside 1-10",
                            id, rpe
                        )));
                    }
                }
            }
        }
    }
    Ok(())
}
