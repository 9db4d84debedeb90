//! Live progress for an active session.
//!
//! Progress is derived on demand from the session and its plan and is
//! never persisted.

use crate::{ActiveWorkoutSession, EntryKind, ExercisePrescription, SessionPlan, SessionStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Fixed per-set estimate used for the time-remaining heuristic
pub const DEFAULT_SECONDS_PER_SET: u32 = 120;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SessionProgress {
    pub exercises_completed: usize,
    pub total_exercises: usize,
    pub sets_completed: u32,
    pub total_sets: u32,
    pub elapsed_seconds: u64,
    pub estimated_time_remaining_seconds: u64,
    pub completion_percentage: f64,
}

/// Active training time: wall time since start minus time spent paused
///
/// The clock stops at `pause_time` while paused and at the session's end
/// once it is finished, so the value never runs on unattended.
pub fn elapsed_seconds(session: &ActiveWorkoutSession, now: DateTime<Utc>) -> u64 {
    let Some(start) = session.start_time else {
        return 0;
    };

    let until = match session.session_status {
        SessionStatus::Paused => session.pause_time.unwrap_or(now),
        SessionStatus::Completed => session.workout_log.date_time_end.unwrap_or(now),
        SessionStatus::Abandoned => session.last_activity,
        SessionStatus::NotStarted | SessionStatus::Active => now,
    };

    let gross = (until - start).num_seconds().max(0) as u64;
    gross.saturating_sub(session.pause_duration)
}

fn entry_kind_for(prescription: &ExercisePrescription) -> EntryKind {
    match prescription {
        ExercisePrescription::Strength { .. } => EntryKind::Strength,
        ExercisePrescription::Cardio { .. } => EntryKind::Cardio,
    }
}

/// Compute a progress snapshot
///
/// Exercises before the current index count all of their prescribed sets;
/// the current exercise counts only what has actually been logged for it.
pub fn calculate_session_progress(
    session: &ActiveWorkoutSession,
    plan: &SessionPlan,
    now: DateTime<Utc>,
    seconds_per_set: u32,
) -> SessionProgress {
    let current = session.current_exercise_index.min(plan.exercises.len());

    let mut total_sets = 0u32;
    let mut sets_completed = 0u32;
    for (index, exercise) in plan.exercises.iter().enumerate() {
        let prescribed = exercise.prescribed_sets();
        total_sets += prescribed;

        if index < current {
            sets_completed += prescribed;
        } else if index == current {
            sets_completed += session
                .workout_log
                .find_entry(exercise.exercise_id(), entry_kind_for(exercise))
                .map_or(0, |entry| entry.logged_sets());
        }
    }

    let remaining_sets = total_sets.saturating_sub(sets_completed);
    let completion_percentage = if total_sets == 0 {
        0.0
    } else {
        (f64::from(sets_completed) / f64::from(total_sets) * 100.0).min(100.0)
    };

    SessionProgress {
        exercises_completed: current,
        total_exercises: plan.exercises.len(),
        sets_completed,
        total_sets,
        elapsed_seconds: elapsed_seconds(session, now),
        estimated_time_remaining_seconds: u64::from(remaining_sets) * u64::from(seconds_per_set),
        completion_percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        EntityMeta, ExerciseEntry, PainScores, PerceivedEffort, PerformedSet, RepTarget,
        SetPrescription, StrengthEntry, WorkoutLog,
    };
    use chrono::Duration;
    use uuid::Uuid;

    fn strength(id: &str, sets: usize) -> ExercisePrescription {
        ExercisePrescription::Strength {
            exercise_id: id.into(),
            name: id.into(),
            sets: (0..sets)
                .map(|_| SetPrescription {
                    reps: RepTarget::Range { min: 8, max: 12 },
                    weight: None,
                    rest_seconds: Some(90),
                    rpe_target: None,
                })
                .collect(),
        }
    }

    fn performed(reps: u32) -> PerformedSet {
        PerformedSet {
            reps,
            weight: None,
            rest_seconds: None,
            perceived_effort: PerceivedEffort::Moderate,
            rpe: None,
            pain: PainScores::default(),
        }
    }

    fn session(plan: &SessionPlan, start: DateTime<Utc>) -> ActiveWorkoutSession {
        let id = Uuid::new_v4();
        ActiveWorkoutSession {
            meta: EntityMeta::new(id, start),
            plan: plan.clone(),
            workout_log: WorkoutLog {
                meta: EntityMeta::new(id, start),
                plan_id: plan.id.clone(),
                plan_name: plan.name.clone(),
                date_time_start: start,
                date_time_end: None,
                entries: vec![],
                overall_rating: None,
                notes: None,
            },
            current_exercise_index: 0,
            session_status: SessionStatus::Active,
            start_time: Some(start),
            pause_time: None,
            pause_duration: 0,
            rest_time_remaining: None,
            is_resting: false,
            last_activity: start,
        }
    }

    fn plan() -> SessionPlan {
        SessionPlan {
            id: "upper".into(),
            name: "Upper".into(),
            exercises: vec![strength("bench", 3), strength("row", 2)],
        }
    }

    #[test]
    fn test_progress_counts_current_exercise_logged_sets() {
        let plan = plan();
        let start = Utc::now();
        let mut s = session(&plan, start);
        s.current_exercise_index = 1;
        s.workout_log.entries.push(ExerciseEntry::Strength(StrengthEntry {
            exercise_id: "row".into(),
            exercise_name: "row".into(),
            order_index: 1,
            sets: vec![performed(10)],
            notes: None,
        }));

        let progress = calculate_session_progress(&s, &plan, start, DEFAULT_SECONDS_PER_SET);

        assert_eq!(progress.exercises_completed, 1);
        assert_eq!(progress.total_exercises, 2);
        assert_eq!(progress.total_sets, 5);
        assert_eq!(progress.sets_completed, 4);
        assert_eq!(progress.estimated_time_remaining_seconds, 120);
        assert!((progress.completion_percentage - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_elapsed_subtracts_pause_duration() {
        let plan = plan();
        let start = Utc::now();
        let mut s = session(&plan, start);
        s.pause_duration = 45;

        let progress =
            calculate_session_progress(&s, &plan, start + Duration::seconds(300), 120);
        assert_eq!(progress.elapsed_seconds, 255);
    }

    #[test]
    fn test_elapsed_frozen_while_paused() {
        let plan = plan();
        let start = Utc::now();
        let mut s = session(&plan, start);
        s.session_status = SessionStatus::Paused;
        s.pause_time = Some(start + Duration::seconds(60));

        assert_eq!(elapsed_seconds(&s, start + Duration::hours(2)), 60);
    }

    #[test]
    fn test_elapsed_never_negative() {
        let plan = plan();
        let start = Utc::now();
        let mut s = session(&plan, start);
        s.pause_duration = 10_000;

        assert_eq!(elapsed_seconds(&s, start + Duration::seconds(5)), 0);
        assert_eq!(elapsed_seconds(&s, start - Duration::seconds(5)), 0);
    }

    #[test]
    fn test_not_started_has_no_elapsed_time() {
        let plan = plan();
        let start = Utc::now();
        let mut s = session(&plan, start);
        s.session_status = SessionStatus::NotStarted;
        s.start_time = None;

        let progress = calculate_session_progress(&s, &plan, start + Duration::minutes(9), 120);
        assert_eq!(progress.elapsed_seconds, 0);
        assert_eq!(progress.estimated_time_remaining_seconds, 600);
    }
}
