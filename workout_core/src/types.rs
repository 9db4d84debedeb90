//! Core domain types for the workout session engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Session plans and their exercise prescriptions
//! - Performed sets, cardio segments and exercise entries
//! - Workout logs (the historical record)
//! - Active workout sessions and their lifecycle status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Units
// ============================================================================

/// Unit a weight value is recorded in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Lb,
    Kg,
}

/// Unit a distance value is recorded in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Km,
    M,
    Mi,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Weight {
    pub value: f64,
    pub unit: WeightUnit,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Distance {
    pub value: f64,
    pub unit: DistanceUnit,
}

// ============================================================================
// Plan Types
// ============================================================================

/// Target repetitions for one prescribed set
///
/// Plans write either `reps = 10` or `reps = { min = 8, max = 12 }`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RepTarget {
    Exact(u32),
    Range { min: u32, max: u32 },
}

/// Planned target for a single strength set
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SetPrescription {
    pub reps: RepTarget,
    #[serde(default)]
    pub weight: Option<Weight>,
    #[serde(default)]
    pub rest_seconds: Option<u32>,
    #[serde(default)]
    pub rpe_target: Option<u8>,
}

/// One hard/easy pair of a cardio interval block
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardioInterval {
    pub hard_seconds: u32,
    pub easy_seconds: u32,
}

/// Planned target for one exercise of a session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExercisePrescription {
    Strength {
        exercise_id: String,
        name: String,
        sets: Vec<SetPrescription>,
    },
    Cardio {
        exercise_id: String,
        mode: String,
        #[serde(default)]
        warmup_minutes: u32,
        #[serde(default)]
        intervals: Vec<CardioInterval>,
        #[serde(default)]
        cooldown_minutes: u32,
    },
}

impl ExercisePrescription {
    pub fn exercise_id(&self) -> &str {
        match self {
            ExercisePrescription::Strength { exercise_id, .. } => exercise_id,
            ExercisePrescription::Cardio { exercise_id, .. } => exercise_id,
        }
    }

    /// Number of units of work that count as "sets" for progress.
    ///
    /// Strength counts its set prescriptions. Cardio counts one unit per
    /// work interval plus one each for a warm-up and cool-down, never less
    /// than one.
    pub fn prescribed_sets(&self) -> u32 {
        match self {
            ExercisePrescription::Strength { sets, .. } => sets.len() as u32,
            ExercisePrescription::Cardio {
                warmup_minutes,
                intervals,
                cooldown_minutes,
                ..
            } => {
                let phases = u32::from(*warmup_minutes > 0) + u32::from(*cooldown_minutes > 0);
                (intervals.len() as u32 + phases).max(1)
            }
        }
    }
}

/// An ordered list of exercise prescriptions, immutable during execution
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionPlan {
    pub id: String,
    pub name: String,
    pub exercises: Vec<ExercisePrescription>,
}

impl SessionPlan {
    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.prescribed_sets()).sum()
    }

    pub fn exercise(&self, exercise_id: &str) -> Option<&ExercisePrescription> {
        self.exercises.iter().find(|e| e.exercise_id() == exercise_id)
    }
}

// ============================================================================
// Performed Work
// ============================================================================

/// Qualitative effort label recorded with every set
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PerceivedEffort {
    Easy,
    Moderate,
    Hard,
    Failure,
}

impl std::str::FromStr for PerceivedEffort {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(PerceivedEffort::Easy),
            "moderate" => Ok(PerceivedEffort::Moderate),
            "hard" => Ok(PerceivedEffort::Hard),
            "failure" => Ok(PerceivedEffort::Failure),
            other => Err(format!("unknown effort label: {}", other)),
        }
    }
}

/// Optional 0-10 pain scores by body region
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PainScores {
    #[serde(default)]
    pub back: Option<u8>,
    #[serde(default)]
    pub knee: Option<u8>,
    #[serde(default)]
    pub shoulder: Option<u8>,
    #[serde(default)]
    pub other: Option<u8>,
}

impl PainScores {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u8)> + '_ {
        [
            ("back", self.back),
            ("knee", self.knee),
            ("shoulder", self.shoulder),
            ("other", self.other),
        ]
        .into_iter()
        .filter_map(|(region, score)| score.map(|s| (region, s)))
    }
}

/// The recorded outcome of one strength set. Never mutated once logged.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PerformedSet {
    pub reps: u32,
    #[serde(default)]
    pub weight: Option<Weight>,
    #[serde(default)]
    pub rest_seconds: Option<u32>,
    pub perceived_effort: PerceivedEffort,
    #[serde(default)]
    pub rpe: Option<u8>,
    #[serde(default)]
    pub pain: PainScores,
}

/// One segment of a cardio effort (warm-up, interval, cool-down...)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CardioSegment {
    pub segment_number: u32,
    pub label: String,
    pub duration_seconds: u32,
    #[serde(default)]
    pub distance: Option<Distance>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub incline: Option<f64>,
    #[serde(default)]
    pub resistance: Option<f64>,
    #[serde(default)]
    pub average_heart_rate_bpm: Option<u16>,
    #[serde(default)]
    pub max_heart_rate_bpm: Option<u16>,
}

// ============================================================================
// Exercise Entries
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StrengthEntry {
    pub exercise_id: String,
    pub exercise_name: String,
    pub order_index: usize,
    pub sets: Vec<PerformedSet>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Cardio work for one exercise.
///
/// `total_duration_seconds` and the heart-rate fields are derived from
/// `segments` and recomputed in full whenever a segment is appended.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CardioEntry {
    pub exercise_id: String,
    pub mode: String,
    pub order_index: usize,
    pub total_duration_seconds: u32,
    pub segments: Vec<CardioSegment>,
    #[serde(default)]
    pub average_heart_rate_bpm: Option<u16>,
    #[serde(default)]
    pub max_heart_rate_bpm: Option<u16>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CardioEntry {
    pub fn recompute_totals(&mut self) {
        self.total_duration_seconds = self.segments.iter().map(|s| s.duration_seconds).sum();

        let rates: Vec<u32> = self
            .segments
            .iter()
            .filter_map(|s| s.average_heart_rate_bpm)
            .map(u32::from)
            .collect();
        self.average_heart_rate_bpm = if rates.is_empty() {
            None
        } else {
            let mean = rates.iter().sum::<u32>() as f64 / rates.len() as f64;
            Some(mean.round() as u16)
        };

        self.max_heart_rate_bpm = self.segments.iter().filter_map(|s| s.max_heart_rate_bpm).max();
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FlexibilityEntry {
    pub exercise_id: String,
    pub exercise_name: String,
    pub order_index: usize,
    pub duration_seconds: u32,
    #[serde(default)]
    pub hold_time_seconds: Option<u32>,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Which variant of [`ExerciseEntry`] a lookup is for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Strength,
    Cardio,
    Flexibility,
}

/// One exercise's worth of performed work within a workout log
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExerciseEntry {
    Strength(StrengthEntry),
    Cardio(CardioEntry),
    Flexibility(FlexibilityEntry),
}

impl ExerciseEntry {
    pub fn exercise_id(&self) -> &str {
        match self {
            ExerciseEntry::Strength(e) => &e.exercise_id,
            ExerciseEntry::Cardio(e) => &e.exercise_id,
            ExerciseEntry::Flexibility(e) => &e.exercise_id,
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            ExerciseEntry::Strength(_) => EntryKind::Strength,
            ExerciseEntry::Cardio(_) => EntryKind::Cardio,
            ExerciseEntry::Flexibility(_) => EntryKind::Flexibility,
        }
    }

    /// Units of logged work, comparable with `ExercisePrescription::prescribed_sets`
    pub fn logged_sets(&self) -> u32 {
        match self {
            ExerciseEntry::Strength(e) => e.sets.len() as u32,
            ExerciseEntry::Cardio(e) => e.segments.len() as u32,
            ExerciseEntry::Flexibility(_) => 1,
        }
    }

    pub fn set_notes(&mut self, notes: String) {
        let slot = match self {
            ExerciseEntry::Strength(e) => &mut e.notes,
            ExerciseEntry::Cardio(e) => &mut e.notes,
            ExerciseEntry::Flexibility(e) => &mut e.notes,
        };
        *slot = Some(notes);
    }
}

// ============================================================================
// Entity Metadata
// ============================================================================

/// Identity and bookkeeping carried by every persisted entity
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EntityMeta {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// 0 until first persisted, then incremented by 1 on every write
    pub version: u32,
}

impl EntityMeta {
    pub fn new(id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }
}

// ============================================================================
// Workout Log
// ============================================================================

/// The record of what was actually performed
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutLog {
    pub meta: EntityMeta,
    pub plan_id: String,
    pub plan_name: String,
    pub date_time_start: DateTime<Utc>,
    #[serde(default)]
    pub date_time_end: Option<DateTime<Utc>>,
    pub entries: Vec<ExerciseEntry>,
    #[serde(default)]
    pub overall_rating: Option<u8>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl WorkoutLog {
    pub fn id(&self) -> Uuid {
        self.meta.id
    }

    pub fn find_entry(&self, exercise_id: &str, kind: EntryKind) -> Option<&ExerciseEntry> {
        self.entries
            .iter()
            .find(|e| e.kind() == kind && e.exercise_id() == exercise_id)
    }

    /// Position of the first entry for an exercise, regardless of kind
    pub fn entry_position(&self, exercise_id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.exercise_id() == exercise_id)
    }

    pub fn duration_seconds(&self) -> Option<u64> {
        self.date_time_end
            .map(|end| (end - self.date_time_start).num_seconds().max(0) as u64)
    }
}

// ============================================================================
// Active Session
// ============================================================================

/// Lifecycle status of an active workout session
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    NotStarted,
    Active,
    Paused,
    Completed,
    Abandoned,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::NotStarted => "not-started",
            SessionStatus::Active => "active",
            SessionStatus::Paused => "paused",
            SessionStatus::Completed => "completed",
            SessionStatus::Abandoned => "abandoned",
        };
        f.write_str(s)
    }
}

/// The mutable aggregate for one in-progress or finished workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActiveWorkoutSession {
    pub meta: EntityMeta,
    /// Snapshot of the plan this session executes
    pub plan: SessionPlan,
    pub workout_log: WorkoutLog,
    pub current_exercise_index: usize,
    pub session_status: SessionStatus,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pause_time: Option<DateTime<Utc>>,
    /// Cumulative whole seconds spent paused
    pub pause_duration: u64,
    #[serde(default)]
    pub rest_time_remaining: Option<u32>,
    #[serde(default)]
    pub is_resting: bool,
    pub last_activity: DateTime<Utc>,
}

impl ActiveWorkoutSession {
    pub fn id(&self) -> Uuid {
        self.meta.id
    }

    /// The prescription at `current_exercise_index`, if any remain
    pub fn current_exercise(&self) -> Option<&ExercisePrescription> {
        self.plan.exercises.get(self.current_exercise_index)
    }
}
