//! Session lifecycle engine.
//!
//! Owns the state machine for active workout sessions:
//!
//! ```text
//! not-started --start--> active <--pause/resume--> paused
//! active/paused --complete--> completed
//! not-started/active/paused --abandon--> abandoned
//! ```
//!
//! Every mutating command follows the same load-modify-save pattern under a
//! per-session lock: the session is loaded, the transition is checked and
//! applied to the loaded copy, and only a fully updated session is written
//! back. A rejected command leaves the stored session untouched.

use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::history::{load_all_workouts, load_recent_workouts};
use crate::progress::{calculate_session_progress, SessionProgress};
use crate::repository::Repository;
use crate::store::Store;
use crate::validation::{
    day_window_cutoff, normalize_notes, validate_cardio_segment, validate_flexibility, validate_performed_set,
    validate_plan, validate_rating,
};
use crate::{
    ActiveWorkoutSession, CardioEntry, CardioSegment, EntityMeta, EntryKind, Error,
    ExerciseEntry, ExercisePrescription, FlexibilityEntry, PerformedSet, Result, SessionPlan,
    SessionStatus, StrengthEntry, WorkoutLog,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

/// Flexibility work logged in one call
#[derive(Clone, Debug, PartialEq)]
pub struct FlexibilityHold {
    pub exercise_name: String,
    pub duration_seconds: u32,
    pub hold_time_seconds: Option<u32>,
    pub reps: Option<u32>,
}

/// One mutex per session id so commands for a session never interleave
#[derive(Debug, Default)]
struct SessionLocks {
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    fn handle(&self, id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(id).or_default())
    }

    fn forget(&self, ids: &[Uuid]) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        for id in ids {
            locks.remove(id);
        }
    }
}

fn require_status(
    session: &ActiveWorkoutSession,
    allowed: &[SessionStatus],
    action: &'static str,
) -> Result<()> {
    if allowed.contains(&session.session_status) {
        Ok(())
    } else {
        Err(Error::InvalidTransition {
            status: session.session_status,
            action,
        })
    }
}

pub struct SessionEngine<S: Store + ?Sized, C = SystemClock> {
    sessions: Repository<S, ActiveWorkoutSession>,
    workouts: Repository<S, WorkoutLog>,
    clock: C,
    settings: SessionConfig,
    locks: SessionLocks,
}

impl<S: Store + ?Sized> SessionEngine<S, SystemClock> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: Store + ?Sized, C: Clock> SessionEngine<S, C> {
    pub fn with_clock(store: Arc<S>, clock: C) -> Self {
        Self {
            sessions: Repository::new(Arc::clone(&store)),
            workouts: Repository::new(store),
            clock,
            settings: SessionConfig::default(),
            locks: SessionLocks::default(),
        }
    }

    pub fn with_settings(mut self, settings: SessionConfig) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &SessionConfig {
        &self.settings
    }

    /// Load a session, apply `f` under the session lock, and persist it
    fn mutate<F>(&self, id: Uuid, f: F) -> Result<ActiveWorkoutSession>
    where
        F: FnOnce(&mut ActiveWorkoutSession, DateTime<Utc>) -> Result<()>,
    {
        let lock = self.locks.handle(id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut session = self.sessions.require(id)?;
        let now = self.clock.now();
        f(&mut session, now)?;
        session.last_activity = now;
        self.sessions.save(&mut session, now)?;
        Ok(session)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Create a `not-started` session for a plan
    pub fn start_workout_session(&self, plan: SessionPlan) -> Result<ActiveWorkoutSession> {
        validate_plan(&plan)?;

        let id = Uuid::new_v4();
        let now = self.clock.now();
        let workout_log = WorkoutLog {
            meta: EntityMeta::new(id, now),
            plan_id: plan.id.clone(),
            plan_name: plan.name.clone(),
            date_time_start: now,
            date_time_end: None,
            entries: Vec::new(),
            overall_rating: None,
            notes: None,
        };
        let mut session = ActiveWorkoutSession {
            meta: EntityMeta::new(id, now),
            plan,
            workout_log,
            current_exercise_index: 0,
            session_status: SessionStatus::NotStarted,
            start_time: None,
            pause_time: None,
            pause_duration: 0,
            rest_time_remaining: None,
            is_resting: false,
            last_activity: now,
        };

        self.sessions.save(&mut session, now)?;
        tracing::info!("Created session {} for plan {}", id, session.plan.id);
        Ok(session)
    }

    pub fn start_execution(&self, id: Uuid) -> Result<ActiveWorkoutSession> {
        self.mutate(id, |session, now| {
            require_status(session, &[SessionStatus::NotStarted], "start")?;
            session.session_status = SessionStatus::Active;
            session.start_time = Some(now);
            session.workout_log.date_time_start = now;
            tracing::info!("Session {} started", id);
            Ok(())
        })
    }

    pub fn pause_session(&self, id: Uuid) -> Result<ActiveWorkoutSession> {
        self.mutate(id, |session, now| {
            require_status(session, &[SessionStatus::Active], "pause")?;
            session.session_status = SessionStatus::Paused;
            session.pause_time = Some(now);
            tracing::info!("Session {} paused", id);
            Ok(())
        })
    }

    /// Resume a paused session, adding the pause interval (whole seconds)
    /// to `pause_duration`
    pub fn resume_session(&self, id: Uuid) -> Result<ActiveWorkoutSession> {
        self.mutate(id, |session, now| {
            require_status(session, &[SessionStatus::Paused], "resume")?;
            let paused_for = close_pause(session, now);
            session.session_status = SessionStatus::Active;
            tracing::info!("Session {} resumed after {}s pause", id, paused_for);
            Ok(())
        })
    }

    /// Finalize a session into workout history
    ///
    /// Repeating the call on a completed session re-saves the same
    /// finalized log under the same id, so history never gains duplicates.
    pub fn complete_session(
        &self,
        id: Uuid,
        notes: Option<String>,
        rating: Option<u8>,
    ) -> Result<ActiveWorkoutSession> {
        validate_rating(rating)?;
        let notes = normalize_notes(notes);

        let lock = self.locks.handle(id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut session = self.sessions.require(id)?;
        let now = self.clock.now();

        if session.session_status == SessionStatus::Completed {
            tracing::debug!("Session {} already completed; re-saving its log", id);
            let mut log = session.workout_log.clone();
            self.workouts.save(&mut log, now)?;
            return Ok(session);
        }
        require_status(
            &session,
            &[SessionStatus::Active, SessionStatus::Paused],
            "complete",
        )?;

        if session.session_status == SessionStatus::Paused {
            close_pause(&mut session, now);
        }

        let mut log = session.workout_log.clone();
        log.date_time_end = Some(now);
        if notes.is_some() {
            log.notes = notes;
        }
        if rating.is_some() {
            log.overall_rating = rating;
        }

        // History first: a failure here leaves the session resumable
        self.workouts.save(&mut log, now)?;

        session.workout_log = log;
        session.session_status = SessionStatus::Completed;
        session.is_resting = false;
        session.rest_time_remaining = None;
        session.last_activity = now;
        self.sessions.save(&mut session, now)?;

        tracing::info!(
            "Session {} completed with {} exercise entries",
            id,
            session.workout_log.entries.len()
        );
        Ok(session)
    }

    /// Abandon a session without writing it to history
    pub fn abandon_session(&self, id: Uuid) -> Result<ActiveWorkoutSession> {
        self.mutate(id, |session, _now| {
            require_status(
                session,
                &[
                    SessionStatus::NotStarted,
                    SessionStatus::Active,
                    SessionStatus::Paused,
                ],
                "abandon",
            )?;
            session.session_status = SessionStatus::Abandoned;
            session.pause_time = None;
            session.is_resting = false;
            session.rest_time_remaining = None;
            tracing::info!("Session {} abandoned", id);
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // Logging
    // ------------------------------------------------------------------

    /// Append a performed set to the exercise's strength entry
    ///
    /// Does not cap the number of sets against the plan; the caller decides
    /// when an exercise is done.
    pub fn log_strength_set(
        &self,
        id: Uuid,
        exercise_id: &str,
        set: PerformedSet,
    ) -> Result<ActiveWorkoutSession> {
        validate_performed_set(&set)?;

        self.mutate(id, |session, _now| {
            require_status(session, &[SessionStatus::Active], "log a set for")?;

            let (name, rest) = match session.plan.exercise(exercise_id) {
                Some(ExercisePrescription::Strength { name, sets, .. }) => {
                    let logged = session
                        .workout_log
                        .find_entry(exercise_id, EntryKind::Strength)
                        .map_or(0, |e| e.logged_sets() as usize);
                    (name.clone(), sets.get(logged).and_then(|p| p.rest_seconds))
                }
                Some(ExercisePrescription::Cardio { .. }) => {
                    return Err(Error::Validation(format!(
                        "{} is a cardio exercise; log segments instead",
                        exercise_id
                    )));
                }
                None => (exercise_id.to_string(), None),
            };

            let order_index = session.workout_log.entries.len();
            let entry = find_or_insert(&mut session.workout_log, exercise_id, EntryKind::Strength, || {
                ExerciseEntry::Strength(StrengthEntry {
                    exercise_id: exercise_id.to_string(),
                    exercise_name: name,
                    order_index,
                    sets: Vec::new(),
                    notes: None,
                })
            });
            if let ExerciseEntry::Strength(strength) = entry {
                strength.sets.push(set);
                tracing::debug!(
                    "Session {}: {} set {} logged",
                    id,
                    exercise_id,
                    strength.sets.len()
                );
            }

            if let Some(seconds) = rest {
                session.is_resting = true;
                session.rest_time_remaining = Some(seconds);
            }
            Ok(())
        })
    }

    /// Append a cardio segment and recompute the entry's derived totals
    ///
    /// Segments are numbered by the engine in append order.
    pub fn log_cardio_segment(
        &self,
        id: Uuid,
        exercise_id: &str,
        mut segment: CardioSegment,
    ) -> Result<ActiveWorkoutSession> {
        validate_cardio_segment(&segment)?;

        self.mutate(id, |session, _now| {
            require_status(session, &[SessionStatus::Active], "log a segment for")?;

            let mode = match session.plan.exercise(exercise_id) {
                Some(ExercisePrescription::Cardio { mode, .. }) => mode.clone(),
                Some(ExercisePrescription::Strength { .. }) => {
                    return Err(Error::Validation(format!(
                        "{} is a strength exercise; log sets instead",
                        exercise_id
                    )));
                }
                None => exercise_id.to_string(),
            };

            let order_index = session.workout_log.entries.len();
            let entry = find_or_insert(&mut session.workout_log, exercise_id, EntryKind::Cardio, || {
                ExerciseEntry::Cardio(CardioEntry {
                    exercise_id: exercise_id.to_string(),
                    mode,
                    order_index,
                    total_duration_seconds: 0,
                    segments: Vec::new(),
                    average_heart_rate_bpm: None,
                    max_heart_rate_bpm: None,
                    notes: None,
                })
            });
            if let ExerciseEntry::Cardio(cardio) = entry {
                segment.segment_number = cardio.segments.len() as u32 + 1;
                cardio.segments.push(segment);
                cardio.recompute_totals();
                tracing::debug!(
                    "Session {}: {} segment {} logged ({}s total)",
                    id,
                    exercise_id,
                    cardio.segments.len(),
                    cardio.total_duration_seconds
                );
            }
            Ok(())
        })
    }

    /// Record flexibility work; repeated holds accumulate duration
    pub fn log_flexibility(
        &self,
        id: Uuid,
        exercise_id: &str,
        hold: FlexibilityHold,
    ) -> Result<ActiveWorkoutSession> {
        validate_flexibility(hold.duration_seconds)?;

        self.mutate(id, |session, _now| {
            require_status(session, &[SessionStatus::Active], "log flexibility for")?;

            let order_index = session.workout_log.entries.len();
            let name = hold.exercise_name.clone();
            let entry = find_or_insert(
                &mut session.workout_log,
                exercise_id,
                EntryKind::Flexibility,
                || {
                    ExerciseEntry::Flexibility(FlexibilityEntry {
                        exercise_id: exercise_id.to_string(),
                        exercise_name: name,
                        order_index,
                        duration_seconds: 0,
                        hold_time_seconds: None,
                        reps: None,
                        notes: None,
                    })
                },
            );
            if let ExerciseEntry::Flexibility(flex) = entry {
                flex.duration_seconds += hold.duration_seconds;
                if hold.hold_time_seconds.is_some() {
                    flex.hold_time_seconds = hold.hold_time_seconds;
                }
                if let Some(reps) = hold.reps {
                    flex.reps = Some(flex.reps.unwrap_or(0) + reps);
                }
            }
            Ok(())
        })
    }

    /// Close out the current exercise and advance by exactly one
    pub fn complete_exercise(
        &self,
        id: Uuid,
        notes: Option<String>,
    ) -> Result<ActiveWorkoutSession> {
        let notes = normalize_notes(notes);

        self.mutate(id, |session, _now| {
            require_status(session, &[SessionStatus::Active], "complete an exercise of")?;

            let Some(current) = session.current_exercise() else {
                return Err(Error::InvalidTransition {
                    status: session.session_status,
                    action: "advance past the final exercise of",
                });
            };
            let exercise_id = current.exercise_id().to_string();

            if let Some(notes) = notes {
                match session.workout_log.entry_position(&exercise_id) {
                    Some(pos) => session.workout_log.entries[pos].set_notes(notes),
                    None => tracing::warn!(
                        "Session {}: no entry for {} to attach notes to",
                        id,
                        exercise_id
                    ),
                }
            }

            session.current_exercise_index += 1;
            session.is_resting = false;
            session.rest_time_remaining = None;
            tracing::info!(
                "Session {}: finished {} ({}/{})",
                id,
                exercise_id,
                session.current_exercise_index,
                session.plan.exercises.len()
            );
            Ok(())
        })
    }

    /// Clear the rest timer
    pub fn end_rest(&self, id: Uuid) -> Result<ActiveWorkoutSession> {
        self.mutate(id, |session, _now| {
            require_status(
                session,
                &[SessionStatus::Active, SessionStatus::Paused],
                "end rest for",
            )?;
            session.is_resting = false;
            session.rest_time_remaining = None;
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn get_session(&self, id: Uuid) -> Result<ActiveWorkoutSession> {
        self.sessions.require(id)
    }

    /// All sessions, most recently active first
    pub fn list_sessions(&self) -> Result<Vec<ActiveWorkoutSession>> {
        let mut sessions = self.sessions.all()?;
        sessions.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        Ok(sessions)
    }

    pub fn workouts(&self) -> &Repository<S, WorkoutLog> {
        &self.workouts
    }

    /// Finalized workouts, newest first. With `days`, only those started
    /// within that many days of now.
    pub fn list_workouts(&self, days: Option<i64>) -> Result<Vec<WorkoutLog>> {
        match days {
            Some(days) => load_recent_workouts(&self.workouts, self.clock.now(), days),
            None => load_all_workouts(&self.workouts),
        }
    }

    pub fn get_session_progress(&self, id: Uuid) -> Result<SessionProgress> {
        let session = self.sessions.require(id)?;
        Ok(calculate_session_progress(
            &session,
            &session.plan,
            self.clock.now(),
            self.settings.seconds_per_set,
        ))
    }

    // ------------------------------------------------------------------
    // Maintenance
    // ------------------------------------------------------------------

    /// Delete every session whose last activity predates the cutoff,
    /// whatever its status. Returns how many were removed.
    pub fn cleanup_old_sessions(&self, older_than_days: i64) -> Result<usize> {
        let cutoff = day_window_cutoff(self.clock.now(), older_than_days)?;
        let stale: Vec<Uuid> = self
            .sessions
            .all()?
            .into_iter()
            .filter(|s| s.last_activity < cutoff)
            .map(|s| s.id())
            .collect();

        if stale.is_empty() {
            tracing::debug!("No sessions inactive since {}", cutoff);
            return Ok(0);
        }

        let removed = self.sessions.delete_many(&stale)?;
        self.locks.forget(&stale);
        tracing::info!("Removed {} sessions inactive since {}", removed, cutoff);
        Ok(removed)
    }

    /// [`cleanup_old_sessions`](Self::cleanup_old_sessions) with the
    /// configured staleness window
    pub fn cleanup_stale_sessions(&self) -> Result<usize> {
        self.cleanup_old_sessions(self.settings.stale_after_days)
    }
}

/// Fold an open pause into `pause_duration`, returning its length
fn close_pause(session: &mut ActiveWorkoutSession, now: DateTime<Utc>) -> u64 {
    let paused_for = session
        .pause_time
        .take()
        .map_or(0, |since| (now - since).num_seconds().max(0) as u64);
    session.pause_duration += paused_for;
    paused_for
}

/// The entry for `exercise_id` of `kind`, created with `make` if absent
fn find_or_insert<'a, F>(
    log: &'a mut WorkoutLog,
    exercise_id: &str,
    kind: EntryKind,
    make: F,
) -> &'a mut ExerciseEntry
where
    F: FnOnce() -> ExerciseEntry,
{
    let pos = log
        .entries
        .iter()
        .position(|e| e.kind() == kind && e.exercise_id() == exercise_id);
    let pos = match pos {
        Some(pos) => pos,
        None => {
            log.entries.push(make());
            log.entries.len() - 1
        }
    };
    &mut log.entries[pos]
}
