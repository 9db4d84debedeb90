use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;
use workout_core::*;

#[derive(Parser)]
#[command(name = "workout")]
#[command(about = "Workout session logger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a session from a plan file
    Start {
        /// Path to a TOML plan
        plan: PathBuf,
    },

    /// Begin executing a created session
    Begin { session: Uuid },

    /// Log a strength set
    LogSet {
        session: Uuid,
        exercise: String,

        #[arg(long)]
        reps: u32,

        #[arg(long)]
        weight: Option<f64>,

        #[arg(long, default_value = "lb")]
        unit: WeightUnit,

        /// easy, moderate, hard or failure
        #[arg(long, default_value = "moderate")]
        effort: PerceivedEffort,

        #[arg(long)]
        rpe: Option<u8>,

        /// Rest taken before this set, in seconds
        #[arg(long)]
        rest: Option<u32>,

        #[arg(long)]
        pain_back: Option<u8>,

        #[arg(long)]
        pain_knee: Option<u8>,

        #[arg(long)]
        pain_shoulder: Option<u8>,

        #[arg(long)]
        pain_other: Option<u8>,
    },

    /// Log a cardio segment
    LogSegment {
        session: Uuid,
        exercise: String,

        #[arg(long, default_value = "segment")]
        label: String,

        /// Segment length in seconds
        #[arg(long)]
        duration: u32,

        #[arg(long)]
        distance: Option<f64>,

        #[arg(long, default_value = "km")]
        distance_unit: DistanceUnit,

        #[arg(long)]
        speed: Option<f64>,

        #[arg(long)]
        incline: Option<f64>,

        #[arg(long)]
        resistance: Option<f64>,

        #[arg(long)]
        avg_hr: Option<u16>,

        #[arg(long)]
        max_hr: Option<u16>,
    },

    /// Log flexibility work
    LogFlex {
        session: Uuid,
        exercise: String,

        #[arg(long)]
        name: Option<String>,

        /// Total time in seconds
        #[arg(long)]
        duration: u32,

        #[arg(long)]
        hold: Option<u32>,

        #[arg(long)]
        reps: Option<u32>,
    },

    /// Finish the current exercise and move to the next
    Next {
        session: Uuid,

        #[arg(long)]
        notes: Option<String>,
    },

    Pause { session: Uuid },

    Resume { session: Uuid },

    /// Stop the rest timer
    RestDone { session: Uuid },

    /// Finish the session and write it to history
    Complete {
        session: Uuid,

        #[arg(long)]
        notes: Option<String>,

        /// Overall rating, 1-5
        #[arg(long)]
        rating: Option<u8>,
    },

    /// Give up on a session without recording it
    Abandon { session: Uuid },

    /// Show progress for a session
    Progress { session: Uuid },

    /// List sessions
    List,

    /// Summarize workout history
    Summary {
        /// Only include workouts from the last N days
        #[arg(long)]
        days: Option<i64>,
    },

    /// Export workout history to CSV
    Export {
        path: PathBuf,

        #[arg(long)]
        days: Option<i64>,
    },

    /// Delete sessions with no activity in the last N days
    Cleanup {
        /// Defaults to the configured staleness window
        #[arg(long)]
        days: Option<i64>,
    },
}

type Engine = SessionEngine<JsonDirStore>;

fn main() -> Result<()> {
    // Initialize logging
    workout_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);

    let store = Arc::new(JsonDirStore::open(data_dir.join("store"))?);
    let engine = SessionEngine::new(store).with_settings(config.session.clone());

    match cli.command {
        Commands::Start { plan } => cmd_start(&engine, plan),
        Commands::Begin { session } => {
            let s = engine.start_execution(session)?;
            println!("✓ Session started");
            print_position(&s);
            Ok(())
        }
        Commands::LogSet {
            session,
            exercise,
            reps,
            weight,
            unit,
            effort,
            rpe,
            rest,
            pain_back,
            pain_knee,
            pain_shoulder,
            pain_other,
        } => {
            let set = PerformedSet {
                reps,
                weight: weight.map(|value| Weight { value, unit }),
                rest_seconds: rest,
                perceived_effort: effort,
                rpe,
                pain: PainScores {
                    back: pain_back,
                    knee: pain_knee,
                    shoulder: pain_shoulder,
                    other: pain_other,
                },
            };
            let s = engine.log_strength_set(session, &exercise, set)?;
            let logged = s
                .workout_log
                .find_entry(&exercise, EntryKind::Strength)
                .map_or(0, |e| e.logged_sets());
            println!("✓ Set {} logged for {}", logged, exercise);
            if let Some(rest) = s.rest_time_remaining.filter(|_| s.is_resting) {
                println!("  Rest {}s", rest);
            }
            Ok(())
        }
        Commands::LogSegment {
            session,
            exercise,
            label,
            duration,
            distance,
            distance_unit,
            speed,
            incline,
            resistance,
            avg_hr,
            max_hr,
        } => {
            let segment = CardioSegment {
                segment_number: 0,
                label,
                duration_seconds: duration,
                distance: distance.map(|value| Distance {
                    value,
                    unit: distance_unit,
                }),
                speed,
                incline,
                resistance,
                average_heart_rate_bpm: avg_hr,
                max_heart_rate_bpm: max_hr,
            };
            let s = engine.log_cardio_segment(session, &exercise, segment)?;
            if let Some(ExerciseEntry::Cardio(entry)) =
                s.workout_log.find_entry(&exercise, EntryKind::Cardio)
            {
                println!(
                    "✓ Segment {} logged for {} ({}s total)",
                    entry.segments.len(),
                    exercise,
                    entry.total_duration_seconds
                );
            }
            Ok(())
        }
        Commands::LogFlex {
            session,
            exercise,
            name,
            duration,
            hold,
            reps,
        } => {
            let hold = FlexibilityHold {
                exercise_name: name.unwrap_or_else(|| exercise.clone()),
                duration_seconds: duration,
                hold_time_seconds: hold,
                reps,
            };
            engine.log_flexibility(session, &exercise, hold)?;
            println!("✓ Flexibility logged for {}", exercise);
            Ok(())
        }
        Commands::Next { session, notes } => {
            let s = engine.complete_exercise(session, notes)?;
            println!("✓ Exercise complete");
            print_position(&s);
            Ok(())
        }
        Commands::Pause { session } => {
            engine.pause_session(session)?;
            println!("⏸ Session paused");
            Ok(())
        }
        Commands::Resume { session } => {
            let s = engine.resume_session(session)?;
            println!("▶ Session resumed (paused {}s in total)", s.pause_duration);
            Ok(())
        }
        Commands::RestDone { session } => {
            engine.end_rest(session)?;
            println!("✓ Rest finished");
            Ok(())
        }
        Commands::Complete {
            session,
            notes,
            rating,
        } => {
            let s = engine.complete_session(session, notes, rating)?;
            let stats = calculate_workout_stats(&s.workout_log, config.units.weight);
            println!("✓ Workout saved to history");
            print_stats(&stats);
            Ok(())
        }
        Commands::Abandon { session } => {
            engine.abandon_session(session)?;
            println!("✗ Session abandoned");
            Ok(())
        }
        Commands::Progress { session } => cmd_progress(&engine, session),
        Commands::List => cmd_list(&engine),
        Commands::Summary { days } => cmd_summary(&engine, days, &config),
        Commands::Export { path, days } => {
            let workouts = engine.list_workouts(days)?;
            let rows = export_workouts_csv(&workouts, &path)?;
            println!(
                "✓ Exported {} rows from {} workouts to {}",
                rows,
                workouts.len(),
                path.display()
            );
            Ok(())
        }
        Commands::Cleanup { days } => {
            let removed = match days {
                Some(days) => engine.cleanup_old_sessions(days)?,
                None => engine.cleanup_stale_sessions()?,
            };
            println!("✓ Removed {} stale sessions", removed);
            Ok(())
        }
    }
}

fn cmd_start(engine: &Engine, plan_path: PathBuf) -> Result<()> {
    let plan = SessionPlan::load_from(&plan_path)?;
    let session = engine.start_workout_session(plan)?;

    println!("✓ Created session {}", session.id());
    println!(
        "  {}: {} exercises, {} sets",
        session.plan.name,
        session.plan.exercises.len(),
        session.plan.total_sets()
    );
    Ok(())
}

fn cmd_progress(engine: &Engine, id: Uuid) -> Result<()> {
    let session = engine.get_session(id)?;
    let progress = engine.get_session_progress(id)?;

    println!("Session {} ({})", id, session.session_status);
    println!(
        "  Exercises: {}/{}",
        progress.exercises_completed, progress.total_exercises
    );
    println!(
        "  Sets: {}/{} ({:.0}%)",
        progress.sets_completed, progress.total_sets, progress.completion_percentage
    );
    println!("  Elapsed: {}", format_seconds(progress.elapsed_seconds));
    println!(
        "  Remaining: ~{}",
        format_seconds(progress.estimated_time_remaining_seconds)
    );
    Ok(())
}

fn cmd_list(engine: &Engine) -> Result<()> {
    let sessions = engine.list_sessions()?;
    if sessions.is_empty() {
        println!("No sessions.");
        return Ok(());
    }

    for s in sessions {
        println!(
            "{}  {:<11}  {}  {}/{}  last active {}",
            s.id(),
            s.session_status.to_string(),
            s.plan.name,
            s.current_exercise_index,
            s.plan.exercises.len(),
            s.last_activity.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

fn cmd_summary(engine: &Engine, days: Option<i64>, config: &Config) -> Result<()> {
    let workouts = engine.list_workouts(days)?;
    if workouts.is_empty() {
        println!("No workouts recorded yet.");
        return Ok(());
    }

    let unit = config.units.weight;
    let summary = generate_workout_summary(&workouts, unit, config.summary.top_exercises);

    println!("Workouts: {}", summary.total_workouts);
    println!("Time: {}", format_seconds(summary.total_duration_seconds));
    println!("Exercises: {}", summary.unique_exercises());
    println!("Volume: {:.1} {}", summary.total_volume, unit_label(unit));
    if summary.total_distance_km > 0.0 {
        println!("Distance: {:.2} km", summary.total_distance_km);
    }
    if let Some(rating) = summary.average_rating {
        println!("Average rating: {:.1}", rating);
    }

    if !summary.most_frequent_exercises.is_empty() {
        println!("Most frequent:");
        for f in &summary.most_frequent_exercises {
            println!("  {} ({})", f.exercise_id, f.count);
        }
    }

    let trend = volume_trend(&workouts, unit);
    if trend.len() > 1 {
        println!("Weekly volume:");
        for point in trend {
            println!(
                "  {}  {} workouts  {:.1} {}",
                point.week_start,
                point.workouts,
                point.volume,
                unit_label(unit)
            );
        }
    }
    Ok(())
}

fn print_position(session: &ActiveWorkoutSession) {
    match session.current_exercise() {
        Some(exercise) => println!(
            "  Next: {} ({}/{})",
            exercise.exercise_id(),
            session.current_exercise_index + 1,
            session.plan.exercises.len()
        ),
        None => println!("  All exercises done; run `complete` to save the workout"),
    }
}

fn print_stats(stats: &WorkoutStats) {
    println!(
        "  Volume: {:.1} {}",
        stats.total_volume,
        unit_label(stats.volume_unit)
    );
    println!("  Sets: {}  Reps: {}", stats.total_sets, stats.total_reps);
    if let Some(rpe) = stats.average_rpe {
        println!("  Average RPE: {:.1}", rpe);
    }
    if let Some(duration) = stats.duration_seconds {
        println!("  Duration: {}", format_seconds(duration));
    }
}

fn unit_label(unit: WeightUnit) -> &'static str {
    match unit {
        WeightUnit::Lb => "lb",
        WeightUnit::Kg => "kg",
    }
}

fn format_seconds(total: u64) -> String {
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}h {:02}m", h, m)
    } else {
        format!("{}m {:02}s", m, s)
    }
}
