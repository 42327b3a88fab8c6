use clap::{Args, Subcommand};
use uuid::Uuid;

use super::{confirm, OutputFormat};
use fitsync::db::{ReferenceRepository, WorkoutLogRepository};
use fitsync::identity::UserId;
use fitsync::models::{Exercise, WorkoutLog};

#[derive(Args)]
pub struct WorkoutCommand {
    #[command(subcommand)]
    pub command: WorkoutSubcommand,
}

#[derive(Subcommand)]
pub enum WorkoutSubcommand {
    /// Log a set
    Add {
        /// Exercise ID or name
        exercise: String,

        /// Weight in kg
        #[arg(long, default_value_t = 0.0)]
        weight: f64,

        /// Repetitions
        #[arg(long, default_value_t = 0)]
        reps: i32,

        /// Workout session to add the set to (a new session if omitted)
        #[arg(long)]
        session: Option<Uuid>,

        /// Distance in km
        #[arg(long)]
        distance: Option<f64>,

        /// Duration in minutes
        #[arg(long)]
        duration: Option<f64>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Change a logged set
    Edit {
        /// Set ID
        id: i64,

        /// New weight in kg
        #[arg(long)]
        weight: Option<f64>,

        /// New repetitions
        #[arg(long)]
        reps: Option<i32>,

        /// New notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a logged set
    Delete {
        /// Set ID
        id: i64,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// List recent sets
    List {
        /// Only sets of this exercise (ID or name)
        #[arg(long)]
        exercise: Option<String>,

        /// Maximum number of sets
        #[arg(long, short, default_value_t = 20)]
        limit: usize,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show every set of one workout session
    Session {
        /// Session ID
        id: Uuid,
    },
}

impl WorkoutSubcommand {
    /// True for subcommands that change local data.
    pub fn writes(&self) -> bool {
        matches!(
            self,
            WorkoutSubcommand::Add { .. }
                | WorkoutSubcommand::Edit { .. }
                | WorkoutSubcommand::Delete { .. }
        )
    }
}

impl WorkoutCommand {
    pub async fn run(
        &self,
        repo: &WorkoutLogRepository,
        reference: &ReferenceRepository,
        owner: Option<&UserId>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            WorkoutSubcommand::Add {
                exercise,
                weight,
                reps,
                session,
                distance,
                duration,
                notes,
            } => {
                if *weight < 0.0 || *reps < 0 {
                    return Err("Weight and reps cannot be negative".into());
                }

                let exercise = find_exercise(reference, exercise).await?;
                let session = session.unwrap_or_else(Uuid::new_v4);
                let set_number = repo.next_set_number(session, exercise.id).await?;

                let mut log = WorkoutLog::new(session, exercise.id, set_number, *weight, *reps);
                if let Some(distance) = distance {
                    log = log.with_distance(*distance);
                }
                if let Some(duration) = duration {
                    log = log.with_duration(*duration);
                }
                if let Some(notes) = notes {
                    log = log.with_notes(notes);
                }

                let created = repo.create(&log, owner).await?;
                println!("Logged {} (#{}):", exercise.name, created.id);
                println!("  {}", created.fields);
                println!("Session: {}", session);
                Ok(())
            }

            WorkoutSubcommand::Edit {
                id,
                weight,
                reps,
                notes,
            } => {
                if weight.is_none() && reps.is_none() && notes.is_none() {
                    return Err("Nothing to update. Provide at least one option.".into());
                }

                let updated = repo
                    .modify(*id, |set| {
                        if let Some(weight) = weight {
                            set.weight = *weight;
                        }
                        if let Some(reps) = reps {
                            set.reps = *reps;
                        }
                        if let Some(notes) = notes {
                            set.notes = Some(notes.clone());
                        }
                    })
                    .await?;
                println!("Updated set #{}:", updated.id);
                println!("  {}", updated.fields);
                Ok(())
            }

            WorkoutSubcommand::Delete { id, force } => {
                let set = repo
                    .get(*id)
                    .await?
                    .ok_or_else(|| format!("Set not found: {}", id))?;

                if !force && !confirm(&format!("Delete '{}'?", set.fields))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                repo.delete(set.id).await?;
                println!("Deleted set #{}", set.id);
                Ok(())
            }

            WorkoutSubcommand::List {
                exercise,
                limit,
                format,
            } => {
                let sets = match exercise {
                    Some(exercise) => {
                        let exercise = find_exercise(reference, exercise).await?;
                        repo.recent_for_exercise(exercise.id, owner, *limit).await?
                    }
                    None => {
                        let mut sets = repo.list(owner).await?;
                        sets.truncate(*limit);
                        sets
                    }
                };

                if sets.is_empty() {
                    println!("No sets found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&sets)?);
                    }
                    OutputFormat::Text => {
                        println!("{:>5}  {:<16}  {:<4}  SET", "ID", "WHEN", "SYNC");
                        println!("{}", "-".repeat(60));
                        for set in &sets {
                            let when = set.fields.timestamp.format("%Y-%m-%d %H:%M");
                            let sync = if set.synced { "yes" } else { "no" };
                            println!("{:>5}  {:<16}  {:<4}  {}", set.id, when, sync, set.fields);
                        }
                        println!("\nTotal: {} set(s)", sets.len());
                    }
                }
                Ok(())
            }

            WorkoutSubcommand::Session { id } => {
                let sets = repo.list_session(*id).await?;
                if sets.is_empty() {
                    return Err(format!("Session not found: {}", id).into());
                }

                let mut volume = 0.0;
                for set in &sets {
                    let name = match reference.get_exercise(set.fields.exercise_id).await? {
                        Some(exercise) => exercise.name,
                        None => format!("exercise {}", set.fields.exercise_id),
                    };
                    println!("{:<24}  {}", name, set.fields);
                    volume += set.fields.volume();
                }
                println!("\nVolume: {} kg", volume);
                Ok(())
            }
        }
    }
}

async fn find_exercise(
    reference: &ReferenceRepository,
    identifier: &str,
) -> Result<Exercise, Box<dyn std::error::Error>> {
    // Try to parse as ID first, then fall back to name lookup
    let exercise = if let Ok(id) = identifier.parse::<i64>() {
        reference.get_exercise(id).await?
    } else {
        reference.find_exercise(identifier).await?
    };

    exercise.ok_or_else(|| format!("Exercise not found: {}", identifier).into())
}
