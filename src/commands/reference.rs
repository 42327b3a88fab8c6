use clap::{Args, Subcommand};

use super::OutputFormat;
use fitsync::db::ReferenceRepository;
use fitsync::identity::UserId;
use fitsync::models::MuscleGroup;

#[derive(Args)]
pub struct ExerciseCommand {
    #[command(subcommand)]
    pub command: ExerciseSubcommand,
}

#[derive(Subcommand)]
pub enum ExerciseSubcommand {
    /// List exercises
    List {
        /// Filter by muscle group (push, pull, legs, core, run)
        #[arg(long)]
        group: Option<MuscleGroup>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a custom exercise
    Add {
        /// Exercise name
        name: String,

        /// Muscle group (push, pull, legs, core, run)
        #[arg(long)]
        group: MuscleGroup,
    },
}

impl ExerciseCommand {
    pub async fn run(
        &self,
        repo: &ReferenceRepository,
        owner: Option<&UserId>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ExerciseSubcommand::List { group, format } => {
                let exercises = repo.list_exercises(*group).await?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&exercises)?);
                    }
                    OutputFormat::Text => {
                        for exercise in &exercises {
                            println!("{}", exercise);
                        }
                        println!("\nTotal: {} exercise(s)", exercises.len());
                    }
                }
                Ok(())
            }

            ExerciseSubcommand::Add { name, group } => {
                if name.trim().is_empty() {
                    return Err("Exercise name cannot be empty".into());
                }
                if repo.find_exercise(name.trim()).await?.is_some() {
                    return Err(format!("Exercise already exists: {}", name.trim()).into());
                }

                let exercise = repo.add_custom_exercise(name.trim(), *group, owner).await?;
                println!("Added exercise:");
                println!("{}", exercise);
                Ok(())
            }
        }
    }
}

#[derive(Args)]
pub struct StapleCommand {
    #[command(subcommand)]
    pub command: StapleSubcommand,
}

#[derive(Subcommand)]
pub enum StapleSubcommand {
    /// List staple foods
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show one staple food
    Show {
        /// Food name
        name: String,
    },
}

impl StapleCommand {
    pub async fn run(&self, repo: &ReferenceRepository) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            StapleSubcommand::List { format } => {
                let staples = repo.list_staples().await?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&staples)?);
                    }
                    OutputFormat::Text => {
                        for staple in &staples {
                            println!("  {}", staple);
                        }
                        println!("\nTotal: {} food(s)", staples.len());
                    }
                }
                Ok(())
            }

            StapleSubcommand::Show { name } => match repo.find_staple(name).await? {
                Some(staple) => {
                    println!("{}", staple);
                    Ok(())
                }
                None => Err(format!("Staple food not found: {}", name).into()),
            },
        }
    }
}
