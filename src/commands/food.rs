use chrono::NaiveDate;
use clap::{Args, Subcommand};

use super::{confirm, day_or_today, OutputFormat};
use fitsync::db::{NutritionLogRepository, ReferenceRepository, UserSettingsRepository};
use fitsync::identity::UserId;
use fitsync::models::{NutritionLog, UserSettings};

#[derive(Args)]
pub struct FoodCommand {
    #[command(subcommand)]
    pub command: FoodSubcommand,
}

#[derive(Subcommand)]
pub enum FoodSubcommand {
    /// Log something eaten
    Add {
        /// Food name (a staple food when calories are omitted)
        name: String,

        /// Amount in the staple's unit (grams, oz, units or scoops)
        #[arg(long)]
        amount: Option<f64>,

        /// Calories (kcal)
        #[arg(long)]
        calories: Option<f64>,

        /// Protein in grams
        #[arg(long)]
        protein: Option<f64>,

        /// Day eaten (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Delete a food entry
    Delete {
        /// Entry ID
        id: i64,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Show a day's food log against the targets
    List {
        /// Day to show (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl FoodSubcommand {
    /// True for subcommands that change local data.
    pub fn writes(&self) -> bool {
        matches!(self, FoodSubcommand::Add { .. } | FoodSubcommand::Delete { .. })
    }
}

impl FoodCommand {
    pub async fn run(
        &self,
        repo: &NutritionLogRepository,
        reference: &ReferenceRepository,
        settings: &UserSettingsRepository,
        owner: Option<&UserId>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            FoodSubcommand::Add {
                name,
                amount,
                calories,
                protein,
                date,
            } => {
                if name.trim().is_empty() {
                    return Err("Food name cannot be empty".into());
                }
                let date = day_or_today(*date);

                let entry = match calories {
                    Some(calories) => {
                        let mut entry =
                            NutritionLog::new(date, name.trim(), *calories, protein.unwrap_or(0.0));
                        if let Some(amount) = amount {
                            entry = entry.with_quantity(amount.to_string());
                        }
                        entry
                    }
                    None => {
                        let staple = reference.find_staple(name).await?.ok_or_else(|| {
                            format!("Unknown food '{}'. Pass --calories to log it manually.", name)
                        })?;
                        let amount = amount.unwrap_or(1.0);
                        let (calories, protein) = staple.portion(amount);
                        NutritionLog::new(date, &staple.name, calories.round(), protein.round())
                            .with_quantity(format!("{} {}", amount, staple.unit))
                    }
                };

                let created = repo.create(&entry, owner).await?;
                println!("Logged food (#{}):", created.id);
                println!("  {}", created.fields);
                Ok(())
            }

            FoodSubcommand::Delete { id, force } => {
                let entry = repo
                    .get(*id)
                    .await?
                    .ok_or_else(|| format!("Food entry not found: {}", id))?;

                if !force && !confirm(&format!("Delete '{}'?", entry.fields.item_name))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                repo.delete(entry.id).await?;
                println!("Deleted food entry: {}", entry.fields.item_name);
                Ok(())
            }

            FoodSubcommand::List { date, format } => {
                let date = day_or_today(*date);
                let entries = repo.list_for_date(date, owner).await?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&entries)?);
                    }
                    OutputFormat::Text => {
                        println!("Food log for {}", date);
                        println!("{}", "-".repeat(60));
                        if entries.is_empty() {
                            println!("Nothing logged");
                        }
                        for entry in &entries {
                            println!("{:>5}  {}", entry.id, entry.fields);
                        }

                        let (calories, protein) = repo.daily_totals(date, owner).await?;
                        let targets = settings
                            .current(owner)
                            .await?
                            .map(|record| record.fields)
                            .unwrap_or_default();
                        print_progress(calories, protein, &targets);
                    }
                }
                Ok(())
            }
        }
    }
}

fn print_progress(calories: f64, protein: f64, targets: &UserSettings) {
    println!();
    println!(
        "Calories: {:.0} / {:.0} kcal",
        calories, targets.calorie_target
    );
    println!("Protein:  {:.0} / {:.0} g", protein, targets.protein_target);
}
