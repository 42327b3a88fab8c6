use chrono::NaiveDate;
use clap::{Args, Subcommand};

use super::{day_or_today, OutputFormat};
use fitsync::db::BodyMetricRepository;
use fitsync::identity::UserId;

#[derive(Args)]
pub struct WeightCommand {
    #[command(subcommand)]
    pub command: WeightSubcommand,
}

#[derive(Subcommand)]
pub enum WeightSubcommand {
    /// Record body weight for a day (replaces that day's entry)
    Log {
        /// Weight in kg
        weight: f64,

        /// Day (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show recent weigh-ins
    List {
        /// Maximum number of entries
        #[arg(long, short, default_value_t = 14)]
        limit: usize,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl WeightSubcommand {
    /// True for subcommands that change local data.
    pub fn writes(&self) -> bool {
        matches!(self, WeightSubcommand::Log { .. })
    }
}

impl WeightCommand {
    pub async fn run(
        &self,
        repo: &BodyMetricRepository,
        owner: Option<&UserId>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            WeightSubcommand::Log { weight, date } => {
                if *weight <= 0.0 {
                    return Err("Weight must be a positive number".into());
                }

                let entry = repo
                    .record_for_date(day_or_today(*date), *weight, owner)
                    .await?;
                println!("Recorded {}", entry.fields);
                Ok(())
            }

            WeightSubcommand::List { limit, format } => {
                let mut entries = repo.list(owner).await?;
                entries.truncate(*limit);

                if entries.is_empty() {
                    println!("No weigh-ins found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&entries)?);
                    }
                    OutputFormat::Text => {
                        for entry in &entries {
                            println!("  {}", entry.fields);
                        }
                        if let (Some(latest), Some(oldest)) = (entries.first(), entries.last()) {
                            let change = latest.fields.weight - oldest.fields.weight;
                            println!("\nChange: {:+.1} kg", change);
                        }
                    }
                }
                Ok(())
            }
        }
    }
}
