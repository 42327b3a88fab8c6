use chrono::NaiveDate;
use clap::{Args, Subcommand};

use super::day_or_today;
use fitsync::db::SupplementLogRepository;
use fitsync::identity::UserId;

#[derive(Args)]
pub struct SupplementCommand {
    #[command(subcommand)]
    pub command: SupplementSubcommand,
}

#[derive(Subcommand)]
pub enum SupplementSubcommand {
    /// Mark a supplement as taken, or unmark it if already taken
    Toggle {
        /// Supplement name
        name: String,

        /// Slot in the daily schedule
        #[arg(long, default_value = "morning")]
        group: String,

        /// Day (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show the supplements taken on a day
    List {
        /// Day (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

impl SupplementSubcommand {
    /// True for subcommands that change local data.
    pub fn writes(&self) -> bool {
        matches!(self, SupplementSubcommand::Toggle { .. })
    }
}

impl SupplementCommand {
    pub async fn run(
        &self,
        repo: &SupplementLogRepository,
        owner: Option<&UserId>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            SupplementSubcommand::Toggle { name, group, date } => {
                if name.trim().is_empty() {
                    return Err("Supplement name cannot be empty".into());
                }
                let date = day_or_today(*date);

                match repo.toggle(date, name.trim(), group, owner).await? {
                    Some(entry) => println!("Taken: {}", entry.fields),
                    None => println!("Unmarked: {} ({})", name.trim(), group),
                }
                Ok(())
            }

            SupplementSubcommand::List { date } => {
                let date = day_or_today(*date);
                let entries = repo.list_for_date(date, owner).await?;

                if entries.is_empty() {
                    println!("No supplements logged for {}", date);
                    return Ok(());
                }

                println!("Supplements for {}", date);
                for entry in &entries {
                    println!("  {}", entry.fields);
                }
                Ok(())
            }
        }
    }
}
