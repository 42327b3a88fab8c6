use clap::{Args, Subcommand};

use fitsync::db::UserSettingsRepository;
use fitsync::identity::UserId;

#[derive(Args)]
pub struct TargetsCommand {
    #[command(subcommand)]
    pub command: TargetsSubcommand,
}

#[derive(Subcommand)]
pub enum TargetsSubcommand {
    /// Set daily calorie and protein targets
    Set {
        /// Calories (kcal)
        #[arg(long)]
        calories: f64,

        /// Protein in grams
        #[arg(long)]
        protein: f64,
    },

    /// Show the daily targets
    Show,
}

impl TargetsSubcommand {
    /// True for subcommands that change local data.
    pub fn writes(&self) -> bool {
        matches!(self, TargetsSubcommand::Set { .. })
    }
}

impl TargetsCommand {
    pub async fn run(
        &self,
        repo: &UserSettingsRepository,
        owner: Option<&UserId>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            TargetsSubcommand::Set { calories, protein } => {
                if *calories <= 0.0 || *protein < 0.0 {
                    return Err("Targets must be positive".into());
                }

                let settings = repo.set_targets(owner, *calories, *protein).await?;
                println!("Daily targets:");
                println!("{}", settings.fields);
                Ok(())
            }

            TargetsSubcommand::Show => {
                match repo.current(owner).await? {
                    Some(settings) => println!("{}", settings.fields),
                    None => {
                        println!("No targets set, using defaults:");
                        println!("{}", fitsync::models::UserSettings::default());
                    }
                }
                Ok(())
            }
        }
    }
}
