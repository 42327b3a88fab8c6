mod auth;
mod config_cmd;
mod food;
mod reference;
mod supplement;
mod sync_cmd;
mod targets;
mod weight;
mod workout;

pub use auth::AuthCommand;
pub use config_cmd::ConfigCommand;
pub use food::FoodCommand;
pub use reference::{ExerciseCommand, StapleCommand};
pub use supplement::SupplementCommand;
pub use sync_cmd::SyncCommand;
pub use targets::TargetsCommand;
pub use weight::WeightCommand;
pub use workout::WorkoutCommand;

use chrono::{Local, NaiveDate};
use clap::ValueEnum;
use std::io::{self, Write};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// The given date, or today in local time.
fn day_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
