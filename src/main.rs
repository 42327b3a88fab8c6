use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{
    AuthCommand, ConfigCommand, ExerciseCommand, FoodCommand, StapleCommand, SupplementCommand,
    SyncCommand, TargetsCommand, WeightCommand, WorkoutCommand,
};
use fitsync::config::Config;
use fitsync::db::{
    init_db, BodyMetricRepository, NutritionLogRepository, ReferenceRepository,
    SupplementLogRepository, UserSettingsRepository, WorkoutLogRepository,
};
use fitsync::session::Session;
use fitsync::sync::try_auto_sync;

#[derive(Parser)]
#[command(name = "fitsync")]
#[command(version)]
#[command(about = "A local-first fitness tracking CLI with background sync", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log and review workout sets
    Workout(WorkoutCommand),

    /// Log and review food
    Food(FoodCommand),

    /// Track supplements
    Supplement(SupplementCommand),

    /// Track body weight
    Weight(WeightCommand),

    /// Daily calorie and protein targets
    Targets(TargetsCommand),

    /// Browse and add exercises
    Exercise(ExerciseCommand),

    /// Browse staple foods
    Staple(StapleCommand),

    /// Sign in to the remote store
    Auth(AuthCommand),

    /// Sync with the remote store
    Sync(SyncCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fitsync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    let command = match cli.command {
        Some(Commands::Config(cmd)) => return cmd.run(&config),
        Some(command) => command,
        None => {
            println!("Use --help to see available commands");
            return Ok(());
        }
    };

    let pool = init_db(&config.database_path.value).await?;
    let owner = Session::load(&config.session_path.value)?.map(|session| session.user_id);
    let owner = owner.as_ref();

    match &command {
        Commands::Workout(cmd) => {
            let repo = WorkoutLogRepository::new(pool.clone());
            let reference = ReferenceRepository::new(pool.clone());
            cmd.run(&repo, &reference, owner).await?;
        }
        Commands::Food(cmd) => {
            let repo = NutritionLogRepository::new(pool.clone());
            let reference = ReferenceRepository::new(pool.clone());
            let settings = UserSettingsRepository::new(pool.clone());
            cmd.run(&repo, &reference, &settings, owner).await?;
        }
        Commands::Supplement(cmd) => {
            let repo = SupplementLogRepository::new(pool.clone());
            cmd.run(&repo, owner).await?;
        }
        Commands::Weight(cmd) => {
            let repo = BodyMetricRepository::new(pool.clone());
            cmd.run(&repo, owner).await?;
        }
        Commands::Targets(cmd) => {
            let repo = UserSettingsRepository::new(pool.clone());
            cmd.run(&repo, owner).await?;
        }
        Commands::Exercise(cmd) => {
            let repo = ReferenceRepository::new(pool.clone());
            cmd.run(&repo, owner).await?;
        }
        Commands::Staple(cmd) => {
            let repo = ReferenceRepository::new(pool.clone());
            cmd.run(&repo).await?;
        }
        Commands::Auth(cmd) => {
            cmd.run(&config, &pool).await?;
        }
        Commands::Sync(cmd) => {
            cmd.run(&config, &pool).await?;
        }
        Commands::Config(cmd) => {
            cmd.run(&config)?;
        }
    }

    // Auto-sync AFTER write commands (only if command succeeded)
    if is_write_command(&command) {
        try_auto_sync(&config, &pool).await;
    }

    Ok(())
}

/// Returns true if the command changes synced data and should sync after execution.
fn is_write_command(cmd: &Commands) -> bool {
    match cmd {
        Commands::Workout(c) => c.command.writes(),
        Commands::Food(c) => c.command.writes(),
        Commands::Supplement(c) => c.command.writes(),
        Commands::Weight(c) => c.command.writes(),
        Commands::Targets(c) => c.command.writes(),
        _ => false,
    }
}
