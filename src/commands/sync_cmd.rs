//! Sync CLI commands for synchronizing with the remote store.

use clap::{Args, Subcommand};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

use fitsync::config::Config;
use fitsync::db::{
    BodyMetricRepository, NutritionLogRepository, SupplementLogRepository, Table,
    UserSettingsRepository, WorkoutLogRepository,
};
use fitsync::identity::{IdentitySource, UserId};
use fitsync::session::Session;
use fitsync::sync::{CycleOutcome, CycleReport, OwnershipMigrator, RestRemote, SyncEngine, SyncScheduler};

/// How often `sync watch` re-reads the session file.
const SESSION_POLL: Duration = Duration::from_secs(5);

/// Sync with the remote store
#[derive(Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    command: Option<SyncSubcommand>,
}

#[derive(Subcommand)]
enum SyncSubcommand {
    /// Show sync configuration and pending records
    Status,
    /// Keep syncing in the background until interrupted
    Watch,
}

impl SyncCommand {
    pub async fn run(
        &self,
        config: &Config,
        pool: &SqlitePool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            None => self.sync(config, pool).await,
            Some(SyncSubcommand::Status) => self.status(config, pool).await,
            Some(SyncSubcommand::Watch) => self.watch(config, pool).await,
        }
    }

    async fn sync(
        &self,
        config: &Config,
        pool: &SqlitePool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let (session, remote) = connect(config)?;

        let engine = SyncEngine::new(
            pool.clone(),
            Arc::new(remote),
            IdentitySource::new(Some(session.user_id.clone())),
            config.sync.pull_limit,
        );

        println!("Syncing as {}...", session.user_id);
        println!();

        match engine.run_cycle(&session.user_id).await {
            CycleOutcome::Completed(report) => print_report(&report),
            CycleOutcome::Skipped => println!("Another sync is already running."),
            CycleOutcome::IdentityChanged(report) => {
                print_report(&report);
                println!("Signed-in user changed, sync stopped early.");
            }
        }
        Ok(())
    }

    async fn status(
        &self,
        config: &Config,
        pool: &SqlitePool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        println!("Sync Configuration");
        println!("==================");
        println!();

        match &config.sync.remote_url {
            Some(url) if config.sync.is_configured() => println!("Remote:    {}", url),
            _ => {
                println!("Status: Not configured");
                println!();
                println!("To enable sync, add to your config file:");
                println!();
                println!("  sync:");
                println!("    remote_url: \"https://your-project.supabase.co\"");
                println!("    api_key: \"...\"");
                println!();
                println!("Or set environment variables:");
                println!("  FITSYNC_REMOTE_URL, FITSYNC_API_KEY");
                return Ok(());
            }
        }
        println!(
            "Auto-sync: {}",
            if config.sync.auto_sync {
                "enabled"
            } else {
                "disabled"
            }
        );
        println!("Interval:  {}s", config.sync.interval().as_secs());
        println!();

        let user = match Session::load(&config.session_path.value)? {
            Some(session) => session.user_id,
            None => {
                println!("Not logged in. Records stay on this device until you log in.");
                return Ok(());
            }
        };

        println!("Pending records for {}:", user);
        let pending = pending_counts(pool, &user).await?;
        for (table, count) in &pending {
            println!("  {:<16} {}", table, count);
        }
        let total: i64 = pending.iter().map(|(_, count)| count).sum();
        if total == 0 {
            println!("\nEverything is synced.");
        }
        Ok(())
    }

    async fn watch(
        &self,
        config: &Config,
        pool: &SqlitePool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let (session, remote) = connect(config)?;
        let remote = Arc::new(remote);

        // Start signed out so the scheduler migrates on the first sign-in
        let identity = IdentitySource::anonymous();
        let engine = Arc::new(SyncEngine::new(
            pool.clone(),
            remote.clone(),
            identity.clone(),
            config.sync.pull_limit,
        ));
        let handle = SyncScheduler::new(
            engine,
            OwnershipMigrator::new(pool.clone()),
            identity.clone(),
            config.sync.interval(),
        )
        .spawn();
        identity.sign_in(session.user_id);

        println!(
            "Syncing every {}s. Press Ctrl-C to stop.",
            config.sync.interval().as_secs()
        );

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut poll = tokio::time::interval(SESSION_POLL);

        loop {
            tokio::select! {
                result = &mut ctrl_c => {
                    result?;
                    break;
                }
                _ = poll.tick() => {
                    match Session::load(&config.session_path.value) {
                        Ok(Some(session)) => {
                            // Token first, so the next cycle for this user is authorized
                            remote.set_access_token(Some(session.access_token)).await;
                            identity.sign_in(session.user_id);
                        }
                        Ok(None) => {
                            identity.sign_out();
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Could not read session");
                        }
                    }
                }
            }
        }

        handle.shutdown();
        println!("Stopped.");
        Ok(())
    }
}

fn connect(config: &Config) -> Result<(Session, RestRemote), Box<dyn std::error::Error>> {
    if !config.sync.is_configured() {
        return Err(
            "Sync not configured. Set sync.remote_url and sync.api_key in config.".into(),
        );
    }

    let session = Session::load(&config.session_path.value)?
        .ok_or("Not logged in. Run `fitsync auth login` first.")?;
    let remote = RestRemote::from_config(&config.sync)?
        .with_access_token(session.access_token.clone());

    Ok((session, remote))
}

async fn pending_counts(
    pool: &SqlitePool,
    user: &UserId,
) -> Result<Vec<(Table, i64)>, Box<dyn std::error::Error>> {
    Ok(vec![
        (
            Table::WorkoutLogs,
            WorkoutLogRepository::new(pool.clone()).pending_count(user).await?,
        ),
        (
            Table::NutritionLogs,
            NutritionLogRepository::new(pool.clone()).pending_count(user).await?,
        ),
        (
            Table::SupplementLogs,
            SupplementLogRepository::new(pool.clone()).pending_count(user).await?,
        ),
        (
            Table::BodyMetrics,
            BodyMetricRepository::new(pool.clone()).pending_count(user).await?,
        ),
        (
            Table::UserSettings,
            UserSettingsRepository::new(pool.clone()).pending_count(user).await?,
        ),
    ])
}

fn print_report(report: &CycleReport) {
    for (table, count) in &report.pushed {
        if *count > 0 {
            println!("  ✓ pushed {} {}", count, table);
        }
    }
    for failure in &report.failures {
        println!("  ✗ {} {} - {}", failure.table, failure.phase, failure.message);
    }

    println!();
    if report.is_clean() {
        println!("Sync complete: {}.", report);
    } else {
        println!("Sync finished with errors: {}.", report);
        println!("Failed tables will be retried on the next sync.");
    }
}
