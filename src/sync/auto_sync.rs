//! Auto-sync functionality for CLI commands.
//!
//! Runs one sync cycle after write operations when `auto_sync` is enabled in
//! the configuration.

use sqlx::SqlitePool;
use std::sync::Arc;

use super::{CycleOutcome, RestRemote, SyncEngine};
use crate::config::Config;
use crate::identity::IdentitySource;
use crate::session::Session;

/// Performs a best-effort sync cycle if enabled and signed in.
///
/// Nothing here fails the calling command: the CLI keeps working offline,
/// and problems are reported as a single line on stderr.
pub async fn try_auto_sync(config: &Config, pool: &SqlitePool) {
    if !config.sync.auto_sync || !config.sync.is_configured() {
        return;
    }

    let session = match Session::load(&config.session_path.value) {
        Ok(Some(session)) => session,
        // Not signed in - skip silently
        Ok(None) => return,
        Err(e) => {
            eprintln!("Auto-sync: {}", e);
            return;
        }
    };

    let remote = match RestRemote::from_config(&config.sync) {
        Ok(remote) => remote.with_access_token(session.access_token.clone()),
        Err(_) => return,
    };

    let engine = SyncEngine::new(
        pool.clone(),
        Arc::new(remote),
        IdentitySource::new(Some(session.user_id.clone())),
        config.sync.pull_limit,
    );

    if let CycleOutcome::Completed(report) = engine.run_cycle(&session.user_id).await {
        if let Some(failure) = report.failures.first() {
            eprintln!(
                "Auto-sync: {} {} failed ({}), will retry on next sync",
                failure.table, failure.phase, failure.message
            );
        }
    }
}
