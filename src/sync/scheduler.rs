//! Background sync loop driven by the identity source.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::{OwnershipMigrator, SyncEngine};
use crate::identity::{IdentitySource, UserId};

/// Runs sync cycles on a fixed interval while a user is signed in.
///
/// When an identity first appears (after none), ownerless records are
/// migrated to it before the first cycle. Any identity change cancels the
/// running interval and starts over for the new identity; signing out
/// leaves the scheduler idle.
pub struct SyncScheduler {
    engine: Arc<SyncEngine>,
    migrator: OwnershipMigrator,
    identity: IdentitySource,
    interval: Duration,
}

/// Owns the scheduler task. Dropping the handle stops the scheduler.
pub struct SchedulerHandle {
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn shutdown(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl SyncScheduler {
    pub fn new(
        engine: Arc<SyncEngine>,
        migrator: OwnershipMigrator,
        identity: IdentitySource,
        interval: Duration,
    ) -> Self {
        Self {
            engine,
            migrator,
            identity,
            interval,
        }
    }

    pub fn spawn(self) -> SchedulerHandle {
        SchedulerHandle {
            task: tokio::spawn(self.run()),
        }
    }

    async fn run(self) {
        let mut rx = self.identity.subscribe();
        let mut previous: Option<UserId> = None;

        loop {
            let current = rx.borrow_and_update().clone();
            match current {
                Some(user) => {
                    if previous.is_none() {
                        self.migrate(&user).await;
                    }
                    previous = Some(user.clone());

                    if !self.drive(&user, &mut rx).await {
                        return;
                    }
                }
                None => {
                    if previous.take().is_some() {
                        tracing::info!("Signed out, background sync idle");
                    }
                    if rx.changed().await.is_err() {
                        return;
                    }
                }
            }
        }
    }

    // The migrator logs what it claimed
    async fn migrate(&self, user: &UserId) {
        if let Err(e) = self.migrator.migrate(user).await {
            tracing::error!(user = %user, error = %e, "Ownership migration failed");
        }
    }

    /// Sync `user` now and on every tick until the identity changes.
    ///
    /// Returns false once the identity source is gone.
    async fn drive(&self, user: &UserId, rx: &mut watch::Receiver<Option<UserId>>) -> bool {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(user = %user, every = ?self.interval, "Background sync started");

        loop {
            tokio::select! {
                biased;

                changed = rx.changed() => {
                    return changed.is_ok();
                }

                // First tick completes immediately
                _ = interval.tick() => {
                    self.engine.run_cycle(user).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_db, BodyMetricRepository, Table};
    use crate::sync::MemoryRemote;
    use chrono::NaiveDate;
    use sqlx::SqlitePool;
    use tempfile::TempDir;

    struct TestContext {
        remote: Arc<MemoryRemote>,
        identity: IdentitySource,
        pool: SqlitePool,
        scheduler: Option<SyncScheduler>,
        _temp_dir: TempDir,
    }

    async fn setup(interval: Duration) -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let pool = init_db(&db_path).await.unwrap();
        let remote = Arc::new(MemoryRemote::new());
        let identity = IdentitySource::anonymous();
        let engine = Arc::new(SyncEngine::new(
            pool.clone(),
            remote.clone(),
            identity.clone(),
            50,
        ));
        let scheduler = SyncScheduler::new(
            engine,
            OwnershipMigrator::new(pool.clone()),
            identity.clone(),
            interval,
        );
        TestContext {
            remote,
            identity,
            pool,
            scheduler: Some(scheduler),
            _temp_dir: temp_dir,
        }
    }

    async fn eventually<F: Fn() -> bool>(condition: F) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(tokio::time::Instant::now() < deadline, "condition not met in time");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    #[tokio::test]
    async fn test_sign_in_migrates_then_syncs() {
        let mut ctx = setup(Duration::from_secs(3600)).await;
        let metrics = BodyMetricRepository::new(ctx.pool.clone());
        let record = metrics.record_for_date(day(), 80.0, None).await.unwrap();
        let _handle = ctx.scheduler.take().unwrap().spawn();

        ctx.identity.sign_in(UserId::new("x").unwrap());

        let remote = ctx.remote.clone();
        eventually(move || remote.rows(Table::BodyMetrics).len() == 1).await;
        let rows = ctx.remote.rows(Table::BodyMetrics);
        assert_eq!(rows[0]["user_id"], "x");

        eventually(|| ctx.remote.select_calls() == 5).await;
        let synced = metrics.get(record.id).await.unwrap().unwrap();
        assert!(synced.is_owned_by("x"));
        assert!(synced.synced);
    }

    #[tokio::test]
    async fn test_idle_without_identity() {
        let mut ctx = setup(Duration::from_millis(20)).await;
        let _handle = ctx.scheduler.take().unwrap().spawn();

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(ctx.remote.call_count(), 0);
    }

    #[tokio::test]
    async fn test_ticks_repeat_while_signed_in() {
        let mut ctx = setup(Duration::from_millis(50)).await;
        let _handle = ctx.scheduler.take().unwrap().spawn();

        ctx.identity.sign_in(UserId::new("x").unwrap());

        // Each cycle pulls all five tables
        let remote = ctx.remote.clone();
        eventually(move || remote.select_calls() >= 15).await;
    }

    #[tokio::test]
    async fn test_sign_out_stops_ticks() {
        let mut ctx = setup(Duration::from_millis(50)).await;
        let _handle = ctx.scheduler.take().unwrap().spawn();
        ctx.identity.sign_in(UserId::new("x").unwrap());
        let remote = ctx.remote.clone();
        eventually(move || remote.select_calls() >= 10).await;

        ctx.identity.sign_out();
        // Let an in-flight cycle finish
        tokio::time::sleep(Duration::from_millis(30)).await;
        let calls = ctx.remote.call_count();
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(ctx.remote.call_count(), calls);
    }

    #[tokio::test]
    async fn test_switching_user_restarts_for_new_identity() {
        let mut ctx = setup(Duration::from_millis(50)).await;
        let metrics = BodyMetricRepository::new(ctx.pool.clone());
        let y = UserId::new("y").unwrap();
        metrics.record_for_date(day(), 70.0, Some(&y)).await.unwrap();
        let _handle = ctx.scheduler.take().unwrap().spawn();

        ctx.identity.sign_in(UserId::new("x").unwrap());
        let remote = ctx.remote.clone();
        eventually(move || remote.select_calls() >= 5).await;
        assert!(ctx.remote.rows(Table::BodyMetrics).is_empty());

        ctx.identity.sign_in(y);

        let remote = ctx.remote.clone();
        eventually(move || remote.rows(Table::BodyMetrics).len() == 1).await;
        assert_eq!(ctx.remote.rows(Table::BodyMetrics)[0]["user_id"], "y");
    }

    #[tokio::test]
    async fn test_switching_user_does_not_migrate() {
        let mut ctx = setup(Duration::from_secs(3600)).await;
        let metrics = BodyMetricRepository::new(ctx.pool.clone());
        let _handle = ctx.scheduler.take().unwrap().spawn();

        ctx.identity.sign_in(UserId::new("x").unwrap());
        let remote = ctx.remote.clone();
        eventually(move || remote.select_calls() == 5).await;

        // Logged while x is signed in but without an owner
        let record = metrics.record_for_date(day(), 70.0, None).await.unwrap();

        ctx.identity.sign_in(UserId::new("y").unwrap());
        let remote = ctx.remote.clone();
        eventually(move || remote.select_calls() == 10).await;

        let stored = metrics.get(record.id).await.unwrap().unwrap();
        assert!(stored.user_id.is_none());
        assert!(!stored.synced);
        assert!(ctx.remote.rows(Table::BodyMetrics).is_empty());
    }

    #[tokio::test]
    async fn test_dropping_handle_stops_scheduler() {
        let mut ctx = setup(Duration::from_millis(50)).await;
        let handle = ctx.scheduler.take().unwrap().spawn();
        ctx.identity.sign_in(UserId::new("x").unwrap());
        let remote = ctx.remote.clone();
        eventually(move || remote.select_calls() >= 5).await;

        drop(handle);
        tokio::time::sleep(Duration::from_millis(30)).await;
        let calls = ctx.remote.call_count();
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(ctx.remote.call_count(), calls);
    }

    #[tokio::test]
    async fn test_failing_cycles_keep_scheduler_alive() {
        let mut ctx = setup(Duration::from_millis(50)).await;
        let metrics = BodyMetricRepository::new(ctx.pool.clone());
        let x = UserId::new("x").unwrap();
        let record = metrics.record_for_date(day(), 80.0, Some(&x)).await.unwrap();
        ctx.remote.set_available(false);
        let handle = ctx.scheduler.take().unwrap().spawn();

        ctx.identity.sign_in(x);
        let remote = ctx.remote.clone();
        eventually(move || remote.insert_calls() >= 2).await;
        assert!(!handle.is_finished());
        assert!(!metrics.get(record.id).await.unwrap().unwrap().synced);

        ctx.remote.set_available(true);
        let remote = ctx.remote.clone();
        eventually(move || remote.rows(Table::BodyMetrics).len() == 1).await;
    }
}
