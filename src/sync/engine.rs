//! Push/pull reconciliation between the local store and the remote store.

use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

use super::wire::{self, WireRow};
use super::{RemoteStore, SyncError};
use crate::db::{Repository, Syncable, Table};
use crate::identity::{IdentitySource, UserId};
use crate::models::{BodyMetric, NutritionLog, SupplementLog, UserSettings, WorkoutLog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Push,
    Pull,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Push => write!(f, "push"),
            Phase::Pull => write!(f, "pull"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableFailure {
    pub table: Table,
    pub phase: Phase,
    pub message: String,
}

/// What one sync cycle did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// Records sent per table.
    pub pushed: BTreeMap<&'static str, usize>,
    /// Pushed records marked as synced.
    pub acknowledged: u64,
    pub pulled_inserted: u64,
    pub pulled_skipped: u64,
    pub failures: Vec<TableFailure>,
}

impl CycleReport {
    pub fn total_pushed(&self) -> usize {
        self.pushed.values().sum()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pushed {} ({} acknowledged), pulled {} new ({} skipped)",
            self.total_pushed(),
            self.acknowledged,
            self.pulled_inserted,
            self.pulled_skipped
        )?;
        if !self.failures.is_empty() {
            write!(f, ", {} failed", self.failures.len())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// Another cycle was already running; nothing was done.
    Skipped,
    /// The identity changed mid-cycle; work done so far is in the report.
    IdentityChanged(CycleReport),
}

impl CycleOutcome {
    pub fn report(&self) -> Option<&CycleReport> {
        match self {
            CycleOutcome::Completed(report) | CycleOutcome::IdentityChanged(report) => Some(report),
            CycleOutcome::Skipped => None,
        }
    }
}

// Result of a push or pull step for one table.
enum Step<T> {
    Applied(T),
    IdentityChanged,
}

struct Pulled {
    inserted: u64,
    skipped: u64,
}

struct CycleGuard<'a> {
    flag: &'a watch::Sender<bool>,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.flag.send_replace(false);
    }
}

pub struct SyncEngine {
    pool: SqlitePool,
    remote: Arc<dyn RemoteStore>,
    identity: IdentitySource,
    pull_limit: u32,
    syncing: watch::Sender<bool>,
}

impl SyncEngine {
    pub fn new(
        pool: SqlitePool,
        remote: Arc<dyn RemoteStore>,
        identity: IdentitySource,
        pull_limit: u32,
    ) -> Self {
        let (syncing, _) = watch::channel(false);
        Self {
            pool,
            remote,
            identity,
            pull_limit,
            syncing,
        }
    }

    pub fn is_syncing(&self) -> bool {
        *self.syncing.borrow()
    }

    pub fn watch_syncing(&self) -> watch::Receiver<bool> {
        self.syncing.subscribe()
    }

    fn try_begin(&self) -> Option<CycleGuard<'_>> {
        let acquired = self.syncing.send_if_modified(|busy| {
            if *busy {
                return false;
            }
            *busy = true;
            true
        });
        acquired.then(|| CycleGuard {
            flag: &self.syncing,
        })
    }

    /// Push every pending record of `user`, then pull its recent remote rows.
    ///
    /// Errors are contained per table and reported in the returned
    /// `CycleReport`; they never abort the remaining tables.
    pub async fn run_cycle(&self, user: &UserId) -> CycleOutcome {
        let Some(_guard) = self.try_begin() else {
            tracing::debug!("Sync already in progress, skipping");
            return CycleOutcome::Skipped;
        };

        let mut report = CycleReport::default();
        tracing::debug!(user = %user, "Starting sync cycle");

        for table in Table::ALL {
            if !self.identity.is_current(user) {
                return self.abandon(user, report);
            }
            match self.push_table(table, user).await {
                Ok(Step::Applied((pushed, acknowledged))) => {
                    if pushed > 0 {
                        tracing::debug!(%table, pushed, acknowledged, "Pushed records");
                    }
                    report.pushed.insert(table.name(), pushed);
                    report.acknowledged += acknowledged;
                }
                Ok(Step::IdentityChanged) => return self.abandon(user, report),
                Err(e) => {
                    tracing::warn!(%table, error = %e, "Push failed");
                    report.failures.push(TableFailure {
                        table,
                        phase: Phase::Push,
                        message: e.to_string(),
                    });
                }
            }
        }

        for table in Table::ALL {
            if !self.identity.is_current(user) {
                return self.abandon(user, report);
            }
            match self.pull_table(table, user).await {
                Ok(Step::Applied(pulled)) => {
                    report.pulled_inserted += pulled.inserted;
                    report.pulled_skipped += pulled.skipped;
                }
                Ok(Step::IdentityChanged) => return self.abandon(user, report),
                Err(e) => {
                    tracing::warn!(%table, error = %e, "Pull failed");
                    report.failures.push(TableFailure {
                        table,
                        phase: Phase::Pull,
                        message: e.to_string(),
                    });
                }
            }
        }

        if report.is_clean() {
            tracing::info!(user = %user, "Sync cycle complete: {}", report);
        } else {
            tracing::warn!(user = %user, "Sync cycle finished with errors: {}", report);
        }
        CycleOutcome::Completed(report)
    }

    fn abandon(&self, user: &UserId, report: CycleReport) -> CycleOutcome {
        tracing::info!(user = %user, "Identity changed during sync, discarding remaining work");
        CycleOutcome::IdentityChanged(report)
    }

    async fn push_table(&self, table: Table, user: &UserId) -> Result<Step<(usize, u64)>, SyncError> {
        match table {
            Table::WorkoutLogs => self.push::<WorkoutLog>(user).await,
            Table::NutritionLogs => self.push::<NutritionLog>(user).await,
            Table::SupplementLogs => self.push::<SupplementLog>(user).await,
            Table::BodyMetrics => self.push::<BodyMetric>(user).await,
            Table::UserSettings => self.push::<UserSettings>(user).await,
        }
    }

    async fn pull_table(&self, table: Table, user: &UserId) -> Result<Step<Pulled>, SyncError> {
        match table {
            Table::WorkoutLogs => self.pull::<WorkoutLog>(user).await,
            Table::NutritionLogs => self.pull::<NutritionLog>(user).await,
            Table::SupplementLogs => self.pull::<SupplementLog>(user).await,
            Table::BodyMetrics => self.pull::<BodyMetric>(user).await,
            Table::UserSettings => self.pull::<UserSettings>(user).await,
        }
    }

    async fn push<T: Syncable>(&self, user: &UserId) -> Result<Step<(usize, u64)>, SyncError> {
        let repo = Repository::<T>::new(self.pool.clone());

        let pending = repo.pending(user).await?;
        if pending.is_empty() {
            return Ok(Step::Applied((0, 0)));
        }

        let rows = wire::encode_rows(&pending, user)?;
        self.remote.insert(T::TABLE, rows).await?;

        if !self.identity.is_current(user) {
            return Ok(Step::IdentityChanged);
        }

        // Only the revisions that were read for this push get acknowledged
        let pushed: Vec<(i64, i64)> = pending.iter().map(|r| (r.id, r.revision)).collect();
        let acknowledged = repo.mark_synced(user, &pushed).await?;

        Ok(Step::Applied((pending.len(), acknowledged)))
    }

    async fn pull<T: Syncable>(&self, user: &UserId) -> Result<Step<Pulled>, SyncError> {
        let values = self
            .remote
            .select_recent(T::TABLE, user, self.pull_limit)
            .await?;

        if !self.identity.is_current(user) {
            return Ok(Step::IdentityChanged);
        }

        let table = T::TABLE;
        let fetched = values.len() as u64;
        let mut rows = Vec::with_capacity(values.len());
        for value in values {
            let row: WireRow<T> = match wire::decode_row(value) {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!(%table, error = %e, "Ignoring malformed remote row");
                    continue;
                }
            };
            if row.user_id != user.as_str() {
                continue;
            }
            rows.push((row.id, row.fields));
        }

        let repo = Repository::<T>::new(self.pool.clone());
        let inserted = repo.absorb(user, &rows).await?;

        Ok(Step::Applied(Pulled {
            inserted,
            skipped: fetched - inserted,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{
        init_db, BodyMetricRepository, NutritionLogRepository, UserSettingsRepository,
        WorkoutLogRepository,
    };
    use crate::sync::MemoryRemote;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;
    use uuid::Uuid;

    struct TestContext {
        engine: Arc<SyncEngine>,
        remote: Arc<MemoryRemote>,
        identity: IdentitySource,
        pool: SqlitePool,
        _temp_dir: TempDir,
    }

    async fn setup_with(remote: MemoryRemote, user: &UserId) -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let pool = init_db(&db_path).await.unwrap();
        let remote = Arc::new(remote);
        let identity = IdentitySource::new(Some(user.clone()));
        let engine = Arc::new(SyncEngine::new(
            pool.clone(),
            remote.clone(),
            identity.clone(),
            50,
        ));
        TestContext {
            engine,
            remote,
            identity,
            pool,
            _temp_dir: temp_dir,
        }
    }

    async fn setup(user: &UserId) -> TestContext {
        setup_with(MemoryRemote::new(), user).await
    }

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, d).unwrap()
    }

    fn completed(outcome: CycleOutcome) -> CycleReport {
        match outcome {
            CycleOutcome::Completed(report) => report,
            other => panic!("expected completed cycle, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_push_marks_owned_records_synced() {
        let x = user("x");
        let ctx = setup(&x).await;
        let workouts = WorkoutLogRepository::new(ctx.pool.clone());
        let session = Uuid::new_v4();
        let mine = workouts
            .create(&WorkoutLog::new(session, 1, 1, 60.0, 8), Some(&x))
            .await
            .unwrap();
        let theirs = workouts
            .create(&WorkoutLog::new(session, 1, 2, 60.0, 8), Some(&user("y")))
            .await
            .unwrap();
        let ownerless = workouts
            .create(&WorkoutLog::new(session, 1, 3, 60.0, 8), None)
            .await
            .unwrap();

        let report = completed(ctx.engine.run_cycle(&x).await);

        assert_eq!(report.pushed["workout_logs"], 1);
        assert_eq!(report.acknowledged, 1);
        assert!(workouts.get(mine.id).await.unwrap().unwrap().synced);
        assert!(!workouts.get(theirs.id).await.unwrap().unwrap().synced);
        assert!(!workouts.get(ownerless.id).await.unwrap().unwrap().synced);

        let rows = ctx.remote.rows(Table::WorkoutLogs);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], json!(mine.remote_id.to_string()));
        assert_eq!(rows[0]["user_id"], "x");
        assert!(rows[0].get("synced").is_none());
    }

    #[tokio::test]
    async fn test_pushes_every_table() {
        let x = user("x");
        let ctx = setup(&x).await;
        NutritionLogRepository::new(ctx.pool.clone())
            .create(&NutritionLog::new(day(1), "dal", 116.0, 9.0), Some(&x))
            .await
            .unwrap();
        BodyMetricRepository::new(ctx.pool.clone())
            .record_for_date(day(1), 80.0, Some(&x))
            .await
            .unwrap();
        UserSettingsRepository::new(ctx.pool.clone())
            .set_targets(Some(&x), 1800.0, 100.0)
            .await
            .unwrap();

        let report = completed(ctx.engine.run_cycle(&x).await);

        assert_eq!(report.total_pushed(), 3);
        assert_eq!(ctx.remote.rows(Table::NutritionLogs).len(), 1);
        assert_eq!(ctx.remote.rows(Table::BodyMetrics).len(), 1);
        assert_eq!(ctx.remote.rows(Table::UserSettings).len(), 1);
        // Tables with nothing pending are not sent
        assert_eq!(ctx.remote.insert_calls(), 3);
    }

    #[tokio::test]
    async fn test_failed_push_keeps_records_pending() {
        let x = user("x");
        let ctx = setup(&x).await;
        let metrics = BodyMetricRepository::new(ctx.pool.clone());
        let record = metrics.record_for_date(day(2), 81.0, Some(&x)).await.unwrap();
        ctx.remote.set_available(false);

        let report = completed(ctx.engine.run_cycle(&x).await);

        assert!(!report.is_clean());
        assert_eq!(report.acknowledged, 0);
        assert!(!metrics.get(record.id).await.unwrap().unwrap().synced);
        assert!(!ctx.engine.is_syncing());

        // Retried on the next cycle
        ctx.remote.set_available(true);
        let report = completed(ctx.engine.run_cycle(&x).await);
        assert!(report.is_clean());
        assert!(metrics.get(record.id).await.unwrap().unwrap().synced);
        assert_eq!(ctx.remote.rows(Table::BodyMetrics).len(), 1);
    }

    #[tokio::test]
    async fn test_table_failure_does_not_block_others() {
        let x = user("x");
        let ctx = setup(&x).await;
        let food = NutritionLogRepository::new(ctx.pool.clone());
        let metrics = BodyMetricRepository::new(ctx.pool.clone());
        let meal = food
            .create(&NutritionLog::new(day(3), "egg", 155.0, 13.0), Some(&x))
            .await
            .unwrap();
        let weight = metrics.record_for_date(day(3), 80.5, Some(&x)).await.unwrap();
        ctx.remote.fail_table(Table::NutritionLogs);

        let report = completed(ctx.engine.run_cycle(&x).await);

        let failed: Vec<(Table, Phase)> = report.failures.iter().map(|f| (f.table, f.phase)).collect();
        assert_eq!(
            failed,
            vec![
                (Table::NutritionLogs, Phase::Push),
                (Table::NutritionLogs, Phase::Pull)
            ]
        );
        assert!(!food.get(meal.id).await.unwrap().unwrap().synced);
        assert!(metrics.get(weight.id).await.unwrap().unwrap().synced);
    }

    #[tokio::test]
    async fn test_edit_during_push_stays_pending() {
        let x = user("x");
        let ctx = setup_with(MemoryRemote::new().with_latency(Duration::from_millis(200)), &x).await;
        let workouts = WorkoutLogRepository::new(ctx.pool.clone());
        let record = workouts
            .create(&WorkoutLog::new(Uuid::new_v4(), 1, 1, 60.0, 8), Some(&x))
            .await
            .unwrap();

        let engine = ctx.engine.clone();
        let cycle_user = x.clone();
        let cycle = tokio::spawn(async move { engine.run_cycle(&cycle_user).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        workouts.modify(record.id, |log| log.reps = 10).await.unwrap();

        let report = completed(cycle.await.unwrap());
        assert_eq!(report.acknowledged, 0);
        let after = workouts.get(record.id).await.unwrap().unwrap();
        assert!(!after.synced);
        assert_eq!(ctx.remote.rows(Table::WorkoutLogs)[0]["reps"], 8);

        // The edit goes out on the next cycle and overwrites the remote row
        completed(ctx.engine.run_cycle(&x).await);
        assert!(workouts.get(record.id).await.unwrap().unwrap().synced);
        let rows = ctx.remote.rows(Table::WorkoutLogs);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["reps"], 10);
    }

    #[tokio::test]
    async fn test_concurrent_cycle_is_skipped() {
        let x = user("x");
        let ctx = setup_with(MemoryRemote::new().with_latency(Duration::from_millis(50)), &x).await;
        WorkoutLogRepository::new(ctx.pool.clone())
            .create(&WorkoutLog::new(Uuid::new_v4(), 1, 1, 60.0, 8), Some(&x))
            .await
            .unwrap();

        let mut syncing = ctx.engine.watch_syncing();
        let engine = ctx.engine.clone();
        let cycle_user = x.clone();
        let cycle = tokio::spawn(async move { engine.run_cycle(&cycle_user).await });
        syncing.wait_for(|busy| *busy).await.unwrap();

        let second = ctx.engine.run_cycle(&x).await;

        assert_eq!(second, CycleOutcome::Skipped);
        completed(cycle.await.unwrap());
        // One insert and five selects, all from the first cycle
        assert_eq!(ctx.remote.call_count(), 6);
        assert!(!ctx.engine.is_syncing());
    }

    #[tokio::test]
    async fn test_identity_change_discards_push_result() {
        let x = user("x");
        let ctx = setup_with(MemoryRemote::new().with_latency(Duration::from_millis(150)), &x).await;
        let workouts = WorkoutLogRepository::new(ctx.pool.clone());
        let record = workouts
            .create(&WorkoutLog::new(Uuid::new_v4(), 1, 1, 60.0, 8), Some(&x))
            .await
            .unwrap();

        let engine = ctx.engine.clone();
        let cycle_user = x.clone();
        let cycle = tokio::spawn(async move { engine.run_cycle(&cycle_user).await });
        tokio::time::sleep(Duration::from_millis(30)).await;
        ctx.identity.sign_in(user("y"));

        let outcome = cycle.await.unwrap();

        assert!(matches!(outcome, CycleOutcome::IdentityChanged(_)));
        assert!(!workouts.get(record.id).await.unwrap().unwrap().synced);
        // Nothing after the interrupted push was attempted
        assert_eq!(ctx.remote.call_count(), 1);
        assert!(!ctx.engine.is_syncing());
    }

    #[tokio::test]
    async fn test_cycle_for_stale_identity_does_nothing() {
        let x = user("x");
        let ctx = setup(&x).await;
        ctx.identity.sign_out();

        let outcome = ctx.engine.run_cycle(&x).await;

        assert!(matches!(outcome, CycleOutcome::IdentityChanged(_)));
        assert_eq!(ctx.remote.call_count(), 0);
    }

    #[tokio::test]
    async fn test_pull_inserts_unknown_rows_once() {
        let x = user("x");
        let ctx = setup(&x).await;
        let metrics = BodyMetricRepository::new(ctx.pool.clone());
        let local = metrics.record_for_date(day(1), 80.0, Some(&x)).await.unwrap();
        let fresh = Uuid::new_v4();
        ctx.remote.seed(
            Table::BodyMetrics,
            vec![
                json!({"id": local.remote_id.to_string(), "date": "2025-08-01", "weight": 99.0, "user_id": "x"}),
                json!({"id": fresh.to_string(), "date": "2025-08-05", "weight": 79.0, "user_id": "x"}),
                json!({"id": Uuid::new_v4().to_string(), "date": "2025-08-06", "weight": 60.0, "user_id": "y"}),
                json!({"id": "not-a-uuid", "date": "2025-08-07", "weight": 1.0, "user_id": "x"}),
            ],
        );

        let report = completed(ctx.engine.run_cycle(&x).await);

        assert_eq!(report.pulled_inserted, 1);
        let pulled = metrics.get_by_remote_id(fresh).await.unwrap().unwrap();
        assert!(pulled.synced);
        assert!(pulled.is_owned_by("x"));
        assert_eq!(pulled.fields.weight, 79.0);
        // Local copy wins over the remote one
        let kept = metrics.get(local.id).await.unwrap().unwrap();
        assert_eq!(kept.fields.weight, 80.0);

        let inserts_before = ctx.remote.insert_calls();
        let report = completed(ctx.engine.run_cycle(&x).await);
        assert_eq!(report.pulled_inserted, 0);
        assert_eq!(report.total_pushed(), 0);
        assert_eq!(ctx.remote.insert_calls(), inserts_before);
        assert_eq!(metrics.list(Some(&x)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_local_delete_issues_no_remote_call() {
        let x = user("x");
        let ctx = setup(&x).await;
        let food = NutritionLogRepository::new(ctx.pool.clone());
        let meal = food
            .create(&NutritionLog::new(day(1), "rice", 130.0, 2.7), Some(&x))
            .await
            .unwrap();

        food.delete(meal.id).await.unwrap();
        let report = completed(ctx.engine.run_cycle(&x).await);

        assert_eq!(report.total_pushed(), 0);
        assert_eq!(ctx.remote.insert_calls(), 0);
    }
}
