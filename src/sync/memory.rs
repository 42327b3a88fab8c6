//! In-memory remote store used by the sync tests.

use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering as CmpOrdering;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{RemoteError, RemoteStore};
use crate::db::Table;
use crate::identity::UserId;

/// Remote store kept in process memory.
///
/// Rows are upserted by their `id` field, like the REST store does with
/// `resolution=merge-duplicates`.
pub struct MemoryRemote {
    tables: Mutex<HashMap<Table, Vec<Value>>>,
    failing: Mutex<HashSet<Table>>,
    available: AtomicBool,
    latency: Option<Duration>,
    insert_calls: AtomicU32,
    select_calls: AtomicU32,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            available: AtomicBool::new(true),
            latency: None,
            insert_calls: AtomicU32::new(0),
            select_calls: AtomicU32::new(0),
        }
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every call fail (or succeed again).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Make calls for one table fail.
    pub fn fail_table(&self, table: Table) {
        lock(&self.failing).insert(table);
    }

    pub fn insert_calls(&self) -> u32 {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn select_calls(&self) -> u32 {
        self.select_calls.load(Ordering::SeqCst)
    }

    /// Total number of insert and select calls.
    pub fn call_count(&self) -> u32 {
        self.insert_calls() + self.select_calls()
    }

    /// Snapshot of the rows stored for `table`.
    pub fn rows(&self, table: Table) -> Vec<Value> {
        lock(&self.tables).get(&table).cloned().unwrap_or_default()
    }

    /// Store rows directly, as if another device had pushed them.
    pub fn seed(&self, table: Table, rows: Vec<Value>) {
        let mut tables = lock(&self.tables);
        let stored = tables.entry(table).or_default();
        for row in rows {
            upsert(stored, row);
        }
    }

    async fn enter(&self, table: Table) -> Result<(), RemoteError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if !self.available.load(Ordering::SeqCst) || lock(&self.failing).contains(&table) {
            return Err(RemoteError::Status {
                status: 503,
                message: format!("{} unavailable", table),
            });
        }
        Ok(())
    }
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

fn upsert(stored: &mut Vec<Value>, row: Value) {
    match stored.iter_mut().find(|existing| existing["id"] == row["id"]) {
        Some(existing) => *existing = row,
        None => stored.push(row),
    }
}

fn newest_first(column: &str, a: &Value, b: &Value) -> CmpOrdering {
    match (&a[column], &b[column]) {
        (Value::Number(x), Value::Number(y)) => y
            .as_f64()
            .partial_cmp(&x.as_f64())
            .unwrap_or(CmpOrdering::Equal),
        (Value::String(x), Value::String(y)) => y.cmp(x),
        _ => CmpOrdering::Equal,
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn insert(&self, table: Table, rows: Vec<Value>) -> Result<(), RemoteError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.enter(table).await?;

        if let Some(row) = rows.iter().find(|row| !row["id"].is_string()) {
            return Err(RemoteError::InvalidPayload(format!("row without id: {}", row)));
        }

        let mut tables = lock(&self.tables);
        let stored = tables.entry(table).or_default();
        for row in rows {
            upsert(stored, row);
        }
        Ok(())
    }

    async fn select_recent(
        &self,
        table: Table,
        user: &UserId,
        limit: u32,
    ) -> Result<Vec<Value>, RemoteError> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        self.enter(table).await?;

        let mut rows: Vec<Value> = self
            .rows(table)
            .into_iter()
            .filter(|row| row["user_id"].as_str() == Some(user.as_str()))
            .collect();

        match table.time_column() {
            Some(column) => rows.sort_by(|a, b| newest_first(column, a, b)),
            None => rows.sort_by(|a, b| a["id"].as_str().cmp(&b["id"].as_str())),
        }
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_upserts_by_id() {
        let remote = MemoryRemote::new();

        remote
            .insert(Table::BodyMetrics, vec![json!({"id": "a", "weight": 80.0})])
            .await
            .unwrap();
        remote
            .insert(
                Table::BodyMetrics,
                vec![
                    json!({"id": "a", "weight": 79.0}),
                    json!({"id": "b", "weight": 78.0}),
                ],
            )
            .await
            .unwrap();

        let rows = remote.rows(Table::BodyMetrics);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["weight"], 79.0);
        assert_eq!(remote.insert_calls(), 2);
    }

    #[tokio::test]
    async fn test_select_recent_filters_sorts_and_limits() {
        let remote = MemoryRemote::new();
        remote.seed(
            Table::BodyMetrics,
            vec![
                json!({"id": "1", "date": "2025-01-01", "user_id": "u1"}),
                json!({"id": "2", "date": "2025-01-03", "user_id": "u1"}),
                json!({"id": "3", "date": "2025-01-02", "user_id": "u1"}),
                json!({"id": "4", "date": "2025-01-09", "user_id": "u2"}),
            ],
        );
        let user = UserId::new("u1").unwrap();

        let rows = remote
            .select_recent(Table::BodyMetrics, &user, 2)
            .await
            .unwrap();

        let ids: Vec<&str> = rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[tokio::test]
    async fn test_failures() {
        let remote = MemoryRemote::new();
        remote.fail_table(Table::NutritionLogs);

        assert!(remote
            .insert(Table::NutritionLogs, vec![json!({"id": "a"})])
            .await
            .is_err());
        assert!(remote
            .insert(Table::BodyMetrics, vec![json!({"id": "a"})])
            .await
            .is_ok());

        remote.set_available(false);
        let user = UserId::new("u1").unwrap();
        assert!(remote
            .select_recent(Table::BodyMetrics, &user, 10)
            .await
            .is_err());
        assert_eq!(remote.call_count(), 3);
    }

    #[tokio::test]
    async fn test_rejects_rows_without_id() {
        let remote = MemoryRemote::new();

        let result = remote
            .insert(Table::UserSettings, vec![json!({"calorie_target": 1.0})])
            .await;

        assert!(matches!(result, Err(RemoteError::InvalidPayload(_))));
        assert!(remote.rows(Table::UserSettings).is_empty());
    }

    #[tokio::test]
    async fn test_select_without_time_column_orders_by_id() {
        let remote = MemoryRemote::new();
        remote.seed(
            Table::UserSettings,
            vec![
                json!({"id": "c", "user_id": "u1"}),
                json!({"id": "a", "user_id": "u1"}),
                json!({"id": "b", "user_id": "u1"}),
            ],
        );
        let user = UserId::new("u1").unwrap();

        let rows = remote
            .select_recent(Table::UserSettings, &user, 2)
            .await
            .unwrap();

        let ids: Vec<&str> = rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
