//! Attributes ownerless local records to a signed-in user.

use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::fmt;

use crate::db::Table;
use crate::identity::UserId;

/// Number of records claimed per table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub claimed: BTreeMap<&'static str, u64>,
}

impl MigrationReport {
    pub fn total(&self) -> u64 {
        self.claimed.values().sum()
    }
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "claimed {} record(s)", self.total())?;
        let parts: Vec<String> = self
            .claimed
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(table, count)| format!("{} {}", count, table))
            .collect();
        if !parts.is_empty() {
            write!(f, " ({})", parts.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct OwnershipMigrator {
    pool: SqlitePool,
}

impl OwnershipMigrator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Set `user_id = user` on every record that has no owner.
    ///
    /// All tables are updated in one transaction: either every ownerless
    /// record is claimed or none is. Records that already have an owner are
    /// left alone, and the sync flags are not touched.
    pub async fn migrate(&self, user: &UserId) -> Result<MigrationReport, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut report = MigrationReport::default();

        for table in Table::ALL {
            let sql = format!("UPDATE {} SET user_id = ? WHERE user_id IS NULL", table);
            let result = sqlx::query(&sql)
                .bind(user.as_str())
                .execute(&mut *tx)
                .await?;
            report.claimed.insert(table.name(), result.rows_affected());
        }

        tx.commit().await?;

        if report.total() > 0 {
            tracing::info!(user = %user, claimed = report.total(), "Migrated ownerless records");
        } else {
            tracing::debug!(user = %user, "No ownerless records to migrate");
        }

        Ok(report)
    }
}
