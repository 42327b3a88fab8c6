//! Table metadata shared by the repositories and the sync engine.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row, Sqlite};
use std::fmt;
use uuid::Uuid;

pub type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// The mutable tables that take part in sync.
///
/// Table names are identical on the local and the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    WorkoutLogs,
    NutritionLogs,
    SupplementLogs,
    BodyMetrics,
    UserSettings,
}

impl Table {
    /// Sync order: the workout log is the primary table and goes first.
    pub const ALL: [Table; 5] = [
        Table::WorkoutLogs,
        Table::NutritionLogs,
        Table::SupplementLogs,
        Table::BodyMetrics,
        Table::UserSettings,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::WorkoutLogs => "workout_logs",
            Table::NutritionLogs => "nutrition_logs",
            Table::SupplementLogs => "supplement_logs",
            Table::BodyMetrics => "body_metrics",
            Table::UserSettings => "user_settings",
        }
    }

    /// Column the table is ordered by, newest first.
    pub fn time_column(&self) -> Option<&'static str> {
        match self {
            Table::WorkoutLogs => Some("timestamp"),
            Table::NutritionLogs | Table::SupplementLogs | Table::BodyMetrics => Some("date"),
            Table::UserSettings => None,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Business fields of a syncable table.
///
/// Implementors describe how their fields map onto SQLite columns. The
/// serde representation doubles as the remote wire shape.
pub trait Syncable: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    const TABLE: Table;

    /// Business columns, in the order `bind` binds them.
    const COLUMNS: &'static [&'static str];

    fn bind<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q>;

    fn decode(row: &SqliteRow) -> Result<Self, sqlx::Error>;
}

pub(crate) fn decode_date(row: &SqliteRow, column: &str) -> Result<NaiveDate, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

pub(crate) fn decode_uuid(row: &SqliteRow, column: &str) -> Result<Uuid, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    Uuid::parse_str(&raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}
