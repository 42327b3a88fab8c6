use thiserror::Error;

use super::Table;

/// Errors from the local store repositories.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("No {table} record with id {id}")]
    NotFound { table: Table, id: i64 },
}
