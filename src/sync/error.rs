//! Sync error types.

use thiserror::Error;

use crate::db::RepoError;

/// Errors talking to the remote store.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Remote store not configured. Add sync.remote_url and sync.api_key to config.")]
    NotConfigured,

    #[error("Remote HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote store rejected request ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Invalid remote payload: {0}")]
    InvalidPayload(String),
}

/// Errors that abort a table's push or pull within a sync cycle.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Storage error: {0}")]
    Storage(#[from] RepoError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<sqlx::Error> for SyncError {
    fn from(e: sqlx::Error) -> Self {
        SyncError::Storage(RepoError::Sqlite(e))
    }
}
