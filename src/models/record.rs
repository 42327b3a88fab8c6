use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A row of one of the syncable tables together with its sync bookkeeping.
///
/// `fields` holds the business values the user edits; everything else is
/// maintained by the repositories and the sync engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record<T> {
    /// Local identifier assigned by SQLite. Never sent to the remote store.
    pub id: i64,
    /// Stable identifier shared with the remote store.
    pub remote_id: Uuid,
    /// Owner identity, absent until the record is attributed to a signed-in user.
    pub user_id: Option<String>,
    /// True iff the current field values were accepted by the remote store.
    pub synced: bool,
    /// Bumped by every business-field mutation.
    pub revision: i64,
    #[serde(flatten)]
    pub fields: T,
}

impl<T> Record<T> {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id.as_deref() == Some(user_id)
    }
}
