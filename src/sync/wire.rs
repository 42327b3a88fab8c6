//! Row shapes exchanged with the remote store.
//!
//! A wire row is the record's business fields plus `id` (the record's
//! `remote_id`) and `user_id`. The local id, `synced` and `revision` never
//! leave the device.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::db::Syncable;
use crate::identity::UserId;
use crate::models::Record;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRow<T> {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: T,
    pub user_id: String,
}

impl<T: Syncable> WireRow<T> {
    pub fn from_record(record: &Record<T>, owner: &UserId) -> Self {
        Self {
            id: record.remote_id,
            fields: record.fields.clone(),
            user_id: owner.as_str().to_string(),
        }
    }
}

/// Encode records for a push batch.
pub fn encode_rows<T: Syncable>(
    records: &[Record<T>],
    owner: &UserId,
) -> Result<Vec<Value>, serde_json::Error> {
    records
        .iter()
        .map(|record| serde_json::to_value(WireRow::from_record(record, owner)))
        .collect()
}

pub fn decode_row<T: Syncable>(value: Value) -> Result<WireRow<T>, serde_json::Error> {
    serde_json::from_value(value)
}
