use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::syncable::{decode_date, SqliteQuery, Syncable, Table};
use super::{RepoError, Repository};
use crate::identity::UserId;
use crate::models::{Record, SupplementLog};

impl Syncable for SupplementLog {
    const TABLE: Table = Table::SupplementLogs;
    const COLUMNS: &'static [&'static str] = &["date", "item_name", "is_taken", "time_group"];

    fn bind<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.date.to_string())
            .bind(self.item_name.clone())
            .bind(self.is_taken)
            .bind(self.time_group.clone())
    }

    fn decode(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(SupplementLog {
            date: decode_date(row, "date")?,
            item_name: row.try_get("item_name")?,
            is_taken: row.try_get("is_taken")?,
            time_group: row.try_get("time_group")?,
        })
    }
}

impl Repository<SupplementLog> {
    pub async fn list_for_date(
        &self,
        date: NaiveDate,
        owner: Option<&UserId>,
    ) -> Result<Vec<Record<SupplementLog>>, RepoError> {
        let owner = owner.map(|user| user.as_str().to_string());
        self.select_where("date = ? AND (user_id IS NULL OR user_id = ?)", |query| {
            query.bind(date.to_string()).bind(owner)
        })
        .await
    }

    /// Flip a supplement between taken and not taken for `date`.
    ///
    /// Taking creates an entry; untaking deletes the existing one. Returns
    /// the new entry, or `None` when it was removed.
    pub async fn toggle(
        &self,
        date: NaiveDate,
        item_name: &str,
        time_group: &str,
        owner: Option<&UserId>,
    ) -> Result<Option<Record<SupplementLog>>, RepoError> {
        let existing = self
            .list_for_date(date, owner)
            .await?
            .into_iter()
            .find(|r| r.fields.item_name == item_name && r.fields.is_taken);

        match existing {
            Some(record) => {
                self.delete(record.id).await?;
                Ok(None)
            }
            None => {
                let entry = SupplementLog::taken(date, item_name, time_group);
                self.create(&entry, owner).await.map(Some)
            }
        }
    }
}
