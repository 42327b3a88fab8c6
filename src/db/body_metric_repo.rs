use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::syncable::{decode_date, SqliteQuery, Syncable, Table};
use super::{RepoError, Repository};
use crate::identity::UserId;
use crate::models::{BodyMetric, Record};

impl Syncable for BodyMetric {
    const TABLE: Table = Table::BodyMetrics;
    const COLUMNS: &'static [&'static str] = &["date", "weight"];

    fn bind<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query.bind(self.date.to_string()).bind(self.weight)
    }

    fn decode(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(BodyMetric {
            date: decode_date(row, "date")?,
            weight: row.try_get("weight")?,
        })
    }
}

impl Repository<BodyMetric> {
    pub async fn for_date(
        &self,
        date: NaiveDate,
        owner: Option<&UserId>,
    ) -> Result<Option<Record<BodyMetric>>, RepoError> {
        let owner = owner.map(|user| user.as_str().to_string());
        let entries = self
            .select_where("date = ? AND (user_id IS NULL OR user_id = ?)", |query| {
                query.bind(date.to_string()).bind(owner)
            })
            .await?;
        Ok(entries.into_iter().next())
    }

    /// Record the weight for `date`, replacing an existing entry for that day.
    pub async fn record_for_date(
        &self,
        date: NaiveDate,
        weight: f64,
        owner: Option<&UserId>,
    ) -> Result<Record<BodyMetric>, RepoError> {
        match self.for_date(date, owner).await? {
            Some(existing) => self.modify(existing.id, |m| m.weight = weight).await,
            None => self.create(&BodyMetric::new(date, weight), owner).await,
        }
    }
}
