use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::syncable::{decode_date, SqliteQuery, Syncable, Table};
use super::{RepoError, Repository};
use crate::identity::UserId;
use crate::models::{NutritionLog, Record};

impl Syncable for NutritionLog {
    const TABLE: Table = Table::NutritionLogs;
    const COLUMNS: &'static [&'static str] = &["date", "item_name", "calories", "protein", "quantity"];

    fn bind<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.date.to_string())
            .bind(self.item_name.clone())
            .bind(self.calories)
            .bind(self.protein)
            .bind(self.quantity.clone())
    }

    fn decode(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(NutritionLog {
            date: decode_date(row, "date")?,
            item_name: row.try_get("item_name")?,
            calories: row.try_get("calories")?,
            protein: row.try_get("protein")?,
            quantity: row.try_get("quantity")?,
        })
    }
}

impl Repository<NutritionLog> {
    pub async fn list_for_date(
        &self,
        date: NaiveDate,
        owner: Option<&UserId>,
    ) -> Result<Vec<Record<NutritionLog>>, RepoError> {
        let owner = owner.map(|user| user.as_str().to_string());
        self.select_where("date = ? AND (user_id IS NULL OR user_id = ?)", |query| {
            query.bind(date.to_string()).bind(owner)
        })
        .await
    }

    /// Calories and protein eaten on `date`.
    pub async fn daily_totals(
        &self,
        date: NaiveDate,
        owner: Option<&UserId>,
    ) -> Result<(f64, f64), RepoError> {
        let entries = self.list_for_date(date, owner).await?;
        Ok(entries.iter().fold((0.0, 0.0), |(calories, protein), r| {
            (calories + r.fields.calories, protein + r.fields.protein)
        }))
    }
}
