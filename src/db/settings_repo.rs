use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::syncable::{SqliteQuery, Syncable, Table};
use super::{RepoError, Repository};
use crate::identity::UserId;
use crate::models::{Record, UserSettings};

impl Syncable for UserSettings {
    const TABLE: Table = Table::UserSettings;
    const COLUMNS: &'static [&'static str] = &["calorie_target", "protein_target"];

    fn bind<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query.bind(self.calorie_target).bind(self.protein_target)
    }

    fn decode(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(UserSettings {
            calorie_target: row.try_get("calorie_target")?,
            protein_target: row.try_get("protein_target")?,
        })
    }
}

impl Repository<UserSettings> {
    /// The settings row owned by `owner`, newest first if several exist.
    pub async fn current(&self, owner: Option<&UserId>) -> Result<Option<Record<UserSettings>>, RepoError> {
        let owner = owner.map(|user| user.as_str().to_string());
        let rows = self
            .select_where("user_id IS ?", |query| query.bind(owner))
            .await?;
        Ok(rows.into_iter().next())
    }

    pub async fn set_targets(
        &self,
        owner: Option<&UserId>,
        calorie_target: f64,
        protein_target: f64,
    ) -> Result<Record<UserSettings>, RepoError> {
        let settings = UserSettings::new(calorie_target, protein_target);
        match self.current(owner).await? {
            Some(existing) => self.update(existing.id, &settings).await,
            None => self.create(&settings, owner).await,
        }
    }
}
