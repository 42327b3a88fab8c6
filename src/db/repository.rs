use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::marker::PhantomData;
use uuid::Uuid;

use super::syncable::{decode_uuid, SqliteQuery, Syncable};
use super::RepoError;
use crate::identity::UserId;
use crate::models::Record;

const BOOKKEEPING: &str = "id, remote_id, user_id, synced, revision";

/// Storage for one syncable table.
///
/// Every business-field write goes through `update`, which clears the
/// `synced` flag and bumps `revision` in the same statement.
pub struct Repository<T> {
    pool: SqlitePool,
    _table: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _table: PhantomData,
        }
    }
}

impl<T: Syncable> Repository<T> {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _table: PhantomData,
        }
    }

    fn select_sql() -> String {
        format!(
            "SELECT {}, {} FROM {}",
            BOOKKEEPING,
            T::COLUMNS.join(", "),
            T::TABLE
        )
    }

    fn order_sql() -> String {
        match T::TABLE.time_column() {
            Some(column) => format!(" ORDER BY {} DESC, id DESC", column),
            None => " ORDER BY id DESC".to_string(),
        }
    }

    fn insert_sql() -> String {
        let placeholders = vec!["?"; T::COLUMNS.len()].join(", ");
        format!(
            "INSERT INTO {} (remote_id, user_id, synced, revision, {}) VALUES (?, ?, ?, 0, {})",
            T::TABLE,
            T::COLUMNS.join(", "),
            placeholders
        )
    }

    pub async fn create(&self, fields: &T, owner: Option<&UserId>) -> Result<Record<T>, RepoError> {
        let sql = Self::insert_sql();
        let query = sqlx::query(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(owner.map(|user| user.as_str().to_string()))
            .bind(false);

        let id = fields.bind(query).execute(&self.pool).await?.last_insert_rowid();

        self.get(id).await?.ok_or(RepoError::NotFound {
            table: T::TABLE,
            id,
        })
    }

    pub async fn get(&self, id: i64) -> Result<Option<Record<T>>, RepoError> {
        let sql = format!("{} WHERE id = ?", Self::select_sql());
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(decode_record::<T>).transpose()?)
    }

    pub async fn get_by_remote_id(&self, remote_id: Uuid) -> Result<Option<Record<T>>, RepoError> {
        let sql = format!("{} WHERE remote_id = ?", Self::select_sql());
        let row = sqlx::query(&sql)
            .bind(remote_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(decode_record::<T>).transpose()?)
    }

    /// Records visible to `owner`: its own plus any not yet attributed.
    pub async fn list(&self, owner: Option<&UserId>) -> Result<Vec<Record<T>>, RepoError> {
        let owner = owner.map(|user| user.as_str().to_string());
        self.select_where("(user_id IS NULL OR user_id = ?)", |query| {
            query.bind(owner)
        })
        .await
    }

    /// Overwrite the business fields of a record and re-arm it for push.
    pub async fn update(&self, id: i64, fields: &T) -> Result<Record<T>, RepoError> {
        let assignments: Vec<String> = T::COLUMNS.iter().map(|c| format!("{} = ?", c)).collect();
        let sql = format!(
            "UPDATE {} SET {}, synced = 0, revision = revision + 1 WHERE id = ?",
            T::TABLE,
            assignments.join(", ")
        );

        let result = fields
            .bind(sqlx::query(&sql))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound {
                table: T::TABLE,
                id,
            });
        }

        self.get(id).await?.ok_or(RepoError::NotFound {
            table: T::TABLE,
            id,
        })
    }

    /// Read a record, apply `change` to its fields and write them back.
    pub async fn modify<F>(&self, id: i64, change: F) -> Result<Record<T>, RepoError>
    where
        F: FnOnce(&mut T),
    {
        let record = self.get(id).await?.ok_or(RepoError::NotFound {
            table: T::TABLE,
            id,
        })?;

        let mut fields = record.fields;
        change(&mut fields);
        self.update(id, &fields).await
    }

    /// Local delete. The remote copy, if any, is left alone.
    pub async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", T::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Records owned by `owner` whose current values were never accepted remotely.
    pub async fn pending(&self, owner: &UserId) -> Result<Vec<Record<T>>, RepoError> {
        let sql = format!(
            "{} WHERE user_id = ? AND synced = 0 ORDER BY id",
            Self::select_sql()
        );
        let rows = sqlx::query(&sql)
            .bind(owner.as_str())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(decode_record::<T>)
            .collect::<Result<Vec<_>, _>>()?)
    }

    pub async fn pending_count(&self, owner: &UserId) -> Result<i64, RepoError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE user_id = ? AND synced = 0",
            T::TABLE
        );
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(owner.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Mark pushed records as synced.
    ///
    /// `pushed` holds `(id, revision)` pairs as they were read for the push.
    /// A record whose revision moved on since then keeps `synced = 0`.
    pub async fn mark_synced(&self, owner: &UserId, pushed: &[(i64, i64)]) -> Result<u64, RepoError> {
        let sql = format!(
            "UPDATE {} SET synced = 1 WHERE id = ? AND revision = ? AND user_id = ?",
            T::TABLE
        );

        let mut tx = self.pool.begin().await?;
        let mut marked = 0;
        for &(id, revision) in pushed {
            let result = sqlx::query(&sql)
                .bind(id)
                .bind(revision)
                .bind(owner.as_str())
                .execute(&mut *tx)
                .await?;
            marked += result.rows_affected();
        }
        tx.commit().await?;

        Ok(marked)
    }

    /// Insert pulled rows not yet known locally, keyed by `remote_id`.
    ///
    /// Existing local copies are left untouched. Returns the number of rows
    /// inserted.
    pub async fn absorb(&self, owner: &UserId, rows: &[(Uuid, T)]) -> Result<u64, RepoError> {
        let sql = format!("{} ON CONFLICT(remote_id) DO NOTHING", Self::insert_sql());

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for (remote_id, fields) in rows {
            let query = sqlx::query(&sql)
                .bind(remote_id.to_string())
                .bind(owner.as_str().to_string())
                .bind(true);
            let result = fields.bind(query).execute(&mut *tx).await?;
            inserted += result.rows_affected();
        }
        tx.commit().await?;

        Ok(inserted)
    }

    /// Select records matching `filter`, newest first.
    pub(super) async fn select_where<B>(&self, filter: &str, bind: B) -> Result<Vec<Record<T>>, RepoError>
    where
        B: for<'q> FnOnce(SqliteQuery<'q>) -> SqliteQuery<'q>,
    {
        let sql = format!(
            "{} WHERE {}{}",
            Self::select_sql(),
            filter,
            Self::order_sql()
        );
        let rows = bind(sqlx::query(&sql)).fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .map(decode_record::<T>)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

fn decode_record<T: Syncable>(row: &SqliteRow) -> Result<Record<T>, sqlx::Error> {
    Ok(Record {
        id: row.try_get("id")?,
        remote_id: decode_uuid(row, "remote_id")?,
        user_id: row.try_get("user_id")?,
        synced: row.try_get("synced")?,
        revision: row.try_get("revision")?,
        fields: T::decode(row)?,
    })
}
