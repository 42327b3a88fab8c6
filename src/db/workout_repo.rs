use chrono::DateTime;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::syncable::{decode_uuid, SqliteQuery, Syncable, Table};
use super::{RepoError, Repository};
use crate::identity::UserId;
use crate::models::{Record, WorkoutLog};

impl Syncable for WorkoutLog {
    const TABLE: Table = Table::WorkoutLogs;
    const COLUMNS: &'static [&'static str] = &[
        "workout_session_id",
        "exercise_id",
        "set_number",
        "weight",
        "reps",
        "distance",
        "duration",
        "notes",
        "timestamp",
    ];

    fn bind<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.workout_session_id.to_string())
            .bind(self.exercise_id)
            .bind(self.set_number)
            .bind(self.weight)
            .bind(self.reps)
            .bind(self.distance)
            .bind(self.duration)
            .bind(self.notes.clone())
            .bind(self.timestamp.timestamp_millis())
    }

    fn decode(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let millis: i64 = row.try_get("timestamp")?;
        let timestamp =
            DateTime::from_timestamp_millis(millis).ok_or_else(|| sqlx::Error::ColumnDecode {
                index: "timestamp".to_string(),
                source: format!("timestamp out of range: {}", millis).into(),
            })?;

        Ok(WorkoutLog {
            workout_session_id: decode_uuid(row, "workout_session_id")?,
            exercise_id: row.try_get("exercise_id")?,
            set_number: row.try_get("set_number")?,
            weight: row.try_get("weight")?,
            reps: row.try_get("reps")?,
            distance: row.try_get("distance")?,
            duration: row.try_get("duration")?,
            notes: row.try_get("notes")?,
            timestamp,
        })
    }
}

impl Repository<WorkoutLog> {
    /// All sets of one workout session, in the order they were logged.
    pub async fn list_session(&self, session: Uuid) -> Result<Vec<Record<WorkoutLog>>, RepoError> {
        let mut sets = self
            .select_where("workout_session_id = ?", |query| {
                query.bind(session.to_string())
            })
            .await?;
        sets.reverse();
        Ok(sets)
    }

    /// Most recent sets of an exercise visible to `owner`.
    pub async fn recent_for_exercise(
        &self,
        exercise_id: i64,
        owner: Option<&UserId>,
        limit: usize,
    ) -> Result<Vec<Record<WorkoutLog>>, RepoError> {
        let owner = owner.map(|user| user.as_str().to_string());
        let mut sets = self
            .select_where(
                "exercise_id = ? AND (user_id IS NULL OR user_id = ?)",
                |query| query.bind(exercise_id).bind(owner),
            )
            .await?;
        sets.truncate(limit);
        Ok(sets)
    }

    /// Set number for the next set of `exercise_id` within a session.
    pub async fn next_set_number(&self, session: Uuid, exercise_id: i64) -> Result<i32, RepoError> {
        let sets = self.list_session(session).await?;
        let last = sets
            .iter()
            .filter(|r| r.fields.exercise_id == exercise_id)
            .map(|r| r.fields.set_number)
            .max()
            .unwrap_or(0);
        Ok(last + 1)
    }
}
