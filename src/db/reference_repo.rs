use sqlx::SqlitePool;
use std::str::FromStr;

use crate::identity::UserId;
use crate::models::{Exercise, FoodUnit, MuscleGroup, StapleFood};

/// Read access to the local-only catalogue tables.
pub struct ReferenceRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct ExerciseRow {
    id: i64,
    name: String,
    muscle_group: String,
    is_custom: bool,
    user_id: Option<String>,
}

#[derive(sqlx::FromRow)]
struct StapleFoodRow {
    id: i64,
    name: String,
    calories: f64,
    protein: f64,
    unit: String,
    user_id: Option<String>,
}

impl ReferenceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_exercises(&self, group: Option<MuscleGroup>) -> Result<Vec<Exercise>, sqlx::Error> {
        let rows: Vec<ExerciseRow> = match group {
            Some(group) => {
                sqlx::query_as("SELECT * FROM exercises WHERE muscle_group = ? ORDER BY id")
                    .bind(group.to_string())
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as("SELECT * FROM exercises ORDER BY id")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.into_iter().map(Self::row_to_exercise).collect()
    }

    pub async fn get_exercise(&self, id: i64) -> Result<Option<Exercise>, sqlx::Error> {
        let row: Option<ExerciseRow> = sqlx::query_as("SELECT * FROM exercises WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_exercise).transpose()
    }

    pub async fn find_exercise(&self, name: &str) -> Result<Option<Exercise>, sqlx::Error> {
        let row: Option<ExerciseRow> =
            sqlx::query_as("SELECT * FROM exercises WHERE LOWER(name) = LOWER(?)")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Self::row_to_exercise).transpose()
    }

    pub async fn add_custom_exercise(
        &self,
        name: &str,
        group: MuscleGroup,
        owner: Option<&UserId>,
    ) -> Result<Exercise, sqlx::Error> {
        let id = sqlx::query(
            "INSERT INTO exercises (name, muscle_group, is_custom, user_id) VALUES (?, ?, 1, ?)",
        )
        .bind(name)
        .bind(group.to_string())
        .bind(owner.map(UserId::as_str))
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get_exercise(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn list_staples(&self) -> Result<Vec<StapleFood>, sqlx::Error> {
        let rows: Vec<StapleFoodRow> = sqlx::query_as("SELECT * FROM staple_foods ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_staple).collect()
    }

    pub async fn find_staple(&self, name: &str) -> Result<Option<StapleFood>, sqlx::Error> {
        let row: Option<StapleFoodRow> =
            sqlx::query_as("SELECT * FROM staple_foods WHERE LOWER(name) = LOWER(?)")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Self::row_to_staple).transpose()
    }

    fn row_to_exercise(row: ExerciseRow) -> Result<Exercise, sqlx::Error> {
        let muscle_group = MuscleGroup::from_str(&row.muscle_group)
            .map_err(|e| sqlx::Error::Decode(e.into()))?;

        Ok(Exercise {
            id: row.id,
            name: row.name,
            muscle_group,
            is_custom: row.is_custom,
            user_id: row.user_id,
        })
    }

    fn row_to_staple(row: StapleFoodRow) -> Result<StapleFood, sqlx::Error> {
        let unit = FoodUnit::from_str(&row.unit).map_err(|e| sqlx::Error::Decode(e.into()))?;

        Ok(StapleFood {
            id: row.id,
            name: row.name,
            calories: row.calories,
            protein: row.protein,
            unit,
            user_id: row.user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use tempfile::TempDir;

    struct TestContext {
        repo: ReferenceRepository,
        _temp_dir: TempDir,
    }

    async fn setup_repo() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let pool = init_db(&db_path).await.unwrap();
        TestContext {
            repo: ReferenceRepository::new(pool),
            _temp_dir: temp_dir,
        }
    }

    #[tokio::test]
    async fn test_exercise_catalogue_is_seeded() {
        let ctx = setup_repo().await;

        let all = ctx.repo.list_exercises(None).await.unwrap();
        let legs = ctx.repo.list_exercises(Some(MuscleGroup::Legs)).await.unwrap();

        assert_eq!(all.len(), 22);
        assert_eq!(legs.len(), 5);
        assert!(all.iter().all(|e| !e.is_custom && e.user_id.is_none()));
    }

    #[tokio::test]
    async fn test_find_exercise_case_insensitive() {
        let ctx = setup_repo().await;

        let squat = ctx.repo.find_exercise("barbell squat").await.unwrap().unwrap();

        assert_eq!(squat.name, "Barbell Squat");
        assert_eq!(squat.muscle_group, MuscleGroup::Legs);
    }

    #[tokio::test]
    async fn test_add_custom_exercise() {
        let ctx = setup_repo().await;
        let me = UserId::new("u1").unwrap();

        let run = ctx
            .repo
            .add_custom_exercise("Park Run", MuscleGroup::Run, Some(&me))
            .await
            .unwrap();

        assert!(run.is_custom);
        assert_eq!(run.user_id.as_deref(), Some("u1"));
        assert_eq!(ctx.repo.get_exercise(run.id).await.unwrap().unwrap(), run);
    }

    #[tokio::test]
    async fn test_staples_are_seeded() {
        let ctx = setup_repo().await;

        let roti = ctx.repo.find_staple("Roti").await.unwrap().unwrap();

        assert_eq!(roti.unit, FoodUnit::Unit);
        assert_eq!(roti.calories, 71.0);
        assert_eq!(ctx.repo.list_staples().await.unwrap().len(), 61);
    }
}
