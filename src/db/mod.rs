mod body_metric_repo;
mod error;
mod nutrition_repo;
mod reference_repo;
mod repository;
mod seed;
mod settings_repo;
mod supplement_repo;
mod syncable;
mod workout_repo;

pub use error::RepoError;
pub use reference_repo::ReferenceRepository;
pub use repository::Repository;
pub use syncable::{Syncable, Table};

use crate::models::{BodyMetric, NutritionLog, SupplementLog, UserSettings, WorkoutLog};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

pub type WorkoutLogRepository = Repository<WorkoutLog>;
pub type NutritionLogRepository = Repository<NutritionLog>;
pub type SupplementLogRepository = Repository<SupplementLog>;
pub type BodyMetricRepository = Repository<BodyMetric>;
pub type UserSettingsRepository = Repository<UserSettings>;

/// Initialize the database connection pool, run migrations and seed the
/// reference tables.
pub async fn init_db(path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite:{}?mode=rwc", path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    seed::seed_reference_data(&pool).await?;

    Ok(pool)
}
