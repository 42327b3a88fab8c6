mod body_metric;
mod exercise;
mod nutrition_log;
mod record;
mod staple_food;
mod supplement_log;
mod user_settings;
mod workout_log;

pub use body_metric::BodyMetric;
pub use exercise::{Exercise, MuscleGroup};
pub use nutrition_log::NutritionLog;
pub use record::Record;
pub use staple_food::{FoodUnit, StapleFood};
pub use supplement_log::SupplementLog;
pub use user_settings::UserSettings;
pub use workout_log::WorkoutLog;
