use sqlx::SqlitePool;

use crate::models::{FoodUnit, MuscleGroup};

const EXERCISES: &[(&str, MuscleGroup)] = &[
    ("Incline Press", MuscleGroup::Push),
    ("Flat Bench Press", MuscleGroup::Push),
    ("Overhead Press (OHP)", MuscleGroup::Push),
    ("Lateral Raises", MuscleGroup::Push),
    ("Zindabad (Tricep Ext)", MuscleGroup::Push),
    ("Cable Flyes", MuscleGroup::Push),
    ("Pull-Ups", MuscleGroup::Pull),
    ("Lat Pulldown", MuscleGroup::Pull),
    ("Seated Cable Rows", MuscleGroup::Pull),
    ("Face Pulls", MuscleGroup::Pull),
    ("Hammer Curls", MuscleGroup::Pull),
    ("Bicep Curls", MuscleGroup::Pull),
    ("Deadhang", MuscleGroup::Pull),
    ("Barbell Squat", MuscleGroup::Legs),
    ("Romanian Deadlift (RDL)", MuscleGroup::Legs),
    ("Leg Extension", MuscleGroup::Legs),
    ("Leg Curls", MuscleGroup::Legs),
    ("Calf Raises", MuscleGroup::Legs),
    ("Cable Crunch", MuscleGroup::Core),
    ("Hanging Leg Raise", MuscleGroup::Core),
    ("Cable Woodchoppers", MuscleGroup::Core),
    ("Plank", MuscleGroup::Core),
];

// Values per 100 g, or per single unit/scoop
const STAPLE_FOODS: &[(&str, f64, f64, FoodUnit)] = &[
    ("chicken", 165.0, 31.0, FoodUnit::G),
    ("egg", 155.0, 13.0, FoodUnit::G),
    ("whey protein", 120.0, 24.0, FoodUnit::Scoop),
    ("greek yogurt", 59.0, 10.0, FoodUnit::G),
    ("tuna", 132.0, 28.0, FoodUnit::G),
    ("salmon", 208.0, 20.0, FoodUnit::G),
    ("beef", 250.0, 26.0, FoodUnit::G),
    ("paneer", 265.0, 18.0, FoodUnit::G),
    ("dal", 116.0, 9.0, FoodUnit::G),
    ("moong dal", 105.0, 7.0, FoodUnit::G),
    ("rajma", 127.0, 8.7, FoodUnit::G),
    ("chole", 164.0, 8.9, FoodUnit::G),
    ("dahi", 60.0, 3.5, FoodUnit::G),
    ("mutton", 294.0, 25.0, FoodUnit::G),
    ("fish", 206.0, 22.0, FoodUnit::G),
    ("oats", 389.0, 17.0, FoodUnit::G),
    ("rice", 130.0, 2.7, FoodUnit::G),
    ("brown rice", 112.0, 2.6, FoodUnit::G),
    ("pasta", 131.0, 5.0, FoodUnit::G),
    ("bread", 265.0, 9.0, FoodUnit::G),
    ("potato", 77.0, 2.0, FoodUnit::G),
    ("sweet potato", 86.0, 1.6, FoodUnit::G),
    ("roti", 71.0, 3.0, FoodUnit::Unit),
    ("naan", 262.0, 9.0, FoodUnit::Unit),
    ("paratha", 126.0, 3.0, FoodUnit::Unit),
    ("aloo paratha", 180.0, 4.0, FoodUnit::Unit),
    ("paneer paratha", 210.0, 8.0, FoodUnit::Unit),
    ("gobi paratha", 150.0, 4.0, FoodUnit::Unit),
    ("poha", 76.0, 1.8, FoodUnit::G),
    ("upma", 85.0, 2.5, FoodUnit::G),
    ("idli", 39.0, 2.0, FoodUnit::Unit),
    ("dosa", 133.0, 4.0, FoodUnit::Unit),
    ("samosa", 262.0, 4.0, FoodUnit::Unit),
    ("pakora", 150.0, 3.0, FoodUnit::Unit),
    ("biryani", 200.0, 6.0, FoodUnit::G),
    ("pulao", 180.0, 4.0, FoodUnit::G),
    ("peanut butter", 588.0, 25.0, FoodUnit::G),
    ("almonds", 579.0, 21.0, FoodUnit::G),
    ("walnuts", 654.0, 15.0, FoodUnit::G),
    ("cashews", 553.0, 18.0, FoodUnit::G),
    ("peanuts", 567.0, 26.0, FoodUnit::G),
    ("avocado", 160.0, 2.0, FoodUnit::G),
    ("ghee", 900.0, 0.0, FoodUnit::G),
    ("butter", 717.0, 0.9, FoodUnit::G),
    ("olive oil", 884.0, 0.0, FoodUnit::G),
    ("banana", 89.0, 1.1, FoodUnit::Unit),
    ("apple", 52.0, 0.3, FoodUnit::Unit),
    ("orange", 47.0, 0.9, FoodUnit::Unit),
    ("mango", 60.0, 0.8, FoodUnit::G),
    ("papaya", 43.0, 0.5, FoodUnit::G),
    ("watermelon", 30.0, 0.6, FoodUnit::G),
    ("grapes", 69.0, 0.7, FoodUnit::G),
    ("milk", 42.0, 3.4, FoodUnit::G),
    ("lassi", 59.0, 2.9, FoodUnit::G),
    ("buttermilk", 40.0, 3.3, FoodUnit::G),
    ("monster energy", 54.0, 0.0, FoodUnit::G),
    ("red bull", 45.0, 0.0, FoodUnit::G),
    ("hummus", 166.0, 8.0, FoodUnit::G),
    ("pizza", 266.0, 11.0, FoodUnit::G),
    ("burger", 295.0, 17.0, FoodUnit::Unit),
    ("sandwich", 250.0, 10.0, FoodUnit::Unit),
];

/// Fill the reference tables when they are empty.
pub(super) async fn seed_reference_data(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let exercises: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM exercises")
        .fetch_one(&mut *tx)
        .await?;
    if exercises == 0 {
        for (name, group) in EXERCISES {
            sqlx::query("INSERT INTO exercises (name, muscle_group, is_custom) VALUES (?, ?, 0)")
                .bind(*name)
                .bind(group.to_string())
                .execute(&mut *tx)
                .await?;
        }
        tracing::info!(count = EXERCISES.len(), "Seeded exercise catalogue");
    }

    let staples: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM staple_foods")
        .fetch_one(&mut *tx)
        .await?;
    if staples == 0 {
        for (name, calories, protein, unit) in STAPLE_FOODS {
            sqlx::query(
                "INSERT INTO staple_foods (name, calories, protein, unit) VALUES (?, ?, ?, ?)",
            )
            .bind(*name)
            .bind(*calories)
            .bind(*protein)
            .bind(unit.to_string())
            .execute(&mut *tx)
            .await?;
        }
        tracing::info!(count = STAPLE_FOODS.len(), "Seeded staple foods");
    }

    tx.commit().await
}
