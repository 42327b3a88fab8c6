use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NutritionLog {
    pub date: NaiveDate,
    pub item_name: String,
    pub calories: f64,
    pub protein: f64, // grams
    pub quantity: String,
}

impl NutritionLog {
    pub fn new(date: NaiveDate, item_name: impl Into<String>, calories: f64, protein: f64) -> Self {
        Self {
            date,
            item_name: item_name.into(),
            calories,
            protein,
            quantity: "1unit".to_string(),
        }
    }

    pub fn with_quantity(mut self, quantity: impl Into<String>) -> Self {
        self.quantity = quantity.into();
        self
    }
}

impl fmt::Display for NutritionLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {} kcal, {} g protein",
            self.item_name, self.quantity, self.calories, self.protein
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nutrition_log_new() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        let log = NutritionLog::new(date, "paneer", 265.0, 18.0).with_quantity("100g");

        assert_eq!(log.item_name, "paneer");
        assert_eq!(log.quantity, "100g");
    }

    #[test]
    fn test_display() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        let log = NutritionLog::new(date, "egg", 155.0, 13.0).with_quantity("2unit");
        assert_eq!(format!("{}", log), "egg (2unit): 155 kcal, 13 g protein");
    }
}
