use serde::{Deserialize, Serialize};
use std::fmt;

/// Daily nutrition targets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSettings {
    pub calorie_target: f64,
    pub protein_target: f64,
}

impl UserSettings {
    pub fn new(calorie_target: f64, protein_target: f64) -> Self {
        Self {
            calorie_target,
            protein_target,
        }
    }
}

impl Default for UserSettings {
    fn default() -> Self {
        Self::new(2500.0, 150.0)
    }
}

impl fmt::Display for UserSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Calories: {} kcal", self.calorie_target)?;
        write!(f, "Protein:  {} g", self.protein_target)
    }
}
