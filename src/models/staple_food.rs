use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodUnit {
    G,
    Oz,
    Unit,
    Scoop,
}

impl fmt::Display for FoodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoodUnit::G => write!(f, "g"),
            FoodUnit::Oz => write!(f, "oz"),
            FoodUnit::Unit => write!(f, "unit"),
            FoodUnit::Scoop => write!(f, "scoop"),
        }
    }
}

impl FromStr for FoodUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "g" => Ok(FoodUnit::G),
            "oz" => Ok(FoodUnit::Oz),
            "unit" => Ok(FoodUnit::Unit),
            "scoop" => Ok(FoodUnit::Scoop),
            _ => Err(format!(
                "Invalid unit '{}'. Valid options: g, oz, unit, scoop",
                s
            )),
        }
    }
}

/// Reference nutrition values for a common food, per 100 g or per single unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StapleFood {
    pub id: i64,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub unit: FoodUnit,
    pub user_id: Option<String>,
}

impl StapleFood {
    /// Calories and protein for `amount` of this food, in its own unit.
    pub fn portion(&self, amount: f64) -> (f64, f64) {
        let factor = match self.unit {
            FoodUnit::G => amount / 100.0,
            _ => amount,
        };
        (self.calories * factor, self.protein * factor)
    }
}

impl fmt::Display for StapleFood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let per = match self.unit {
            FoodUnit::G => "100g".to_string(),
            other => format!("1 {}", other),
        };
        write!(
            f,
            "{}: {} kcal, {} g protein per {}",
            self.name, self.calories, self.protein, per
        )
    }
}
