use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MuscleGroup {
    Push,
    Pull,
    Legs,
    Core,
    Run,
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MuscleGroup::Push => write!(f, "push"),
            MuscleGroup::Pull => write!(f, "pull"),
            MuscleGroup::Legs => write!(f, "legs"),
            MuscleGroup::Core => write!(f, "core"),
            MuscleGroup::Run => write!(f, "run"),
        }
    }
}

impl FromStr for MuscleGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "push" => Ok(MuscleGroup::Push),
            "pull" => Ok(MuscleGroup::Pull),
            "legs" => Ok(MuscleGroup::Legs),
            "core" => Ok(MuscleGroup::Core),
            "run" => Ok(MuscleGroup::Run),
            _ => Err(format!(
                "Invalid muscle group '{}'. Valid options: push, pull, legs, core, run",
                s
            )),
        }
    }
}

/// Catalogue entry referenced by workout logs. Built-in entries have no owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub muscle_group: MuscleGroup,
    pub is_custom: bool,
    pub user_id: Option<String>,
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>3}  {} [{}]", self.id, self.name, self.muscle_group)?;
        if self.is_custom {
            write!(f, " (custom)")?;
        }
        Ok(())
    }
}
