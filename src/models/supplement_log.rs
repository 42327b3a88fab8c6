use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Adherence entry for one supplement on one day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupplementLog {
    pub date: NaiveDate,
    pub item_name: String,
    pub is_taken: bool,
    /// Slot in the daily schedule, e.g. `morning` or `night`.
    pub time_group: String,
}

impl SupplementLog {
    pub fn taken(date: NaiveDate, item_name: impl Into<String>, time_group: impl Into<String>) -> Self {
        Self {
            date,
            item_name: item_name.into(),
            is_taken: true,
            time_group: time_group.into(),
        }
    }
}

impl fmt::Display for SupplementLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.is_taken { "x" } else { " " };
        write!(f, "[{}] {} ({})", mark, self.item_name, self.time_group)
    }
}
