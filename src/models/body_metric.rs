use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Body-weight measurement; at most one per owner and day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BodyMetric {
    pub date: NaiveDate,
    pub weight: f64, // kg
}

impl BodyMetric {
    pub fn new(date: NaiveDate, weight: f64) -> Self {
        Self { date, weight }
    }
}

impl fmt::Display for BodyMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} kg", self.date, self.weight)
    }
}
