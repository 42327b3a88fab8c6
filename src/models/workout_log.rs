use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A single logged set (or run) inside a workout session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutLog {
    pub workout_session_id: Uuid,
    pub exercise_id: i64,
    pub set_number: i32,
    pub weight: f64, // kg
    pub reps: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>, // km
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>, // minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl WorkoutLog {
    pub fn new(
        workout_session_id: Uuid,
        exercise_id: i64,
        set_number: i32,
        weight: f64,
        reps: i32,
    ) -> Self {
        Self {
            workout_session_id,
            exercise_id,
            set_number,
            weight,
            reps,
            distance: None,
            duration: None,
            notes: None,
            // Stored with millisecond precision
            timestamp: Utc::now().trunc_subsecs(3),
        }
    }

    pub fn with_distance(mut self, km: f64) -> Self {
        self.distance = Some(km);
        self
    }

    pub fn with_duration(mut self, minutes: f64) -> Self {
        self.duration = Some(minutes);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp.trunc_subsecs(3);
        self
    }

    /// Total load moved by this set.
    pub fn volume(&self) -> f64 {
        self.weight * f64::from(self.reps)
    }
}

impl fmt::Display for WorkoutLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Set {}: {} kg x {}", self.set_number, self.weight, self.reps)?;
        if let Some(distance) = self.distance {
            write!(f, ", {} km", distance)?;
        }
        if let Some(duration) = self.duration {
            write!(f, ", {} min", duration)?;
        }
        if let Some(notes) = &self.notes {
            write!(f, " ({})", notes)?;
        }
        Ok(())
    }
}
