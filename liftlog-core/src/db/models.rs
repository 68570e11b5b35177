use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::error::Result;
use crate::units::Unit;

/// A piece of gym equipment that sets are logged against.
#[derive(Debug, Clone, FromRow)]
pub struct Machine {
    pub id: i64,
    pub label: String,
    pub muscle_group: Option<String>,
    pub image: Option<Vec<u8>>,
    pub thumbnail: Option<Vec<u8>>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One workout day. At most one session exists per calendar date.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: i64,
    pub date: String,
}

/// A single logged set. Weight is always stored in kilograms.
#[derive(Debug, Clone, FromRow)]
pub struct WorkoutSet {
    pub id: i64,
    pub session_id: i64,
    pub machine_id: i64,
    pub set_index: i64,
    pub weight_kg: f64,
    pub reps: i64,
    pub rpe: Option<i64>,
    pub notes: Option<String>,
    pub created_at: i64,
}

impl fmt::Display for WorkoutSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rpe_str = self.rpe.map(|r| format!(" @{r}")).unwrap_or_default();
        write!(
            f,
            "#{} {:.1}kg x {} reps{}",
            self.set_index, self.weight_kg, self.reps, rpe_str
        )
    }
}

/// The single global settings row, stored under a fixed key.
#[derive(Debug, Clone, FromRow)]
pub struct Settings {
    pub key: String,
    pub display_unit: String,
    pub last_backup_at: Option<String>,
}

impl Settings {
    pub fn unit(&self) -> Result<Unit> {
        Unit::from_str(&self.display_unit)
    }
}
