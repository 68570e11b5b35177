use log::info;

use crate::db::models::{Session, WorkoutSet};
use crate::db::operations::{
    add_workout_set, delete_set, get_sets_for_machine, get_sets_for_session, next_set_order,
    resolve_session,
};
use crate::error::{CoreError, Result};
use crate::tracker::Tracker;
use crate::units::{Unit, convert_weight};

impl Tracker {
    /// Find or create the session for a calendar date.
    pub async fn resolve_session(&self, date: &str) -> Result<Session> {
        resolve_session(&self.db_pool, date).await
    }

    /// Ordinal the next set logged for this (session, machine) pair will
    /// receive.
    pub async fn next_set_order(&self, session_id: i64, machine_id: i64) -> Result<i64> {
        next_set_order(&self.db_pool, session_id, machine_id).await
    }

    /// The full entry pipeline: normalize the weight to kilograms, attach
    /// the set to the session for `date`, assign its ordinal and persist.
    #[allow(clippy::too_many_arguments)]
    pub async fn log_set(
        &self,
        date: &str,
        machine_id: i64,
        weight: f64,
        unit: Unit,
        reps: i64,
        rpe: Option<i64>,
        notes: Option<String>,
    ) -> Result<WorkoutSet> {
        if self.get_machine(machine_id).await?.is_none() {
            return Err(CoreError::Validation(format!("no machine with id {machine_id}")));
        }
        let weight_kg = convert_weight(weight, unit, true);
        let session = self.resolve_session(date).await?;
        let set = add_workout_set(
            &self.db_pool,
            session.id,
            machine_id,
            weight_kg,
            reps,
            rpe,
            notes,
        )
        .await?;
        info!(
            "logged set {} for machine {} on {}: {:.1}kg x {}",
            set.set_index, machine_id, date, weight_kg, reps
        );
        Ok(set)
    }

    pub async fn sets_for_machine(&self, machine_id: i64) -> Result<Vec<WorkoutSet>> {
        get_sets_for_machine(&self.db_pool, machine_id).await
    }

    pub async fn sets_for_session(&self, session_id: i64) -> Result<Vec<WorkoutSet>> {
        get_sets_for_session(&self.db_pool, session_id).await
    }

    pub async fn delete_set(&self, set_id: i64) -> Result<u64> {
        delete_set(&self.db_pool, set_id).await
    }
}
