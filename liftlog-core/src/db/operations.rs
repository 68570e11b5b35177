use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::db::SETTINGS_KEY;
use crate::db::models::{Machine, Session, Settings, WorkoutSet};
use crate::error::{CoreError, Result};
use crate::units::Unit;

// Machines

pub async fn create_machine(
    pool: &SqlitePool,
    label: &str,
    muscle_group: Option<String>,
    image: Option<Vec<u8>>,
    thumbnail: Option<Vec<u8>>,
) -> Result<Machine> {
    if label.trim().is_empty() {
        return Err(CoreError::Validation("machine label must not be empty".into()));
    }
    let machine = sqlx::query_as::<_, Machine>(
        "INSERT INTO machines (label, muscle_group, image, thumbnail)
         VALUES (?1, ?2, ?3, ?4)
         RETURNING *",
    )
    .bind(label.trim())
    .bind(muscle_group)
    .bind(image)
    .bind(thumbnail)
    .fetch_one(pool)
    .await?;
    Ok(machine)
}

pub async fn get_machine(pool: &SqlitePool, machine_id: i64) -> Result<Option<Machine>> {
    let machine = sqlx::query_as::<_, Machine>("SELECT * FROM machines WHERE id = ?1")
        .bind(machine_id)
        .fetch_optional(pool)
        .await?;
    Ok(machine)
}

pub async fn get_all_machines(pool: &SqlitePool) -> Result<Vec<Machine>> {
    let machines = sqlx::query_as::<_, Machine>("SELECT * FROM machines ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(machines)
}

pub async fn update_machine(
    pool: &SqlitePool,
    machine_id: i64,
    label: &str,
    muscle_group: Option<String>,
    image: Option<Vec<u8>>,
    thumbnail: Option<Vec<u8>>,
) -> Result<Machine> {
    if label.trim().is_empty() {
        return Err(CoreError::Validation("machine label must not be empty".into()));
    }
    let machine = sqlx::query_as::<_, Machine>(
        "UPDATE machines
         SET label = ?2, muscle_group = ?3, image = ?4, thumbnail = ?5,
             updated_at = CAST(strftime('%s','now') AS INTEGER)
         WHERE id = ?1
         RETURNING *",
    )
    .bind(machine_id)
    .bind(label.trim())
    .bind(muscle_group)
    .bind(image)
    .bind(thumbnail)
    .fetch_one(pool)
    .await?;
    Ok(machine)
}

/// Delete a machine. Its sets go with it via the cascading foreign key.
pub async fn delete_machine(pool: &SqlitePool, machine_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM machines WHERE id = ?1")
        .bind(machine_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// Sessions

/// Find or create the unique session for a calendar date.
///
/// The upsert resolves both cases in one statement, so two logically
/// simultaneous calls for the same date cannot create duplicates.
pub async fn resolve_session(pool: &SqlitePool, date: &str) -> Result<Session> {
    if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
        return Err(CoreError::Validation(format!(
            "not an ISO-8601 calendar date: {date}"
        )));
    }
    let session = sqlx::query_as::<_, Session>(
        "INSERT INTO sessions (date) VALUES (?1)
         ON CONFLICT(date) DO UPDATE SET date = excluded.date
         RETURNING *",
    )
    .bind(date)
    .fetch_one(pool)
    .await?;
    Ok(session)
}

pub async fn get_session(pool: &SqlitePool, session_id: i64) -> Result<Option<Session>> {
    let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = ?1")
        .bind(session_id)
        .fetch_optional(pool)
        .await?;
    Ok(session)
}

pub async fn get_all_sessions(pool: &SqlitePool) -> Result<Vec<Session>> {
    let sessions = sqlx::query_as::<_, Session>("SELECT * FROM sessions ORDER BY date")
        .fetch_all(pool)
        .await?;
    Ok(sessions)
}

// Sets

/// Next ordinal for a (session, machine) pair: one past the highest index
/// ever assigned. Deleted sets leave gaps; nothing is renumbered.
pub async fn next_set_order(
    pool: &SqlitePool,
    session_id: i64,
    machine_id: i64,
) -> Result<i64> {
    let max_index: Option<i64> = sqlx::query_scalar(
        "SELECT MAX(set_index) FROM sets WHERE session_id = ?1 AND machine_id = ?2",
    )
    .bind(session_id)
    .bind(machine_id)
    .fetch_one(pool)
    .await?;
    Ok(max_index.map(|n| n + 1).unwrap_or(1))
}

fn validate_set(weight_kg: f64, reps: i64, rpe: Option<i64>) -> Result<()> {
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(CoreError::Validation(format!(
            "weight must be positive, got {weight_kg}"
        )));
    }
    if reps <= 0 {
        return Err(CoreError::Validation(format!(
            "reps must be positive, got {reps}"
        )));
    }
    if let Some(rpe) = rpe {
        if !(1..=10).contains(&rpe) {
            return Err(CoreError::Validation(format!(
                "rpe must be between 1 and 10, got {rpe}"
            )));
        }
    }
    Ok(())
}

pub async fn add_workout_set(
    pool: &SqlitePool,
    session_id: i64,
    machine_id: i64,
    weight_kg: f64,
    reps: i64,
    rpe: Option<i64>,
    notes: Option<String>,
) -> Result<WorkoutSet> {
    validate_set(weight_kg, reps, rpe)?;
    let set_index = next_set_order(pool, session_id, machine_id).await?;
    let set = sqlx::query_as::<_, WorkoutSet>(
        "INSERT INTO sets (session_id, machine_id, set_index, weight_kg, reps, rpe, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         RETURNING *",
    )
    .bind(session_id)
    .bind(machine_id)
    .bind(set_index)
    .bind(weight_kg)
    .bind(reps)
    .bind(rpe)
    .bind(notes)
    .fetch_one(pool)
    .await?;
    Ok(set)
}

pub async fn get_sets_for_machine(pool: &SqlitePool, machine_id: i64) -> Result<Vec<WorkoutSet>> {
    let sets = sqlx::query_as::<_, WorkoutSet>(
        "SELECT * FROM sets WHERE machine_id = ?1 ORDER BY id",
    )
    .bind(machine_id)
    .fetch_all(pool)
    .await?;
    Ok(sets)
}

pub async fn get_sets_for_session(pool: &SqlitePool, session_id: i64) -> Result<Vec<WorkoutSet>> {
    let sets = sqlx::query_as::<_, WorkoutSet>(
        "SELECT * FROM sets WHERE session_id = ?1 ORDER BY machine_id, set_index",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;
    Ok(sets)
}

pub async fn get_all_sets(pool: &SqlitePool) -> Result<Vec<WorkoutSet>> {
    let sets = sqlx::query_as::<_, WorkoutSet>("SELECT * FROM sets ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(sets)
}

pub async fn delete_set(pool: &SqlitePool, set_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sets WHERE id = ?1")
        .bind(set_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// Settings

pub async fn get_settings(pool: &SqlitePool) -> Result<Settings> {
    let settings = sqlx::query_as::<_, Settings>("SELECT * FROM settings WHERE key = ?1")
        .bind(SETTINGS_KEY)
        .fetch_one(pool)
        .await?;
    Ok(settings)
}

pub async fn set_display_unit(pool: &SqlitePool, unit: Unit) -> Result<()> {
    sqlx::query("UPDATE settings SET display_unit = ?2 WHERE key = ?1")
        .bind(SETTINGS_KEY)
        .bind(unit.as_str())
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_last_backup_at(pool: &SqlitePool, timestamp: &str) -> Result<()> {
    sqlx::query("UPDATE settings SET last_backup_at = ?2 WHERE key = ?1")
        .bind(SETTINGS_KEY)
        .bind(timestamp)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .unwrap();
        db::init_database(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn resolve_session_is_idempotent() {
        let pool = test_pool().await;
        let a = resolve_session(&pool, "2026-08-01").await.unwrap();
        let b = resolve_session(&pool, "2026-08-01").await.unwrap();
        let c = resolve_session(&pool, "2026-08-02").await.unwrap();
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
        assert_eq!(get_all_sessions(&pool).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn resolve_session_rejects_garbage_dates() {
        let pool = test_pool().await;
        assert!(matches!(
            resolve_session(&pool, "not-a-date").await,
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            resolve_session(&pool, "2026-13-01").await,
            Err(CoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn set_orders_follow_entry_order() {
        let pool = test_pool().await;
        let machine = create_machine(&pool, "Leg Press", None, None, None)
            .await
            .unwrap();
        let session = resolve_session(&pool, "2026-08-01").await.unwrap();

        assert_eq!(next_set_order(&pool, session.id, machine.id).await.unwrap(), 1);
        for expected in 1..=3 {
            let set = add_workout_set(&pool, session.id, machine.id, 80.0, 10, None, None)
                .await
                .unwrap();
            assert_eq!(set.set_index, expected);
        }
    }

    #[tokio::test]
    async fn deleting_a_set_never_renumbers() {
        let pool = test_pool().await;
        let machine = create_machine(&pool, "Chest Press", None, None, None)
            .await
            .unwrap();
        let session = resolve_session(&pool, "2026-08-01").await.unwrap();

        let first = add_workout_set(&pool, session.id, machine.id, 60.0, 8, None, None)
            .await
            .unwrap();
        add_workout_set(&pool, session.id, machine.id, 60.0, 8, None, None)
            .await
            .unwrap();
        delete_set(&pool, first.id).await.unwrap();

        // Two sets were ever logged, so the next ordinal is 3 even though
        // only one row remains.
        assert_eq!(next_set_order(&pool, session.id, machine.id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn machine_delete_cascades_to_sets() {
        let pool = test_pool().await;
        let machine = create_machine(&pool, "Lat Pulldown", None, None, None)
            .await
            .unwrap();
        let session = resolve_session(&pool, "2026-08-01").await.unwrap();
        add_workout_set(&pool, session.id, machine.id, 50.0, 12, Some(7), None)
            .await
            .unwrap();

        delete_machine(&pool, machine.id).await.unwrap();
        assert!(get_all_sets(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_validation_rejects_before_writing() {
        let pool = test_pool().await;
        let machine = create_machine(&pool, "Row", None, None, None).await.unwrap();
        let session = resolve_session(&pool, "2026-08-01").await.unwrap();

        for (weight, reps, rpe) in [(0.0, 10, None), (-5.0, 10, None), (50.0, 0, None), (50.0, 10, Some(11)), (50.0, 10, Some(0))] {
            assert!(matches!(
                add_workout_set(&pool, session.id, machine.id, weight, reps, rpe, None).await,
                Err(CoreError::Validation(_))
            ));
        }
        assert!(get_all_sets(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_machine_label_rejected() {
        let pool = test_pool().await;
        assert!(matches!(
            create_machine(&pool, "   ", None, None, None).await,
            Err(CoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn settings_row_seeded_with_defaults() {
        let pool = test_pool().await;
        let settings = get_settings(&pool).await.unwrap();
        assert_eq!(settings.display_unit, "kg");
        assert!(settings.last_backup_at.is_none());

        set_display_unit(&pool, Unit::Lb).await.unwrap();
        assert_eq!(get_settings(&pool).await.unwrap().display_unit, "lb");
    }
}
