use chrono::{NaiveDate, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::backup::{FORMAT_VERSION, Snapshot, SnapshotMachine, SnapshotSession, SnapshotSet, SnapshotSettings};
use crate::db::operations::{
    get_all_machines, get_all_sessions, get_all_sets, get_settings, set_last_backup_at,
};
use crate::error::{CoreError, Result};
use crate::tracker::Tracker;

/// Row counts actually written by a merge. Rows the codec dropped as
/// malformed or dangling are not counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported_machines: u64,
    pub imported_sessions: u64,
    pub imported_sets: u64,
}

impl Tracker {
    /// Serialize the full store into a portable snapshot document and stamp
    /// the backup timestamp in settings.
    pub async fn export_snapshot(&self) -> Result<Snapshot> {
        let _guard = self
            .snapshot_guard
            .try_lock()
            .map_err(|_| CoreError::SnapshotBusy)?;

        let machines = get_all_machines(&self.db_pool).await?;
        let sessions = get_all_sessions(&self.db_pool).await?;
        let sets = get_all_sets(&self.db_pool).await?;
        let settings = get_settings(&self.db_pool).await?;

        let exported_at = Utc::now().to_rfc3339();
        let snapshot = Snapshot {
            version: FORMAT_VERSION,
            exported_at: exported_at.clone(),
            machines: machines.iter().map(SnapshotMachine::encode).collect(),
            sessions: sessions.iter().map(SnapshotSession::from).collect(),
            sets: sets.iter().map(SnapshotSet::from).collect(),
            settings: vec![SnapshotSettings::from(&settings)],
        };

        set_last_backup_at(&self.db_pool, &exported_at).await?;
        info!(
            "exported snapshot: {} machines, {} sessions, {} sets",
            snapshot.machines.len(),
            snapshot.sessions.len(),
            snapshot.sets.len()
        );
        Ok(snapshot)
    }

    /// Merge a snapshot into the store.
    ///
    /// Source identities are never reused: every accepted machine gets a
    /// fresh row, sessions are resolved through the one-session-per-date
    /// upsert, and set references are translated through the resulting
    /// old-to-new maps before any set row is written. A set whose machine or
    /// session fails to translate is skipped, never aborting the merge. The
    /// whole merge runs in one transaction, so dependent set writes only
    /// ever see fully settled machine and session identities.
    ///
    /// Incoming settings rows are ignored: local display preferences win.
    pub async fn import_snapshot(&self, snapshot: &Snapshot) -> Result<ImportReport> {
        let _guard = self
            .snapshot_guard
            .try_lock()
            .map_err(|_| CoreError::SnapshotBusy)?;

        // Guards snapshots constructed in code; `Snapshot::from_json`
        // already rejects this for documents read from disk.
        if snapshot.version != FORMAT_VERSION {
            return Err(CoreError::Format(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }

        let mut tx = self.db_pool.begin().await?;

        let mut machine_map: HashMap<i64, i64> = HashMap::new();
        for machine in &snapshot.machines {
            if machine.label.trim().is_empty() {
                warn!("dropping machine {} with empty label", machine.id);
                continue;
            }
            let (image, thumbnail) = match machine.decode_images() {
                Ok(blobs) => blobs,
                Err(e) => {
                    warn!("dropping machine {}: {e}", machine.id);
                    continue;
                }
            };
            let new_id: i64 = sqlx::query_scalar(
                "INSERT INTO machines (label, muscle_group, image, thumbnail)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING id",
            )
            .bind(machine.label.trim())
            .bind(&machine.muscle_group)
            .bind(image)
            .bind(thumbnail)
            .fetch_one(&mut *tx)
            .await?;
            machine_map.insert(machine.id, new_id);
        }

        let mut session_map: HashMap<i64, i64> = HashMap::new();
        for session in &snapshot.sessions {
            if NaiveDate::parse_from_str(&session.date, "%Y-%m-%d").is_err() {
                warn!("dropping session {} with bad date {:?}", session.id, session.date);
                continue;
            }
            let new_id: i64 = sqlx::query_scalar(
                "INSERT INTO sessions (date) VALUES (?1)
                 ON CONFLICT(date) DO UPDATE SET date = excluded.date
                 RETURNING id",
            )
            .bind(&session.date)
            .fetch_one(&mut *tx)
            .await?;
            session_map.insert(session.id, new_id);
        }

        let mut imported_sets: u64 = 0;
        for set in &snapshot.sets {
            let (Some(&machine_id), Some(&session_id)) = (
                machine_map.get(&set.machine_id),
                session_map.get(&set.session_id),
            ) else {
                debug!(
                    "dropping set {}: unresolved machine {} or session {}",
                    set.id, set.machine_id, set.session_id
                );
                continue;
            };
            if !set.weight_kg.is_finite() || set.weight_kg <= 0.0 || set.reps <= 0 {
                debug!("dropping malformed set {}", set.id);
                continue;
            }
            sqlx::query(
                "INSERT INTO sets (session_id, machine_id, set_index, weight_kg, reps, rpe, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(session_id)
            .bind(machine_id)
            .bind(set.set_index)
            .bind(set.weight_kg)
            .bind(set.reps)
            .bind(set.rpe)
            .bind(&set.notes)
            .execute(&mut *tx)
            .await?;
            imported_sets += 1;
        }

        tx.commit().await?;

        let report = ImportReport {
            imported_machines: machine_map.len() as u64,
            imported_sessions: session_map.len() as u64,
            imported_sets,
        };
        info!(
            "imported snapshot: {} machines, {} sessions, {} sets",
            report.imported_machines, report.imported_sessions, report.imported_sets
        );
        Ok(report)
    }
}
