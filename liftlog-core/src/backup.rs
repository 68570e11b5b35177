//! Portable snapshot document for backup and restore.
//!
//! The document is plain JSON. Identities inside it are only meaningful to
//! the document itself: import remaps every machine and session to freshly
//! generated identities and translates set references through those maps, so
//! a restored snapshot can never collide with rows already in the store.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use serde::{Deserialize, Serialize};

use crate::db::models::{Machine, Session, Settings, WorkoutSet};
use crate::error::{CoreError, Result};

/// Format version stamped into every exported document. Import rejects
/// anything else.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMachine {
    pub id: i64,
    pub label: String,
    pub muscle_group: Option<String>,
    /// Base64 (standard alphabet) of the full-resolution image blob.
    pub image: Option<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSession {
    pub id: i64,
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSet {
    pub id: i64,
    pub session_id: i64,
    pub machine_id: i64,
    pub set_index: i64,
    pub weight_kg: f64,
    pub reps: i64,
    pub rpe: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSettings {
    pub display_unit: String,
    pub last_backup_at: Option<String>,
}

/// The full relational snapshot: every collection plus format metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub exported_at: String,
    pub machines: Vec<SnapshotMachine>,
    pub sessions: Vec<SnapshotSession>,
    pub sets: Vec<SnapshotSet>,
    #[serde(default)]
    pub settings: Vec<SnapshotSettings>,
}

impl Snapshot {
    /// Parse and validate a snapshot document. A document that fails to
    /// parse, lacks a version or a required collection, or carries an
    /// unrecognized version is rejected outright.
    pub fn from_json(json: &str) -> Result<Snapshot> {
        let snapshot: Snapshot =
            serde_json::from_str(json).map_err(|e| CoreError::Format(e.to_string()))?;
        if snapshot.version != FORMAT_VERSION {
            return Err(CoreError::Format(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CoreError::Format(e.to_string()))
    }
}

impl SnapshotMachine {
    pub fn encode(machine: &Machine) -> SnapshotMachine {
        SnapshotMachine {
            id: machine.id,
            label: machine.label.clone(),
            muscle_group: machine.muscle_group.clone(),
            image: machine.image.as_deref().map(|b| B64.encode(b)),
            thumbnail: machine.thumbnail.as_deref().map(|b| B64.encode(b)),
        }
    }

    /// Decode the image representations back to blobs. Fails when the
    /// base64 payload is corrupt; import drops such machines.
    pub fn decode_images(&self) -> Result<(Option<Vec<u8>>, Option<Vec<u8>>)> {
        let decode = |field: &Option<String>| -> Result<Option<Vec<u8>>> {
            field
                .as_deref()
                .map(|s| {
                    B64.decode(s).map_err(|e| {
                        CoreError::Format(format!("bad image data for machine {}: {e}", self.id))
                    })
                })
                .transpose()
        };
        Ok((decode(&self.image)?, decode(&self.thumbnail)?))
    }
}

impl From<&Session> for SnapshotSession {
    fn from(session: &Session) -> Self {
        SnapshotSession {
            id: session.id,
            date: session.date.clone(),
        }
    }
}

impl From<&WorkoutSet> for SnapshotSet {
    fn from(set: &WorkoutSet) -> Self {
        SnapshotSet {
            id: set.id,
            session_id: set.session_id,
            machine_id: set.machine_id,
            set_index: set.set_index,
            weight_kg: set.weight_kg,
            reps: set.reps,
            rpe: set.rpe,
            notes: set.notes.clone(),
        }
    }
}

impl From<&Settings> for SnapshotSettings {
    fn from(settings: &Settings) -> Self {
        SnapshotSettings {
            display_unit: settings.display_unit.clone(),
            last_backup_at: settings.last_backup_at.clone(),
        }
    }
}
