//! The `Tracker` facade the presentation layer talks to.
//!
//! One struct owns the connection pool; its methods are split across the
//! files in this module by concern (machines, sets, progress, backup,
//! settings).

mod backup;
mod machines;
mod progress;
mod settings;
mod sets;

pub use backup::ImportReport;

use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::db;
use crate::error::Result;

pub struct Tracker {
    pub db_pool: SqlitePool,
    /// Serializes snapshot import/export; a second snapshot operation on
    /// the same store fails fast instead of racing identity generation.
    snapshot_guard: Mutex<()>,
}

impl Tracker {
    /// Open (creating if missing) the store at `db_path` and bring its
    /// schema up to date.
    pub async fn open(db_path: &str) -> Result<Self> {
        let pool = db::connect(db_path).await?;
        db::init_database(&pool).await?;
        Ok(Self {
            db_pool: pool,
            snapshot_guard: Mutex::new(()),
        })
    }

    /// In-memory store, mainly for tests and dry runs.
    pub async fn open_in_memory() -> Result<Self> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;
        db::init_database(&pool).await?;
        Ok(Self {
            db_pool: pool,
            snapshot_guard: Mutex::new(()),
        })
    }

    /// Wipe every machine, session and set. Settings survive.
    pub async fn clear_store(&self) -> Result<()> {
        db::drop_all_rows(&self.db_pool).await
    }
}
