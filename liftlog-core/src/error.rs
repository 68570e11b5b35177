use thiserror::Error;

/// Error taxonomy for the core.
///
/// Dangling machine/session references are deliberately absent: the store
/// enforces no referential integrity for sessions, so aggregation and import
/// skip such rows instead of failing.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoreError {
    /// Rejected before any store mutation; the caller should correct the
    /// input and retry.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Malformed or unversioned snapshot document; the import is aborted
    /// with no partial merge.
    #[error("unrecognized snapshot format: {0}")]
    Format(String),

    /// Another snapshot import or export on the same store is in flight.
    #[error("a snapshot operation is already in progress")]
    SnapshotBusy,

    /// Underlying storage engine failure; not retried.
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
