//! liftlog: a workout-tracking core.
//!
//! Machines, sessions and sets live in a local SQLite store; the analytics
//! layer computes estimated one-rep-max trends and training volume over
//! them, and the backup codec moves the whole store through a portable
//! JSON snapshot.

pub mod analytics;
pub mod backup;
pub mod db;
pub mod error;
pub mod estimator;
pub mod tracker;
pub mod units;

pub use error::{CoreError, Result};
pub use tracker::{ImportReport, Tracker};
pub use units::Unit;
