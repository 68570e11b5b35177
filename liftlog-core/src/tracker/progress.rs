use chrono::{Local, NaiveDate, TimeDelta};

use crate::analytics::{self, PersonalRecord, ProgressPoint};
use crate::db::operations::{get_all_sessions, get_sets_for_machine};
use crate::error::Result;
use crate::tracker::Tracker;
use crate::units::Unit;

/// Inclusive lower-bound date for a trailing window ending at `today`.
/// A window so large it underflows the calendar covers all history, so
/// overflow collapses to no cutoff at all.
fn window_cutoff(today: NaiveDate, range_days: i64) -> Option<NaiveDate> {
    TimeDelta::try_days(range_days).and_then(|delta| today.checked_sub_signed(delta))
}

impl Tracker {
    /// Daily best-e1RM / volume series for one machine, ascending by date.
    ///
    /// `range_days` limits the series to a trailing window ending today;
    /// the lower bound is inclusive.
    pub async fn aggregate_progress(
        &self,
        machine_id: i64,
        unit: Unit,
        range_days: Option<i64>,
    ) -> Result<Vec<ProgressPoint>> {
        let sets = get_sets_for_machine(&self.db_pool, machine_id).await?;
        let sessions = get_all_sessions(&self.db_pool).await?;
        let cutoff = range_days
            .and_then(|days| window_cutoff(Local::now().date_naive(), days))
            .map(|date| date.format("%Y-%m-%d").to_string());
        Ok(analytics::aggregate_progress(
            &sets,
            &sessions,
            unit,
            cutoff.as_deref(),
        ))
    }

    /// All-time best set for one machine by estimated one-rep max,
    /// regardless of any display window.
    pub async fn find_personal_record(&self, machine_id: i64) -> Result<Option<PersonalRecord>> {
        let sets = get_sets_for_machine(&self.db_pool, machine_id).await?;
        let sessions = get_all_sessions(&self.db_pool).await?;
        Ok(analytics::find_personal_record(&sets, &sessions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn progress_only_covers_the_requested_machine() {
        let tracker = Tracker::open_in_memory().await.unwrap();
        let press = tracker.add_machine("Press", None, None, None).await.unwrap();
        let row = tracker.add_machine("Row", None, None, None).await.unwrap();

        tracker
            .log_set("2026-08-01", press.id, 100.0, Unit::Kg, 5, None, None)
            .await
            .unwrap();
        tracker
            .log_set("2026-08-01", row.id, 200.0, Unit::Kg, 5, None, None)
            .await
            .unwrap();

        let points = tracker.aggregate_progress(press.id, Unit::Kg, None).await.unwrap();
        assert_eq!(points.len(), 1);
        assert!((points[0].e1rm - 116.666_666).abs() < 1e-3);

        let pr = tracker.find_personal_record(press.id).await.unwrap().unwrap();
        assert!((pr.e1rm - 116.666_666).abs() < 1e-3);
        assert_eq!(pr.date, "2026-08-01");
    }

    #[test]
    fn window_cutoff_collapses_on_overflow() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert_eq!(
            window_cutoff(today, 30),
            NaiveDate::from_ymd_opt(2026, 7, 31)
        );
        // Windows wider than the calendar mean "all history".
        assert_eq!(window_cutoff(today, 100_000_000), None);
        assert_eq!(window_cutoff(today, i64::MAX), None);
    }

    #[tokio::test]
    async fn oversized_range_covers_all_history() {
        let tracker = Tracker::open_in_memory().await.unwrap();
        let machine = tracker.add_machine("Hack Squat", None, None, None).await.unwrap();
        tracker
            .log_set("2026-08-01", machine.id, 120.0, Unit::Kg, 5, None, None)
            .await
            .unwrap();

        let points = tracker
            .aggregate_progress(machine.id, Unit::Kg, Some(i64::MAX))
            .await
            .unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].date, "2026-08-01");
    }

    #[tokio::test]
    async fn no_sets_means_no_record() {
        let tracker = Tracker::open_in_memory().await.unwrap();
        let machine = tracker.add_machine("Dip Station", None, None, None).await.unwrap();
        assert!(tracker.find_personal_record(machine.id).await.unwrap().is_none());
        assert!(tracker.aggregate_progress(machine.id, Unit::Kg, Some(30)).await.unwrap().is_empty());
    }
}
