//! Time-series aggregation over logged sets.
//!
//! Both functions are pure over in-memory rows; the [`Tracker`] methods load
//! the rows and compute the trailing-window cutoff before calling in here,
//! which keeps the aggregation deterministic under test.
//!
//! [`Tracker`]: crate::tracker::Tracker

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::db::models::{Session, WorkoutSet};
use crate::estimator::estimate_one_rep_max;
use crate::units::{Unit, convert_weight};

/// One charted day: the best estimated one-rep max and the total volume
/// (display-unit weight x reps) across every set logged that date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressPoint {
    pub date: String,
    pub e1rm: f64,
    pub volume: f64,
}

/// The single all-time best set by estimated one-rep max.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub e1rm: f64,
    pub date: String,
    pub set_id: i64,
}

fn date_by_session(sessions: &[Session]) -> HashMap<i64, &str> {
    sessions.iter().map(|s| (s.id, s.date.as_str())).collect()
}

/// Group sets by session date and produce an ascending-by-date series of
/// daily best e1RM and total volume.
///
/// `cutoff` is an optional inclusive lower-bound date. Dates are ISO-8601
/// strings, so lexicographic comparison is chronological comparison. A set
/// whose session is missing from `sessions` is skipped; the store does not
/// enforce that reference.
pub fn aggregate_progress(
    sets: &[WorkoutSet],
    sessions: &[Session],
    unit: Unit,
    cutoff: Option<&str>,
) -> Vec<ProgressPoint> {
    let dates = date_by_session(sessions);
    let mut by_date: HashMap<&str, (f64, f64)> = HashMap::new();

    for set in sets {
        let Some(date) = dates.get(&set.session_id).copied() else {
            debug!("skipping set {} with dangling session {}", set.id, set.session_id);
            continue;
        };
        if let Some(cutoff) = cutoff {
            if date < cutoff {
                continue;
            }
        }

        let e1rm = estimate_one_rep_max(set.weight_kg, set.reps);
        let display_weight = convert_weight(set.weight_kg, unit, false);
        let entry = by_date.entry(date).or_insert((0.0, 0.0));
        if e1rm > entry.0 {
            entry.0 = e1rm;
        }
        entry.1 += display_weight * set.reps as f64;
    }

    let mut points: Vec<ProgressPoint> = by_date
        .into_iter()
        .map(|(date, (e1rm, volume))| ProgressPoint {
            date: date.to_string(),
            e1rm,
            volume,
        })
        .collect();
    points.sort_by(|a, b| a.date.cmp(&b.date));
    points
}

/// Find the set with the globally maximum e1RM across the full collection.
///
/// Sets are walked in ascending-identity order with a strict comparison, so
/// the first-logged of any tied maxima wins deterministically.
pub fn find_personal_record(sets: &[WorkoutSet], sessions: &[Session]) -> Option<PersonalRecord> {
    let dates = date_by_session(sessions);

    let mut ordered: Vec<&WorkoutSet> = sets.iter().collect();
    ordered.sort_by_key(|s| s.id);

    let mut record: Option<PersonalRecord> = None;
    for set in ordered {
        let Some(date) = dates.get(&set.session_id).copied() else {
            debug!("skipping set {} with dangling session {}", set.id, set.session_id);
            continue;
        };
        let e1rm = estimate_one_rep_max(set.weight_kg, set.reps);
        if record.as_ref().is_none_or(|r| e1rm > r.e1rm) {
            record = Some(PersonalRecord {
                e1rm,
                date: date.to_string(),
                set_id: set.id,
            });
        }
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: i64, date: &str) -> Session {
        Session {
            id,
            date: date.to_string(),
        }
    }

    fn set(id: i64, session_id: i64, weight_kg: f64, reps: i64) -> WorkoutSet {
        WorkoutSet {
            id,
            session_id,
            machine_id: 1,
            set_index: 1,
            weight_kg,
            reps,
            rpe: None,
            notes: None,
            created_at: 0,
        }
    }

    fn fixtures() -> (Vec<WorkoutSet>, Vec<Session>) {
        let sessions = vec![
            session(1, "2026-08-01"),
            session(2, "2026-08-10"),
            session(3, "2026-08-20"),
        ];
        let sets = vec![
            set(1, 1, 100.0, 5),
            set(2, 1, 80.0, 10),
            set(3, 2, 105.0, 5),
            set(4, 3, 90.0, 8),
        ];
        (sets, sessions)
    }

    #[test]
    fn groups_by_date_ascending() {
        let (sets, sessions) = fixtures();
        let points = aggregate_progress(&sets, &sessions, Unit::Kg, None);

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].date, "2026-08-01");
        assert_eq!(points[1].date, "2026-08-10");
        assert_eq!(points[2].date, "2026-08-20");

        // Day one: best of e1RM(100x5)=116.67 and e1RM(80x10)=106.67,
        // volume 100*5 + 80*10.
        assert!((points[0].e1rm - 116.666_666).abs() < 1e-3);
        assert!((points[0].volume - 1300.0).abs() < 1e-9);
    }

    #[test]
    fn volume_respects_display_unit() {
        let (sets, sessions) = fixtures();
        let kg = aggregate_progress(&sets, &sessions, Unit::Kg, None);
        let lb = aggregate_progress(&sets, &sessions, Unit::Lb, None);
        assert!((lb[0].volume - kg[0].volume * 2.20462).abs() < 1e-6);
    }

    #[test]
    fn cutoff_is_inclusive_lower_bound() {
        let (sets, sessions) = fixtures();
        let points = aggregate_progress(&sets, &sessions, Unit::Kg, Some("2026-08-10"));
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, "2026-08-10");
    }

    #[test]
    fn dangling_session_is_skipped() {
        let (mut sets, sessions) = fixtures();
        sets.push(set(99, 999, 500.0, 1));
        let points = aggregate_progress(&sets, &sessions, Unit::Kg, None);
        assert_eq!(points.len(), 3);
        assert!(points.iter().all(|p| p.e1rm < 200.0));

        // The personal record must not come from the orphan either.
        let pr = find_personal_record(&sets, &sessions).unwrap();
        assert_ne!(pr.set_id, 99);
    }

    #[test]
    fn personal_record_picks_global_max() {
        let (sets, sessions) = fixtures();
        let pr = find_personal_record(&sets, &sessions).unwrap();
        assert_eq!(pr.set_id, 3);
        assert_eq!(pr.date, "2026-08-10");
        assert!((pr.e1rm - 122.5).abs() < 1e-3);
    }

    #[test]
    fn personal_record_tie_breaks_to_first_logged() {
        let sessions = vec![session(1, "2026-08-01"), session(2, "2026-08-02")];
        // Identical sets on different days: the earlier identity wins.
        let sets = vec![set(2, 2, 100.0, 5), set(1, 1, 100.0, 5)];
        let pr = find_personal_record(&sets, &sessions).unwrap();
        assert_eq!(pr.set_id, 1);
        assert_eq!(pr.date, "2026-08-01");
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(aggregate_progress(&[], &[], Unit::Kg, None).is_empty());
        assert!(find_personal_record(&[], &[]).is_none());
    }
}
