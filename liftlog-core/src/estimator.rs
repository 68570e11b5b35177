//! Estimated one-rep-max computation.

/// Epley estimate: w * (1 + r / 30).
pub fn epley(weight_kg: f64, reps: i64) -> f64 {
    weight_kg * (1.0 + reps as f64 / 30.0)
}

/// Brzycki estimate: w * 36 / (37 - r).
///
/// The formula degenerates at 37 reps (division by zero) and goes negative
/// beyond, so it is excluded there.
pub fn brzycki(weight_kg: f64, reps: i64) -> Option<f64> {
    if reps >= 37 {
        return None;
    }
    Some(weight_kg * 36.0 / (37.0 - reps as f64))
}

/// Estimated one-rep max for a set: the larger of the Epley and Brzycki
/// estimates, falling back to Epley alone when Brzycki is undefined.
pub fn estimate_one_rep_max(weight_kg: f64, reps: i64) -> f64 {
    let epley = epley(weight_kg, reps);
    match brzycki(weight_kg, reps) {
        Some(brzycki) => epley.max(brzycki),
        None => epley,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hundred_kg_five_reps() {
        // Epley 116.67 beats Brzycki 112.5.
        assert!((epley(100.0, 5) - 116.666_666).abs() < 1e-3);
        assert!((brzycki(100.0, 5).unwrap() - 112.5).abs() < 1e-9);
        assert!((estimate_one_rep_max(100.0, 5) - 116.666_666).abs() < 1e-3);
    }

    #[test]
    fn brzycki_wins_at_higher_reps() {
        // Above ~10 reps Brzycki overtakes Epley.
        let e = epley(100.0, 12);
        let b = brzycki(100.0, 12).unwrap();
        assert!(b > e);
        assert_eq!(estimate_one_rep_max(100.0, 12), b);
    }

    #[test]
    fn estimate_never_below_lifted_weight() {
        for reps in 1..=36 {
            let est = estimate_one_rep_max(100.0, reps);
            assert!(est >= 100.0, "estimate {est} below weight at {reps} reps");
        }
    }

    #[test]
    fn brzycki_excluded_at_37_and_beyond() {
        assert!(brzycki(100.0, 37).is_none());
        assert!(brzycki(100.0, 50).is_none());
        // Falls back to Epley alone, which stays positive and finite.
        let est = estimate_one_rep_max(100.0, 40);
        assert!((est - epley(100.0, 40)).abs() < 1e-9);
        assert!(est.is_finite() && est > 0.0);
    }
}
