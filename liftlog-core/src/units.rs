//! Mass unit conversion between the canonical storage unit (kilograms)
//! and the display units.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Fixed conversion factors. These are independent constants, not exact
/// reciprocals of each other.
pub const KG_PER_LB: f64 = 0.453592;
pub const LB_PER_KG: f64 = 2.20462;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    Lb,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::Lb => "lb",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kg" => Ok(Unit::Kg),
            "lb" => Ok(Unit::Lb),
            other => Err(CoreError::Validation(format!("unknown unit: {other}"))),
        }
    }
}

/// Convert a weight between a display unit and kilograms.
///
/// With `to_canonical` set, `value` is interpreted in `unit` and the
/// kilogram equivalent is returned; otherwise `value` is interpreted in
/// kilograms and converted into `unit`. No rounding happens here; display
/// rounding is a presentation concern.
pub fn convert_weight(value: f64, unit: Unit, to_canonical: bool) -> f64 {
    match (unit, to_canonical) {
        (Unit::Kg, _) => value,
        (Unit::Lb, true) => value * KG_PER_LB,
        (Unit::Lb, false) => value * LB_PER_KG,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kg_is_identity_both_ways() {
        assert_eq!(convert_weight(80.0, Unit::Kg, true), 80.0);
        assert_eq!(convert_weight(80.0, Unit::Kg, false), 80.0);
    }

    #[test]
    fn lb_to_kg_uses_fixed_factor() {
        let kg = convert_weight(100.0, Unit::Lb, true);
        assert!((kg - 45.3592).abs() < 1e-9);
    }

    #[test]
    fn round_trip_within_tolerance() {
        for unit in [Unit::Kg, Unit::Lb] {
            for w in [1.0, 62.5, 100.0, 227.5] {
                let back = convert_weight(convert_weight(w, unit, true), unit, false);
                assert!((back - w).abs() < 1e-3, "{w} {unit} round-tripped to {back}");
            }
        }
    }

    #[test]
    fn unit_parses_and_rejects() {
        assert_eq!("kg".parse::<Unit>().unwrap(), Unit::Kg);
        assert_eq!("lb".parse::<Unit>().unwrap(), Unit::Lb);
        assert!("stone".parse::<Unit>().is_err());
    }
}
