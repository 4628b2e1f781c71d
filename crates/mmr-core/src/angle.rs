//! Angle reduction helpers.

use std::f64::consts::{PI, TAU};

/// Reduces an angle in radians into the principal range (−π, π].
///
/// Values already inside the range are returned untouched, which makes the
/// reduction idempotent down to the last bit.
pub fn cutoff_angle(value: f64) -> f64 {
    if value > -PI && value <= PI {
        return value;
    }
    let reduced = value.rem_euclid(TAU);
    if reduced > PI {
        reduced - TAU
    } else {
        reduced
    }
}

/// Shifts a phase by π and reduces it, moving a libration centre at ±π to zero.
pub fn apocentric(value: f64) -> f64 {
    cutoff_angle(value + PI)
}
