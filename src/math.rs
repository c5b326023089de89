//! Math utilities exposed to units.
//!
//! All functions are pure. Angles are in degrees, matching `srot`.

/// Absolute value.
#[must_use]
pub fn abs(v: f64) -> f64 {
    v.abs()
}

/// Round toward negative infinity.
#[must_use]
pub fn floor(v: f64) -> f64 {
    v.floor()
}

/// Round toward positive infinity.
#[must_use]
pub fn ceil(v: f64) -> f64 {
    v.ceil()
}

/// Sign of `v`: -1, 0 or 1. NaN maps to 0.
#[must_use]
pub fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Smaller of two values. A NaN operand yields the other one.
#[must_use]
pub fn min(a: f64, b: f64) -> f64 {
    a.min(b)
}

/// Larger of two values. A NaN operand yields the other one.
#[must_use]
pub fn max(a: f64, b: f64) -> f64 {
    a.max(b)
}

/// Clamp `v` into `[lo, hi]`.
///
/// Bounds given in reverse order are swapped. A NaN `v` yields the lower bound.
#[must_use]
pub fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    if v.is_nan() || v < lo {
        lo
    } else if v > hi {
        hi
    } else {
        v
    }
}

/// Sine of an angle in degrees.
#[must_use]
pub fn sin(degrees: f64) -> f64 {
    degrees.to_radians().sin()
}

/// Cosine of an angle in degrees.
#[must_use]
pub fn cos(degrees: f64) -> f64 {
    degrees.to_radians().cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign() {
        assert!((sign(-3.5) + 1.0).abs() < f64::EPSILON);
        assert!(sign(0.0).abs() < f64::EPSILON);
        assert!((sign(12.0) - 1.0).abs() < f64::EPSILON);
        assert!(sign(f64::NAN).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clamp_swapped_bounds() {
        assert!((clamp(5.0, 10.0, 0.0) - 5.0).abs() < f64::EPSILON);
        assert!((clamp(-1.0, 10.0, 0.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clamp_nan() {
        assert!((clamp(f64::NAN, 2.0, 4.0) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_trig_degrees() {
        assert!((sin(90.0) - 1.0).abs() < 1e-12);
        assert!((cos(180.0) + 1.0).abs() < 1e-12);
        assert!(sin(0.0).abs() < 1e-12);
    }

    #[test]
    fn test_floor_ceil() {
        assert!((floor(-1.5) + 2.0).abs() < f64::EPSILON);
        assert!((ceil(-1.5) + 1.0).abs() < f64::EPSILON);
        assert!((abs(-2.25) - 2.25).abs() < f64::EPSILON);
        assert!((min(1.0, 2.0) - 1.0).abs() < f64::EPSILON);
        assert!((max(1.0, 2.0) - 2.0).abs() < f64::EPSILON);
    }
}
