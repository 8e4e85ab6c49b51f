//! Physical constants and degree-based angle helpers.
//!
//! All angles in this crate are carried in degrees. The trigonometric helpers
//! here convert to radians internally so callers never juggle both units.

use std::f64::consts::PI;

/// Astronomical unit in meters
pub const AU: f64 = 149_597_870_700.0;

/// Parsec in meters (648000 / π astronomical units)
pub const PARSEC: f64 = 648_000.0 * AU / PI;

/// Sine of an angle given in degrees
pub fn sin_deg(x: f64) -> f64 {
    x.to_radians().sin()
}

/// Cosine of an angle given in degrees
pub fn cos_deg(x: f64) -> f64 {
    x.to_radians().cos()
}

/// Arc sine returning degrees.
///
/// The argument is clamped to [-1, 1] first; rounding in the spherical
/// formulas can push it a hair outside the domain.
pub fn asin_deg(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).asin().to_degrees()
}

/// Arc cosine returning degrees, with the same clamping as [`asin_deg`]
pub fn acos_deg(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Two-argument arc tangent returning degrees
pub fn atan2_deg(y: f64, x: f64) -> f64 {
    y.atan2(x).to_degrees()
}

/// Wrap an angle into [0, 360).
///
/// Non-finite input is mapped to 0 so a bad value can never leak into the
/// view center.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Clamp a declination into [-90, 90]. No wraparound over the poles.
pub fn normalize_dec(dec: f64) -> f64 {
    if dec.is_nan() {
        return 0.0;
    }
    dec.clamp(-90.0, 90.0)
}

/// Distance in meters for a parallax, `PARSEC / parallax`.
///
/// Missing or non-positive parallaxes carry no distance information and
/// map to `+inf`.
pub fn parallax_to_distance(parallax: Option<f64>) -> f64 {
    match parallax {
        Some(p) if p > 0.0 && p.is_finite() => PARSEC / p,
        _ => f64::INFINITY,
    }
}
