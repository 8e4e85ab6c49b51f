//! Celestial-to-screen projection.
//!
//! Maps (RA, Dec) around a view center onto a viewport and back. The forward
//! transform places an object at its angular separation `rho` from the view
//! center, along its position angle `theta` measured from north through east:
//!
//! ```text
//! rho   = acos(sin δ0 sin δ + cos δ0 cos δ cos Δα)
//! theta = atan2(cos δ sin Δα, cos δ0 sin δ − sin δ0 cos δ cos Δα)
//! x     = w/2 + rho · sin(theta) · scale
//! y     = h/2 − rho · cos(theta) · scale
//! ```
//!
//! with `scale = height · zoom / 360` pixels per degree. North is up and RA
//! increases to the right.
//!
//! # Examples
//!
//! ```rust
//! use skymap::projection::{Projection, SkyCoord, ViewportSize};
//!
//! let projection = Projection::new(SkyCoord::new(0.0, 0.0), 4.0, ViewportSize::new(720.0, 360.0));
//!
//! // The view center lands in the middle of the viewport
//! let center = projection.project(SkyCoord::new(0.0, 0.0)).unwrap();
//! assert_eq!((center.x, center.y), (360.0, 180.0));
//!
//! // Four pixels per degree: 120° east lies beyond the right edge
//! assert!(projection.project(SkyCoord::new(120.0, 0.0)).is_none());
//! let east = projection.project(SkyCoord::new(45.0, 0.0)).unwrap();
//! assert!((east.x - 540.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::units::{acos_deg, asin_deg, atan2_deg, cos_deg, normalize_angle, sin_deg};

/// A position on the celestial sphere, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyCoord {
    /// Right ascension
    pub ra: f64,
    /// Declination
    pub dec: f64,
}

impl SkyCoord {
    pub const fn new(ra: f64, dec: f64) -> Self {
        Self { ra, dec }
    }
}

impl Default for SkyCoord {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Viewport dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when both dimensions are positive and finite
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// A pixel position inside the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// Projection for one view center, zoom and viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub center: SkyCoord,
    pub zoom: f64,
    pub size: ViewportSize,
}

impl Projection {
    pub fn new(center: SkyCoord, zoom: f64, size: ViewportSize) -> Self {
        Self { center, zoom, size }
    }

    /// Pixels per degree of angular separation
    pub fn scale(&self) -> f64 {
        self.size.height * self.zoom / 360.0
    }

    /// Screen position of a sky coordinate.
    ///
    /// Returns `None` when the point falls outside `[0, width] × [0, height]`
    /// or when the transform degenerates to a non-finite value.
    pub fn project(&self, coord: SkyCoord) -> Option<ScreenPoint> {
        let (x, y) = self.project_unclipped(coord)?;
        let inside = (0.0..=self.size.width).contains(&x) && (0.0..=self.size.height).contains(&y);
        inside.then_some(ScreenPoint { x, y })
    }

    /// Screen position without the viewport bounds check
    pub fn project_unclipped(&self, coord: SkyCoord) -> Option<(f64, f64)> {
        let (sin_d0, cos_d0) = (sin_deg(self.center.dec), cos_deg(self.center.dec));
        let (sin_d, cos_d) = (sin_deg(coord.dec), cos_deg(coord.dec));
        let delta_ra = coord.ra - self.center.ra;
        let cos_dra = cos_deg(delta_ra);

        let rho = acos_deg(sin_d0 * sin_d + cos_d0 * cos_d * cos_dra);
        let theta = atan2_deg(
            cos_d * sin_deg(delta_ra),
            cos_d0 * sin_d - sin_d0 * cos_d * cos_dra,
        );

        let scale = self.scale();
        let (cx, cy) = self.size.center();
        let x = cx + rho * sin_deg(theta) * scale;
        let y = cy - rho * cos_deg(theta) * scale;

        (x.is_finite() && y.is_finite()).then_some((x, y))
    }

    /// Sky coordinate under a screen position.
    ///
    /// Inverse of [`Projection::project`]. The result has RA wrapped into
    /// [0, 360) and Dec within [-90, 90]. Returns `None` for a degenerate
    /// projection (zero scale or non-finite input).
    pub fn screen_to_ra_dec(&self, x: f64, y: f64) -> Option<SkyCoord> {
        let scale = self.scale();
        if !(scale.is_finite() && scale > 0.0 && x.is_finite() && y.is_finite()) {
            return None;
        }

        let (cx, cy) = self.size.center();
        let east = (x - cx) / scale;
        let north = -(y - cy) / scale;
        let rho = east.hypot(north);
        let theta = atan2_deg(east, north);

        let (sin_d0, cos_d0) = (sin_deg(self.center.dec), cos_deg(self.center.dec));
        let (sin_rho, cos_rho) = (sin_deg(rho), cos_deg(rho));
        let (sin_theta, cos_theta) = (sin_deg(theta), cos_deg(theta));

        let dec = asin_deg(sin_d0 * cos_rho + cos_d0 * sin_rho * cos_theta);
        let ra = self.center.ra
            + atan2_deg(
                sin_rho * sin_theta,
                cos_d0 * cos_rho - sin_d0 * sin_rho * cos_theta,
            );

        Some(SkyCoord::new(normalize_angle(ra), dec))
    }
}

/// Free-function form of [`Projection::project`]
pub fn project(
    coord: SkyCoord,
    center: SkyCoord,
    zoom: f64,
    size: ViewportSize,
) -> Option<ScreenPoint> {
    Projection::new(center, zoom, size).project(coord)
}

/// Free-function form of [`Projection::screen_to_ra_dec`]
pub fn screen_to_ra_dec(
    x: f64,
    y: f64,
    center: SkyCoord,
    zoom: f64,
    size: ViewportSize,
) -> Option<SkyCoord> {
    Projection::new(center, zoom, size).screen_to_ra_dec(x, y)
}
