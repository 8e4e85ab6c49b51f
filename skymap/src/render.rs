//! Frame construction.
//!
//! A render pass reads the viewport state and the decoded objects and
//! produces a [`Frame`]: a list of draw commands plus the HUD text. Nothing
//! is drawn here; [`crate::raster`] or any other backend executes the
//! commands.

use std::fmt;

use crate::catalog::CelestialObject;
use crate::config::RenderConfig;
use crate::projection::{SkyCoord, ViewportSize};
use crate::spectral::Rgb;
use crate::units::normalize_angle;
use crate::viewport::{ViewportController, ViewportState};

/// A radial glow: opacity `alpha` at the center falling linearly to zero at
/// `radius`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: Rgb,
    pub alpha: f64,
}

impl Glow {
    /// Radius of the disc the glow is filled over
    pub fn extent(&self) -> f64 {
        self.radius * 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole viewport
    Clear(Rgb),
    Glow(Glow),
}

/// View center readout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hud {
    /// Right ascension as `HH:MM:SS`
    pub ra: String,
    /// Declination in degrees, three decimals
    pub dec: String,
}

impl Hud {
    pub fn new(center: SkyCoord) -> Self {
        Self {
            ra: format_ra(center.ra),
            dec: format_dec(center.dec),
        }
    }
}

impl fmt::Display for Hud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RA {}  Dec {}", self.ra, self.dec)
    }
}

/// Right ascension in degrees as sexagesimal hours, `HH:MM:SS`.
///
/// Each field is floored and wrapped, so 359.999° reads `23:59:59`.
pub fn format_ra(ra: f64) -> String {
    let ra = normalize_angle(ra);
    let hours = (ra / 15.0).floor() as u32 % 24;
    let minutes = (ra * 4.0).floor() as u32 % 60;
    let seconds = (ra * 240.0).floor() as u32 % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

pub fn format_dec(dec: f64) -> String {
    format!("{dec:.3}")
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub size: ViewportSize,
    pub commands: Vec<DrawCommand>,
    pub hud: Hud,
}

impl Frame {
    pub fn glows(&self) -> impl Iterator<Item = &Glow> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Glow(glow) => Some(glow),
            DrawCommand::Clear(_) => None,
        })
    }
}

/// Turns viewport state and catalog objects into frames
#[derive(Debug, Clone, Default)]
pub struct SkyRenderer {
    config: RenderConfig,
}

impl SkyRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Number of objects, in catalog order, considered at a zoom level
    pub fn object_budget(&self, total: usize, zoom: f64) -> usize {
        let budget = (zoom * zoom * self.config.object_budget_per_zoom2).round();
        if budget.is_finite() && budget >= 0.0 {
            total.min(budget as usize)
        } else if budget > 0.0 {
            total
        } else {
            0
        }
    }

    /// Glow radius and alpha for a magnitude at a zoom level.
    ///
    /// Returns `None` when the brightness is not a finite positive number.
    pub fn glow_shape(&self, mag: f64, zoom: f64) -> Option<(f64, f64)> {
        let reference = self.config.reference_magnitude;
        let max_lum = 10f64.powf(-0.4 * reference);
        let lum = 10f64.powf(-0.4 * (mag - reference)) / max_lum * zoom;
        if !(lum.is_finite() && lum > 0.0) {
            return None;
        }
        let alpha = (lum * self.config.alpha_gain).min(1.0).max(self.config.min_alpha);
        let radius = (lum * self.config.radius_gain).min(self.config.max_radius);
        Some((radius, alpha))
    }

    /// Build the frame for a view.
    ///
    /// Objects beyond the zoom budget, off screen, or with a degenerate
    /// brightness are left out.
    pub fn render_frame(
        &self,
        objects: &[CelestialObject],
        view: &ViewportState,
        size: ViewportSize,
    ) -> Frame {
        let projection = view.projection(size);
        let budget = self.object_budget(objects.len(), view.zoom);

        let mut commands = Vec::with_capacity(budget + 1);
        commands.push(DrawCommand::Clear(self.config.background));

        for obj in &objects[..budget] {
            let coord = SkyCoord::new(obj.ra as f64, obj.dec as f64);
            let Some(point) = projection.project(coord) else {
                continue;
            };
            let Some((radius, alpha)) = self.glow_shape(obj.mag as f64, view.zoom) else {
                continue;
            };
            commands.push(DrawCommand::Glow(Glow {
                x: point.x,
                y: point.y,
                radius,
                color: obj.color,
                alpha,
            }));
        }

        log::trace!(
            "Frame at zoom {:.2}: {} of {} budgeted objects visible",
            view.zoom,
            commands.len() - 1,
            budget
        );

        Frame {
            size,
            commands,
            hud: Hud::new(view.center),
        }
    }

    /// Build the frame for a controller's current view, or `None` while the
    /// info overlay is open
    pub fn render(
        &self,
        objects: &[CelestialObject],
        controller: &ViewportController,
    ) -> Option<Frame> {
        if controller.info_open() {
            return None;
        }
        Some(self.render_frame(objects, controller.state(), controller.size()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NavigationConfig;
    use crate::viewport::InputEvent;
    use approx::assert_relative_eq;
    use rstest::rstest;

    const SIZE: ViewportSize = ViewportSize::new(800.0, 400.0);

    fn star(id: u32, ra: f32, dec: f32, mag: f32) -> CelestialObject {
        CelestialObject {
            id,
            name: format!("star {id}"),
            object_type: None,
            ra,
            dec,
            pm_ra: 0.0,
            pm_dec: 0.0,
            rvel: 0.0,
            dist: 1.0,
            mag,
            color: Rgb::new(255, 200, 100),
        }
    }

    #[rstest]
    #[case(0.0, "00:00:00")]
    #[case(15.0, "01:00:00")]
    #[case(83.633, "05:34:31")]
    #[case(359.999, "23:59:59")]
    #[case(360.0, "00:00:00")]
    #[case(-15.0, "23:00:00")]
    fn test_format_ra(#[case] ra: f64, #[case] expected: &str) {
        assert_eq!(format_ra(ra), expected);
    }

    #[test]
    fn test_hud() {
        let hud = Hud::new(SkyCoord::new(90.0, -16.71611));
        assert_eq!(hud.ra, "06:00:00");
        assert_eq!(hud.dec, "-16.716");
        assert_eq!(hud.to_string(), "RA 06:00:00  Dec -16.716");
    }

    #[test]
    fn test_glow_shape() {
        let renderer = SkyRenderer::default();

        // Magnitude 1 at zoom 1: lum = 10^0.4
        let (radius, alpha) = renderer.glow_shape(1.0, 1.0).unwrap();
        assert_relative_eq!(radius, 6.0);
        assert_relative_eq!(alpha, 1.0);

        // Faint stars bottom out at the minimum alpha
        let (radius, alpha) = renderer.glow_shape(12.0, 1.0).unwrap();
        assert!(radius < 0.01);
        assert_relative_eq!(alpha, 0.05);

        // lum = 10^(-0.4 * 3) / 10^(-0.4) = 10^-0.8
        let (radius, alpha) = renderer.glow_shape(4.0, 1.0).unwrap();
        let lum = 10f64.powf(-0.8);
        assert_relative_eq!(radius, lum * 4.0, epsilon = 1e-12);
        assert_relative_eq!(alpha, lum * 1.1, epsilon = 1e-12);

        assert!(renderer.glow_shape(f64::NAN, 1.0).is_none());
    }

    #[test]
    fn test_glow_brightens_with_zoom() {
        let renderer = SkyRenderer::default();
        let (r1, a1) = renderer.glow_shape(5.0, 1.0).unwrap();
        let (r2, a2) = renderer.glow_shape(5.0, 2.0).unwrap();
        assert_relative_eq!(r2, r1 * 2.0, epsilon = 1e-12);
        assert!(a2 > a1);
    }

    #[rstest]
    #[case(10_000, 1.0, 1000)]
    #[case(10_000, 2.0, 4000)]
    #[case(10_000, 1.5, 2250)]
    #[case(500, 1.0, 500)]
    #[case(10_000, 100.0, 10_000)]
    fn test_object_budget(#[case] total: usize, #[case] zoom: f64, #[case] expected: usize) {
        assert_eq!(SkyRenderer::default().object_budget(total, zoom), expected);
    }

    #[test]
    fn test_frame_starts_with_clear_and_skips_off_screen() {
        let objects = vec![
            star(1, 0.0, 0.0, 1.0),
            star(2, 10.0, 5.0, 3.0),
            star(3, 180.0, 0.0, 1.0),
            star(4, 0.0, -80.0, 1.0),
        ];
        let renderer = SkyRenderer::default();
        let view = ViewportState::new(SkyCoord::default(), 4.0);
        let frame = renderer.render_frame(&objects, &view, SIZE);

        assert_eq!(frame.commands[0], DrawCommand::Clear(Rgb::BLACK));
        let glows: Vec<_> = frame.glows().collect();
        assert_eq!(glows.len(), 2);
        assert_relative_eq!(glows[0].x, 400.0, epsilon = 1e-3);
        assert_relative_eq!(glows[0].y, 200.0, epsilon = 1e-3);
        assert_eq!(glows[0].color, Rgb::new(255, 200, 100));
        assert!(glows[1].x > 400.0 && glows[1].y < 200.0);
        assert_eq!(frame.hud.ra, "00:00:00");
    }

    #[test]
    fn test_frame_respects_budget() {
        let objects: Vec<_> = (0..1500).map(|i| star(i, 0.0, 0.0, 6.0)).collect();
        let renderer = SkyRenderer::default();

        let frame = renderer.render_frame(&objects, &ViewportState::default(), SIZE);
        assert_eq!(frame.glows().count(), 1000);

        let zoomed = ViewportState::new(SkyCoord::default(), 2.0);
        let frame = renderer.render_frame(&objects, &zoomed, SIZE);
        assert_eq!(frame.glows().count(), 1500);
    }

    #[test]
    fn test_no_frame_while_info_open() {
        let objects = vec![star(1, 0.0, 0.0, 1.0)];
        let renderer = SkyRenderer::default();
        let mut controller = ViewportController::new(NavigationConfig::default(), SIZE);

        assert!(renderer.render(&objects, &controller).is_some());
        controller.handle_event(InputEvent::ToggleInfo);
        assert!(renderer.render(&objects, &controller).is_none());
    }
}
