//! Tunables for navigation and rendering.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "navigation": { "coarse_step_deg": 10.0 }, "render": { "max_radius": 8.0 } }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::projection::SkyCoord;
use crate::spectral::Rgb;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Input handling parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Angular step for w/a/s/d, in degrees at zoom 1
    pub fine_step_deg: f64,
    /// Angular step for the arrow keys, in degrees at zoom 1
    pub coarse_step_deg: f64,
    /// Fraction of the zoom removed per unit of scroll delta
    pub zoom_sensitivity: f64,
    /// RA swept by dragging across the full viewport width at zoom 1
    pub drag_ra_span_deg: f64,
    /// Dec swept by dragging across the full viewport height at zoom 1
    pub drag_dec_span_deg: f64,
    pub initial_center: SkyCoord,
    pub initial_zoom: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            fine_step_deg: 2.0,
            coarse_step_deg: 5.0,
            zoom_sensitivity: 1.0 / 1000.0,
            drag_ra_span_deg: 720.0,
            drag_dec_span_deg: 360.0,
            initial_center: SkyCoord::new(0.0, 0.0),
            initial_zoom: 1.0,
        }
    }
}

/// Frame rendering parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Magnitude that maps to unit luminosity at zoom 1
    pub reference_magnitude: f64,
    /// Objects considered per frame, per unit of zoom squared
    pub object_budget_per_zoom2: f64,
    pub min_alpha: f64,
    pub alpha_gain: f64,
    /// Glow radius in pixels per unit of luminosity
    pub radius_gain: f64,
    /// Largest glow radius in pixels
    pub max_radius: f64,
    pub background: Rgb,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            reference_magnitude: 1.0,
            object_budget_per_zoom2: 1000.0,
            min_alpha: 0.05,
            alpha_gain: 1.1,
            radius_gain: 4.0,
            max_radius: 6.0,
            background: Rgb::BLACK,
        }
    }
}

/// Complete sky map configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyMapConfig {
    pub navigation: NavigationConfig,
    pub render: RenderConfig,
}

impl SkyMapConfig {
    /// Load from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = SkyMapConfig::from_json_str(
            r#"{ "navigation": { "coarse_step_deg": 10.0 }, "render": { "max_radius": 8.0 } }"#,
        )
        .unwrap();

        assert_eq!(config.navigation.coarse_step_deg, 10.0);
        assert_eq!(config.navigation.fine_step_deg, 2.0);
        assert_eq!(config.render.max_radius, 8.0);
        assert_eq!(config.render.min_alpha, 0.05);
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(SkyMapConfig::from_json_str("{}").unwrap(), SkyMapConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skymap.json");

        let mut config = SkyMapConfig::default();
        config.navigation.initial_center = SkyCoord::new(83.8, -5.4);
        config.render.background = Rgb::new(0, 0, 16);
        config.save(&path).unwrap();

        assert_eq!(SkyMapConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            SkyMapConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SkyMapConfig::load("/nonexistent/skymap.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
