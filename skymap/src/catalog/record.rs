//! Source rows and decoded catalog objects.

use serde::{Deserialize, Serialize};
use std::io::Read;

use crate::spectral::Rgb;
use crate::units::{normalize_angle, normalize_dec, parallax_to_distance};

/// One row of the source catalog JSON.
///
/// The source is an array of fixed-position arrays:
///
/// ```text
/// [id, primaryName, typeLabel, ra, dec, pmRa, pmDec, rvel, parallax,
///  spectralType|null, secondaryLabel|null, magnitude]
/// ```
///
/// Proper motions and radial velocity default to 0 when null. A null
/// parallax leaves the distance unknown.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "SourceRow")]
pub struct SourceRecord {
    pub id: u32,
    pub primary_name: String,
    pub type_label: Option<String>,
    /// Right ascension in degrees
    pub ra: f64,
    /// Declination in degrees
    pub dec: f64,
    pub pm_ra: f64,
    pub pm_dec: f64,
    pub rvel: f64,
    pub parallax: Option<f64>,
    pub spectral_type: Option<String>,
    pub secondary_label: Option<String>,
    pub magnitude: f64,
}

#[derive(Deserialize)]
struct SourceRow(
    u32,
    String,
    Option<String>,
    f64,
    f64,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    Option<String>,
    Option<String>,
    f64,
);

impl From<SourceRow> for SourceRecord {
    fn from(row: SourceRow) -> Self {
        Self {
            id: row.0,
            primary_name: row.1,
            type_label: row.2,
            ra: row.3,
            dec: row.4,
            pm_ra: row.5.unwrap_or(0.0),
            pm_dec: row.6.unwrap_or(0.0),
            rvel: row.7.unwrap_or(0.0),
            parallax: row.8,
            spectral_type: row.9,
            secondary_label: row.10,
            magnitude: row.11,
        }
    }
}

impl SourceRecord {
    /// Parse a whole source catalog from a JSON string
    pub fn parse_json(json: &str) -> Result<Vec<SourceRecord>, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse a whole source catalog from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<SourceRecord>, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    /// Distance in meters derived from the parallax
    pub fn distance(&self) -> f64 {
        parallax_to_distance(self.parallax)
    }
}

/// A decoded catalog entry.
///
/// Every object carries a color; entries whose spectral type cannot be
/// classified never make it into a catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CelestialObject {
    /// Identifier, unique within a catalog
    pub id: u32,
    /// Display name (at most 255 bytes of UTF-8 once encoded)
    pub name: String,
    /// Object type label. Not stored in the binary catalog, so decoded
    /// objects always carry `None`.
    pub object_type: Option<String>,
    /// Right ascension in degrees, [0, 360)
    pub ra: f32,
    /// Declination in degrees, [-90, 90]
    pub dec: f32,
    pub pm_ra: f32,
    pub pm_dec: f32,
    /// Radial velocity
    pub rvel: f32,
    /// Distance in meters
    pub dist: f32,
    /// Apparent magnitude
    pub mag: f32,
    pub color: Rgb,
}

impl CelestialObject {
    /// Build an object from a source row, its resolved color and its
    /// display name
    pub fn from_source(record: &SourceRecord, name: String, color: Rgb) -> Self {
        let mut obj = Self {
            id: record.id,
            name,
            object_type: record.type_label.clone(),
            ra: normalize_angle(record.ra) as f32,
            dec: normalize_dec(record.dec) as f32,
            pm_ra: record.pm_ra as f32,
            pm_dec: record.pm_dec as f32,
            rvel: record.rvel as f32,
            dist: record.distance() as f32,
            mag: record.magnitude as f32,
            color,
        };
        // RA just below 360 can round up to 360.0 in f32
        obj.normalize_coordinates();
        obj
    }

    /// Re-apply the coordinate invariants after reading raw values.
    ///
    /// Values already in range pass through bit-identical.
    pub(crate) fn normalize_coordinates(&mut self) {
        if !(0.0..360.0).contains(&self.ra) {
            self.ra = normalize_angle(self.ra as f64) as f32;
        }
        if !(-90.0..=90.0).contains(&self.dec) {
            self.dec = normalize_dec(self.dec as f64) as f32;
        }
    }
}
