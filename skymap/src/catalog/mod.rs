//! Star catalog compilation and loading.
//!
//! Compilation runs once, offline: source rows are classified, renamed and
//! packed into the binary format described in [`codec`]. At runtime the
//! binary buffer is decoded back into [`CelestialObject`]s.
//!
//! # Examples
//!
//! ```rust
//! use skymap::catalog::{compile_catalog, Catalog, SourceRecord};
//! use skymap::spectral::ColorTable;
//!
//! let rows = SourceRecord::parse_json(r#"[
//!     [1, "NAME Sun", "*", 0.0, 0.0, 0, 0, 0, 1000.0, "G2V", null, -26.7],
//!     [2, "NAME Mystery", "*", 10.0, 5.0, 0, 0, 0, 1.0, null, null, 5.0]
//! ]"#).unwrap();
//!
//! let compiled = compile_catalog(&rows, "CC BY 4.0", ColorTable::builtin(), None).unwrap();
//! assert_eq!(compiled.report.written, 1);
//! assert_eq!(compiled.report.skipped_null_type, 1);
//!
//! let catalog = Catalog::decode(&compiled.bytes).unwrap();
//! assert_eq!(catalog.objects[0].name, "Sun");
//! ```

pub mod codec;
pub mod names;
pub mod record;

pub use codec::CodecError;
pub use names::{display_name, ProperNames};
pub use record::{CelestialObject, SourceRecord};

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::spectral::{ColorTable, SpectralClassifier};

/// Errors from loading, compiling or saving catalogs
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("Invalid source JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Summary of one compilation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeReport {
    /// Records written to the catalog
    pub written: usize,
    /// Records without a spectral type
    pub skipped_null_type: usize,
    /// Records whose spectral type could not be classified
    pub skipped_unclassified: usize,
    /// Distinct raw spectral types that could not be classified
    pub unclassified: BTreeSet<String>,
    /// Ids of records whose display name exceeded 255 bytes
    pub rejected_long_names: Vec<u32>,
}

impl EncodeReport {
    /// Total records dropped from the output
    pub fn dropped(&self) -> usize {
        self.skipped_null_type + self.skipped_unclassified + self.rejected_long_names.len()
    }
}

/// Output of [`compile_catalog`]
#[derive(Debug, Clone)]
pub struct CompiledCatalog {
    pub bytes: Vec<u8>,
    pub report: EncodeReport,
}

/// A decoded catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    /// License / attribution text preceding the records
    pub license: String,
    pub objects: Vec<CelestialObject>,
}

impl Catalog {
    pub fn new(license: impl Into<String>, objects: Vec<CelestialObject>) -> Self {
        Self {
            license: license.into(),
            objects,
        }
    }

    /// Decode a binary catalog buffer
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let (license, objects) = codec::decode(bytes)?;
        Ok(Self { license, objects })
    }

    /// Encode into the binary catalog format
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        codec::encode(&self.license, &self.objects)
    }

    /// Read and decode a binary catalog file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let bytes = fs::read(path.as_ref())?;
        let catalog = Self::decode(&bytes)?;
        log::info!(
            "Loaded {} objects from {}",
            catalog.len(),
            path.as_ref().display()
        );
        Ok(catalog)
    }

    /// Encode and write to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CatalogError> {
        fs::write(path, self.encode()?)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Convert source rows into catalog objects.
///
/// Rows without a spectral type, with an unclassifiable one, or with a
/// display name too long for the format are dropped and counted in the
/// report. Classification misses never stop the pass.
pub fn prepare_objects(
    records: &[SourceRecord],
    table: &ColorTable,
    proper_names: Option<&ProperNames>,
) -> (Vec<CelestialObject>, EncodeReport) {
    let classifier = SpectralClassifier::new(table);
    let mut report = EncodeReport::default();
    let mut objects = Vec::with_capacity(records.len());

    for record in records {
        let Some(spectral_type) = record.spectral_type.as_deref() else {
            report.skipped_null_type += 1;
            continue;
        };

        let color = match classifier.classify(spectral_type) {
            Ok(color) => color,
            Err(miss) => {
                log::debug!("Dropping object {}: {miss}", record.id);
                report.skipped_unclassified += 1;
                report.unclassified.insert(miss.0);
                continue;
            }
        };

        let name = display_name(&record.primary_name, proper_names);
        let obj = CelestialObject::from_source(record, name, color);
        if let Err(err) = codec::validate_record(&obj) {
            log::warn!("Rejecting object {}: {err}", record.id);
            report.rejected_long_names.push(record.id);
            continue;
        }
        objects.push(obj);
    }

    report.written = objects.len();
    (objects, report)
}

/// Run a full compilation pass: classify, rename, drop and encode.
///
/// The set of unclassified spectral types is logged once at the end.
pub fn compile_catalog(
    records: &[SourceRecord],
    license: &str,
    table: &ColorTable,
    proper_names: Option<&ProperNames>,
) -> Result<CompiledCatalog, CatalogError> {
    let (objects, report) = prepare_objects(records, table, proper_names);
    let bytes = codec::encode(license, &objects)?;

    log::info!(
        "Compiled {} of {} records ({} bytes)",
        report.written,
        records.len(),
        bytes.len()
    );
    if !report.unclassified.is_empty() {
        log::warn!(
            "{} missing spectral types: {:?}",
            report.unclassified.len(),
            report.unclassified
        );
    }

    Ok(CompiledCatalog { bytes, report })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"[
        [1, "* alf CMa", "SB*", 101.287, -16.716, -546.0, -1223.0, -5.5, 379.21, "A1V", null, -1.46],
        [2, "NAME Nowhere", "*", 10.0, 10.0, 0, 0, 0, 1.0, null, null, 9.0],
        [3, "HD 1", "*", 20.0, 20.0, 0, 0, 0, 1.0, "Q9", null, 9.0],
        [4, "HD 2", "*", 30.0, 30.0, 0, 0, 0, 1.0, "Q9", null, 9.0],
        [5, "HD 3", "*", 40.0, 40.0, 0, 0, 0, 1.0, "K0III", null, 4.0]
    ]"#;

    #[test]
    fn test_prepare_objects_drops_and_reports() {
        let rows = SourceRecord::parse_json(SOURCE).unwrap();
        let mut names = ProperNames::default();
        names.insert("α Canis Majoris", "Sirius");

        let (objects, report) = prepare_objects(&rows, ColorTable::builtin(), Some(&names));

        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].name, "Sirius (α Canis Majoris)");
        assert_eq!(objects[1].id, 5);
        assert_eq!(report.written, 2);
        assert_eq!(report.skipped_null_type, 1);
        assert_eq!(report.skipped_unclassified, 2);
        assert_eq!(report.unclassified.len(), 1);
        assert!(report.unclassified.contains("Q9"));
        assert_eq!(report.dropped(), 3);
    }

    #[test]
    fn test_long_names_rejected() {
        let long = "x".repeat(300);
        let json = format!(
            r#"[[1, "NAME {long}", "*", 0, 0, 0, 0, 0, 1.0, "G2V", null, 1.0],
                [2, "NAME ok", "*", 0, 0, 0, 0, 0, 1.0, "G2V", null, 1.0]]"#
        );
        let rows = SourceRecord::parse_json(&json).unwrap();
        let compiled = compile_catalog(&rows, "L", ColorTable::builtin(), None).unwrap();
        assert_eq!(compiled.report.rejected_long_names, vec![1]);

        let catalog = Catalog::decode(&compiled.bytes).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.objects[0].name, "ok");
    }

    #[test]
    fn test_save_and_load() {
        let rows = SourceRecord::parse_json(SOURCE).unwrap();
        let (mut objects, _) = prepare_objects(&rows, ColorTable::builtin(), None);
        // type labels are not part of the binary format
        for obj in &mut objects {
            obj.object_type = None;
        }
        let catalog = Catalog::new("Attribution", objects);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("objects.bin");
        catalog.save(&path).unwrap();
        let loaded = Catalog::load(&path).unwrap();

        assert_eq!(loaded, catalog);
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.bin");
        std::fs::write(&path, b"license only").unwrap();
        assert!(matches!(
            Catalog::load(&path),
            Err(CatalogError::Codec(CodecError::MissingTerminator))
        ));
    }
}
