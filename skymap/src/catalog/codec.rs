//! Binary catalog format.
//!
//! Little-endian, sequential, no padding:
//!
//! ```text
//! license text      arbitrary length, no NUL bytes
//! 0x00              terminator
//! record_count      u32
//! record * record_count:
//!     id            u32
//!     ra            f32  degrees
//!     dec           f32  degrees
//!     pm_ra         f32
//!     pm_dec        f32
//!     rvel          f32
//!     dist          f32
//!     mag           f32
//!     r, g, b       u8 x 3
//!     name_len      u8
//!     name          name_len bytes, UTF-8
//! ```
//!
//! Encoding validates every record before the first byte is written, so a
//! rejected record can never leave a count that disagrees with the records
//! that follow it.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use std::io::Write;
use thiserror::Error;

use super::record::CelestialObject;
use crate::spectral::Rgb;

/// Bytes of fixed numeric fields per record (id + seven f32)
pub const RECORD_HEADER_LEN: usize = 32;

/// Smallest possible record: header, color, name length, empty name
pub const MIN_RECORD_LEN: usize = RECORD_HEADER_LEN + 3 + 1;

/// Longest name that fits the one-byte length prefix
pub const MAX_NAME_LEN: usize = u8::MAX as usize;

/// Errors produced while reading or writing the binary catalog format
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("License block is not NUL-terminated")]
    MissingTerminator,
    #[error("License text contains a NUL byte at offset {0}")]
    LicenseContainsNul(usize),
    #[error("Catalog truncated at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("Catalog declares {declared} records but the remaining bytes hold at most {max_possible}")]
    CountUnreachable { declared: u32, max_possible: usize },
    #[error("Name of object {id} is {len} bytes, longer than 255")]
    NameTooLong { id: u32, len: usize },
    #[error("Too many records for a u32 count: {0}")]
    TooManyRecords(usize),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Whether this error describes a malformed catalog buffer
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            CodecError::MissingTerminator
                | CodecError::Truncated { .. }
                | CodecError::CountUnreachable { .. }
        )
    }
}

/// Check that an object can be written
pub fn validate_record(obj: &CelestialObject) -> Result<(), CodecError> {
    let len = obj.name.len();
    if len > MAX_NAME_LEN {
        return Err(CodecError::NameTooLong { id: obj.id, len });
    }
    Ok(())
}

/// Write one record
pub fn write_record<W: Write>(writer: &mut W, obj: &CelestialObject) -> Result<(), CodecError> {
    validate_record(obj)?;

    writer.write_u32::<LittleEndian>(obj.id)?;
    for value in [
        obj.ra, obj.dec, obj.pm_ra, obj.pm_dec, obj.rvel, obj.dist, obj.mag,
    ] {
        writer.write_f32::<LittleEndian>(value)?;
    }
    writer.write_all(&obj.color.to_array())?;
    writer.write_u8(obj.name.len() as u8)?;
    writer.write_all(obj.name.as_bytes())?;
    Ok(())
}

/// Write a full catalog: license, terminator, count and records.
///
/// Nothing is written if any record fails validation.
pub fn write_catalog<W: Write>(
    writer: &mut W,
    license: &str,
    objects: &[CelestialObject],
) -> Result<(), CodecError> {
    if let Some(offset) = license.bytes().position(|b| b == 0) {
        return Err(CodecError::LicenseContainsNul(offset));
    }
    let count =
        u32::try_from(objects.len()).map_err(|_| CodecError::TooManyRecords(objects.len()))?;
    for obj in objects {
        validate_record(obj)?;
    }

    writer.write_all(license.as_bytes())?;
    writer.write_u8(0)?;
    writer.write_u32::<LittleEndian>(count)?;
    for obj in objects {
        write_record(writer, obj)?;
    }
    Ok(())
}

/// Encode a full catalog into a new buffer
pub fn encode(license: &str, objects: &[CelestialObject]) -> Result<Vec<u8>, CodecError> {
    let body: usize = objects
        .iter()
        .map(|obj| MIN_RECORD_LEN + obj.name.len())
        .sum();
    let mut buffer = Vec::with_capacity(license.len() + 5 + body);
    write_catalog(&mut buffer, license, objects)?;
    Ok(buffer)
}

/// Decode a catalog buffer into its license text and objects.
///
/// Fails on a missing terminator, a count that cannot fit in the remaining
/// bytes, or a record cut short. No partial result is returned.
pub fn decode(buffer: &[u8]) -> Result<(String, Vec<CelestialObject>), CodecError> {
    let terminator = buffer
        .iter()
        .position(|&b| b == 0)
        .ok_or(CodecError::MissingTerminator)?;
    let license = String::from_utf8_lossy(&buffer[..terminator]).into_owned();

    let mut reader = SliceReader::new(buffer, terminator + 1);
    let declared = reader.read_u32()?;

    let max_possible = reader.remaining() / MIN_RECORD_LEN;
    if declared as usize > max_possible {
        return Err(CodecError::CountUnreachable {
            declared,
            max_possible,
        });
    }

    let mut objects = Vec::with_capacity(declared as usize);
    for _ in 0..declared {
        objects.push(read_record(&mut reader)?);
    }

    if reader.remaining() > 0 {
        log::warn!(
            "Ignoring {} trailing bytes after {} catalog records",
            reader.remaining(),
            declared
        );
    }
    log::debug!("Decoded {} catalog objects", objects.len());

    Ok((license, objects))
}

fn read_record(reader: &mut SliceReader<'_>) -> Result<CelestialObject, CodecError> {
    let id = reader.read_u32()?;
    let ra = reader.read_f32()?;
    let dec = reader.read_f32()?;
    let pm_ra = reader.read_f32()?;
    let pm_dec = reader.read_f32()?;
    let rvel = reader.read_f32()?;
    let dist = reader.read_f32()?;
    let mag = reader.read_f32()?;
    let rgb = reader.take(3)?;
    let color = Rgb::new(rgb[0], rgb[1], rgb[2]);
    let name_len = reader.read_u8()? as usize;
    let name = decode_name(reader.take(name_len)?);

    let mut obj = CelestialObject {
        id,
        name,
        object_type: None,
        ra,
        dec,
        pm_ra,
        pm_dec,
        rvel,
        dist,
        mag,
        color,
    };
    obj.normalize_coordinates();
    Ok(obj)
}

/// UTF-8 names are kept verbatim; anything else is read as Latin-1
fn decode_name(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(name) => name.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Bounds-checked cursor over a byte slice
struct SliceReader<'a> {
    buffer: &'a [u8],
    pos: usize,
}

impl<'a> SliceReader<'a> {
    fn new(buffer: &'a [u8], pos: usize) -> Self {
        Self { buffer, pos }
    }

    fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.pos)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::Truncated {
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            });
        }
        let slice = &self.buffer[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    fn read_f32(&mut self) -> Result<f32, CodecError> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }
}
