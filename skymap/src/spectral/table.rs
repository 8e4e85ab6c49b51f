//! Spectral-type color lookup table.
//!
//! The table is keyed by a three-level hierarchy for the main sequence
//! classes (class letter → subclass digit → luminosity numeral) and by a flat
//! subclass digit for the special classes. Carbon stars share one color.
//!
//! The built-in table is compiled from `data/spectral_type_colors.json` and
//! parsed once on first use. Custom tables can be built with
//! [`ColorTable::from_json_str`] or assembled entry by entry.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of subclass digits per class (0-9)
pub const SUBCLASS_COUNT: usize = 10;

const BUILTIN_DATASET: &str = include_str!("../../data/spectral_type_colors.json");

static BUILTIN_TABLE: Lazy<ColorTable> = Lazy::new(|| {
    ColorTable::from_json_str(BUILTIN_DATASET).expect("Built-in spectral color dataset is invalid")
});

/// Errors raised while building a color table from a dataset
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Invalid color '{0}', expected #rrggbb")]
    InvalidColor(String),
    #[error("Invalid subclass key '{0}', expected a single digit 0-9")]
    InvalidSubclass(String),
    #[error("Unknown luminosity class '{0}'")]
    UnknownLuminosity(String),
    #[error("Unknown spectral class key '{0}'")]
    UnknownClass(String),
    #[error("Malformed dataset: {0}")]
    Json(#[from] serde_json::Error),
}

/// An 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

impl FromStr for Rgb {
    type Err = TableError;

    /// Parse `#rrggbb`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TableError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Harvard main-sequence classes, hottest to coolest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MainClass {
    O,
    B,
    A,
    F,
    G,
    K,
    M,
}

impl MainClass {
    pub const ALL: [MainClass; 7] = [
        MainClass::O,
        MainClass::B,
        MainClass::A,
        MainClass::F,
        MainClass::G,
        MainClass::K,
        MainClass::M,
    ];

    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'O' => Some(MainClass::O),
            'B' => Some(MainClass::B),
            'A' => Some(MainClass::A),
            'F' => Some(MainClass::F),
            'G' => Some(MainClass::G),
            'K' => Some(MainClass::K),
            'M' => Some(MainClass::M),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            MainClass::O => 'O',
            MainClass::B => 'B',
            MainClass::A => 'A',
            MainClass::F => 'F',
            MainClass::G => 'G',
            MainClass::K => 'K',
            MainClass::M => 'M',
        }
    }

    /// The next cooler class, or `None` for M
    pub fn next(self) -> Option<Self> {
        match self {
            MainClass::O => Some(MainClass::B),
            MainClass::B => Some(MainClass::A),
            MainClass::A => Some(MainClass::F),
            MainClass::F => Some(MainClass::G),
            MainClass::G => Some(MainClass::K),
            MainClass::K => Some(MainClass::M),
            MainClass::M => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for MainClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Yerkes luminosity class numeral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Luminosity {
    I,
    II,
    III,
    IV,
    V,
}

impl Luminosity {
    pub const ALL: [Luminosity; 5] = [
        Luminosity::I,
        Luminosity::II,
        Luminosity::III,
        Luminosity::IV,
        Luminosity::V,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Luminosity::I => "I",
            Luminosity::II => "II",
            Luminosity::III => "III",
            Luminosity::IV => "IV",
            Luminosity::V => "V",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for Luminosity {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "I" => Ok(Luminosity::I),
            "II" => Ok(Luminosity::II),
            "III" => Ok(Luminosity::III),
            "IV" => Ok(Luminosity::IV),
            "V" => Ok(Luminosity::V),
            other => Err(TableError::UnknownLuminosity(other.to_string())),
        }
    }
}

impl fmt::Display for Luminosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wolf-Rayet subtypes (nitrogen or carbon dominated)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WolfRayet {
    WN,
    WC,
}

impl WolfRayet {
    fn index(self) -> usize {
        self as usize
    }

    fn key(self) -> &'static str {
        match self {
            WolfRayet::WN => "WN",
            WolfRayet::WC => "WC",
        }
    }
}

/// Special classes with a single subclass level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlatClass {
    S,
    N,
    R,
    D,
}

impl FlatClass {
    pub const ALL: [FlatClass; 4] = [FlatClass::S, FlatClass::N, FlatClass::R, FlatClass::D];

    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'S' => Some(FlatClass::S),
            'N' => Some(FlatClass::N),
            'R' => Some(FlatClass::R),
            'D' => Some(FlatClass::D),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn key(self) -> &'static str {
        match self {
            FlatClass::S => "S",
            FlatClass::N => "N",
            FlatClass::R => "R",
            FlatClass::D => "D",
        }
    }
}

type SubclassRow = [Option<Rgb>; SUBCLASS_COUNT];

/// Immutable color lookup for spectral types.
///
/// Absent entries are `None`; a lookup miss is how unclassifiable types are
/// detected, so the table is sparse.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTable {
    main: [[[Option<Rgb>; 5]; SUBCLASS_COUNT]; 7],
    wolf_rayet: [SubclassRow; 2],
    flat: [SubclassRow; 4],
    carbon: Option<Rgb>,
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl ColorTable {
    /// A table with no entries
    pub fn empty() -> Self {
        Self {
            main: [[[None; 5]; SUBCLASS_COUNT]; 7],
            wolf_rayet: [[None; SUBCLASS_COUNT]; 2],
            flat: [[None; SUBCLASS_COUNT]; 4],
            carbon: None,
        }
    }

    /// The process-wide table built from the bundled dataset
    pub fn builtin() -> &'static ColorTable {
        &BUILTIN_TABLE
    }

    /// Build a table from the JSON dataset layout:
    ///
    /// ```text
    /// { "G": { "2": { "V": "#fff2e6", ... }, ... },
    ///   "WN": { "5": "#..." }, "S": { ... }, ..., "C": "#..." }
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, TableError> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut table = Self::empty();

        for (key, value) in raw {
            let mut letters = key.chars();
            let first = letters.next();
            let single = first.filter(|_| letters.next().is_none());

            if let Some(class) = single.and_then(MainClass::from_letter) {
                let part: BTreeMap<String, BTreeMap<String, String>> =
                    serde_json::from_value(value)?;
                for (subclass_key, numerals) in part {
                    let subclass = parse_subclass_key(&subclass_key)?;
                    for (numeral, color) in numerals {
                        let luminosity: Luminosity = numeral.parse()?;
                        table.set_main(class, subclass, luminosity, color.parse()?);
                    }
                }
            } else if let Some(class) = single.and_then(FlatClass::from_letter) {
                for (subclass, color) in parse_flat_part(value)? {
                    table.set_flat(class, subclass, color);
                }
            } else if key == "WN" || key == "WC" {
                let kind = if key == "WN" {
                    WolfRayet::WN
                } else {
                    WolfRayet::WC
                };
                for (subclass, color) in parse_flat_part(value)? {
                    table.set_wolf_rayet(kind, subclass, color);
                }
            } else if key == "C" {
                let color: String = serde_json::from_value(value)?;
                table.set_carbon(color.parse()?);
            } else {
                return Err(TableError::UnknownClass(key));
            }
        }

        log::debug!(
            "Built spectral color table with {} main-sequence entries",
            table.main_entries().count()
        );
        Ok(table)
    }

    /// Subclasses outside 0-9 are ignored by all setters
    pub fn set_main(&mut self, class: MainClass, subclass: u8, luminosity: Luminosity, color: Rgb) {
        if let Some(row) = self.main[class.index()].get_mut(subclass as usize) {
            row[luminosity.index()] = Some(color);
        }
    }

    pub fn set_wolf_rayet(&mut self, kind: WolfRayet, subclass: u8, color: Rgb) {
        if let Some(slot) = self.wolf_rayet[kind.index()].get_mut(subclass as usize) {
            *slot = Some(color);
        }
    }

    pub fn set_flat(&mut self, class: FlatClass, subclass: u8, color: Rgb) {
        if let Some(slot) = self.flat[class.index()].get_mut(subclass as usize) {
            *slot = Some(color);
        }
    }

    pub fn set_carbon(&mut self, color: Rgb) {
        self.carbon = Some(color);
    }

    /// Whether any luminosity class is recorded for `(class, subclass)`
    pub fn has_subclass(&self, class: MainClass, subclass: u8) -> bool {
        self.main_row(class, subclass)
            .is_some_and(|row| row.iter().any(Option::is_some))
    }

    pub fn main(&self, class: MainClass, subclass: u8, luminosity: Luminosity) -> Option<Rgb> {
        self.main_row(class, subclass)?[luminosity.index()]
    }

    pub fn wolf_rayet(&self, kind: WolfRayet, subclass: u8) -> Option<Rgb> {
        *self.wolf_rayet[kind.index()].get(subclass as usize)?
    }

    pub fn flat(&self, class: FlatClass, subclass: u8) -> Option<Rgb> {
        *self.flat[class.index()].get(subclass as usize)?
    }

    pub fn carbon(&self) -> Option<Rgb> {
        self.carbon
    }

    /// Iterate over every populated main-sequence entry
    pub fn main_entries(&self) -> impl Iterator<Item = (MainClass, u8, Luminosity, Rgb)> + '_ {
        MainClass::ALL.into_iter().flat_map(move |class| {
            (0..SUBCLASS_COUNT as u8).flat_map(move |subclass| {
                Luminosity::ALL.into_iter().filter_map(move |lum| {
                    self.main(class, subclass, lum)
                        .map(|color| (class, subclass, lum, color))
                })
            })
        })
    }

    /// Iterate over every populated flat-class entry
    pub fn flat_entries(&self) -> impl Iterator<Item = (FlatClass, u8, Rgb)> + '_ {
        FlatClass::ALL.into_iter().flat_map(move |class| {
            (0..SUBCLASS_COUNT as u8)
                .filter_map(move |subclass| self.flat(class, subclass).map(|c| (class, subclass, c)))
        })
    }

    /// Iterate over every populated Wolf-Rayet entry
    pub fn wolf_rayet_entries(&self) -> impl Iterator<Item = (WolfRayet, u8, Rgb)> + '_ {
        [WolfRayet::WN, WolfRayet::WC]
            .into_iter()
            .flat_map(move |kind| {
                (0..SUBCLASS_COUNT as u8).filter_map(move |subclass| {
                    self.wolf_rayet(kind, subclass).map(|c| (kind, subclass, c))
                })
            })
    }

    fn main_row(&self, class: MainClass, subclass: u8) -> Option<&[Option<Rgb>; 5]> {
        self.main[class.index()].get(subclass as usize)
    }
}

impl fmt::Display for WolfRayet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl fmt::Display for FlatClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

fn parse_subclass_key(key: &str) -> Result<u8, TableError> {
    match key.as_bytes() {
        [d @ b'0'..=b'9'] => Ok(d - b'0'),
        _ => Err(TableError::InvalidSubclass(key.to_string())),
    }
}

fn parse_flat_part(value: serde_json::Value) -> Result<Vec<(u8, Rgb)>, TableError> {
    let part: BTreeMap<String, String> = serde_json::from_value(value)?;
    part.iter()
        .map(|(key, color)| Ok((parse_subclass_key(key)?, color.parse()?)))
        .collect()
}
