//! Spectral-type classification.
//!
//! Catalog spectral types are free-form strings such as `G2V`, `K1.5IIIb`,
//! `sdB5`, `WC7+O5` or `SN1987A`. Classification reads the string with a
//! permissive grammar and resolves it to a display color through a
//! [`ColorTable`].
//!
//! The grammar is split in two steps:
//!
//! 1. [`SpectralClass::parse`] strips leading noise and dispatches on the
//!    class letter, producing a tagged variant.
//! 2. Each variant resolves against the table through its own small
//!    function. A miss at any point yields [`Unclassified`], which carries
//!    the original string for diagnostics.
//!
//! # Examples
//!
//! ```rust
//! use skymap::spectral::{classify, SUPERNOVA_COLOR};
//!
//! // Missing luminosity class defaults to dwarfs (V)
//! assert_eq!(classify("G2V"), classify("G2"));
//!
//! // Subclass 9.8 rounds up and rolls over into the next class
//! assert_eq!(classify("O9.8"), classify("B0V"));
//!
//! assert_eq!(classify("SN1987A").unwrap(), SUPERNOVA_COLOR);
//! assert!(classify("???").is_err());
//! ```

pub mod table;

pub use table::{ColorTable, FlatClass, Luminosity, MainClass, Rgb, TableError, WolfRayet};

use thiserror::Error;

/// Class letters recognised at the start of a spectral type
const CLASS_LETTERS: &str = "OBAFGKMWSNRDC";

/// Subclass assumed when none can be parsed
const DEFAULT_SUBCLASS: u8 = 5;

/// Fixed color for supernova remnants
pub const SUPERNOVA_COLOR: Rgb = Rgb::new(0xa9, 0xc4, 0xff);

/// A spectral type string that could not be resolved to a color
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unclassified spectral type '{0}'")]
pub struct Unclassified(pub String);

/// Tagged spectral class after leading noise has been stripped.
///
/// Borrowed slices point into the original string; nothing is copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectralClass<'a> {
    /// OBAFGKM, with `body` holding everything after the class letter and
    /// the optional nitrogen marker `N`
    Main { class: MainClass, body: &'a str },
    /// WN / WC with an optional subclass character
    WolfRayet {
        kind: WolfRayet,
        subclass: Option<char>,
    },
    /// Anything starting with `SN`
    Supernova,
    /// S, N, R, D with an optional subclass character
    Flat {
        class: FlatClass,
        subclass: Option<char>,
    },
    /// Carbon stars
    Carbon,
}

impl<'a> SpectralClass<'a> {
    /// Strip leading characters that are not class letters and dispatch on
    /// the first one found.
    ///
    /// Returns `None` when no class letter is present, or for a `W` that is
    /// not followed by `N` or `C`.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let start = raw.find(|c: char| CLASS_LETTERS.contains(c))?;
        let stripped = &raw[start..];
        let mut chars = stripped.chars();
        let letter = chars.next()?;

        if let Some(class) = MainClass::from_letter(letter) {
            let body = chars.as_str();
            let body = body.strip_prefix('N').unwrap_or(body);
            return Some(SpectralClass::Main { class, body });
        }

        if letter == 'W' {
            let kind = match chars.next() {
                Some('N') => WolfRayet::WN,
                Some('C') => WolfRayet::WC,
                _ => return None,
            };
            return Some(SpectralClass::WolfRayet {
                kind,
                subclass: chars.next(),
            });
        }

        // Checked before the generic S class
        if stripped.starts_with("SN") {
            return Some(SpectralClass::Supernova);
        }

        if let Some(class) = FlatClass::from_letter(letter) {
            return Some(SpectralClass::Flat {
                class,
                subclass: chars.next(),
            });
        }

        // Only C remains in the class letter set
        Some(SpectralClass::Carbon)
    }

    /// Resolve this class against a color table
    pub fn color(&self, table: &ColorTable) -> Option<Rgb> {
        match *self {
            SpectralClass::Main { class, body } => main_sequence_color(table, class, body),
            SpectralClass::WolfRayet { kind, subclass } => {
                table.wolf_rayet(kind, digit_or_default(subclass))
            }
            SpectralClass::Supernova => Some(SUPERNOVA_COLOR),
            SpectralClass::Flat { class, subclass } => {
                table.flat(class, digit_or_default(subclass))
            }
            SpectralClass::Carbon => table.carbon(),
        }
    }
}

/// Classifier bound to a specific color table
#[derive(Debug, Clone, Copy)]
pub struct SpectralClassifier<'t> {
    table: &'t ColorTable,
}

impl<'t> SpectralClassifier<'t> {
    pub fn new(table: &'t ColorTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'t ColorTable {
        self.table
    }

    /// Map a raw spectral type to its display color
    pub fn classify(&self, raw: &str) -> Result<Rgb, Unclassified> {
        SpectralClass::parse(raw)
            .and_then(|class| class.color(self.table))
            .ok_or_else(|| Unclassified(raw.to_string()))
    }
}

impl SpectralClassifier<'static> {
    /// Classifier over the built-in dataset
    pub fn builtin() -> Self {
        Self::new(ColorTable::builtin())
    }
}

/// Classify against the built-in table
pub fn classify(raw: &str) -> Result<Rgb, Unclassified> {
    SpectralClassifier::builtin().classify(raw)
}

fn digit_or_default(c: Option<char>) -> u8 {
    c.and_then(|c| c.to_digit(10))
        .map(|d| d as u8)
        .unwrap_or(DEFAULT_SUBCLASS)
}

fn main_sequence_color(table: &ColorTable, class: MainClass, body: &str) -> Option<Rgb> {
    let (class, subclass, rest) = match parse_leading_number(body) {
        None => (class, DEFAULT_SUBCLASS, body),
        Some((value, rest)) => {
            // Halves round toward +inf
            let rounded = (value + 0.5).floor();
            if rounded == 10.0 {
                match class.next() {
                    Some(next) => (next, 0, rest),
                    None => (class, 9, rest),
                }
            } else if (0.0..=9.0).contains(&rounded) {
                (class, rounded as u8, rest)
            } else {
                return None;
            }
        }
    };

    if !table.has_subclass(class, subclass) {
        return None;
    }

    // Qualifiers and typos before the numeral are discarded
    let rest = rest.trim_start_matches(|c: char| c != 'I' && c != 'V');
    if rest.is_empty() {
        return table.main(class, subclass, Luminosity::V);
    }
    table.main(class, subclass, parse_numeral(rest)?)
}

/// Greedy roman numeral prefix match in priority order III, II, IV, I, V
fn parse_numeral(s: &str) -> Option<Luminosity> {
    let b = s.as_bytes();
    match b {
        [b'I', b'I', b'I', ..] => Some(Luminosity::III),
        [b'I', b'I', ..] => Some(Luminosity::II),
        [b'I', b'V', ..] => Some(Luminosity::IV),
        [b'I', ..] => Some(Luminosity::I),
        [b'V', ..] => Some(Luminosity::V),
        _ => None,
    }
}

/// Parse a leading decimal number the way a lenient float reader does:
/// optional whitespace, optional sign, digits with an optional fraction and
/// an optional exponent. Returns the value and the unconsumed remainder.
fn parse_leading_number(s: &str) -> Option<(f64, &str)> {
    let trimmed = s.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    let value = trimmed[..end].parse::<f64>().ok()?;
    Some((value, &trimmed[end..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn main_color(class: MainClass, subclass: u8, lum: Luminosity) -> Rgb {
        ColorTable::builtin().main(class, subclass, lum).unwrap()
    }

    #[test]
    fn test_every_main_entry_classifies_to_itself() {
        let table = ColorTable::builtin();
        let classifier = SpectralClassifier::new(table);
        for (class, subclass, lum, color) in table.main_entries() {
            let raw = format!("{class}{subclass}{lum}");
            assert_eq!(classifier.classify(&raw), Ok(color), "type {raw}");
        }
    }

    #[test]
    fn test_every_special_entry_classifies_to_itself() {
        let table = ColorTable::builtin();
        let classifier = SpectralClassifier::new(table);
        for (kind, subclass, color) in table.wolf_rayet_entries() {
            let raw = format!("{kind}{subclass}");
            assert_eq!(classifier.classify(&raw), Ok(color), "type {raw}");
        }
        for (class, subclass, color) in table.flat_entries() {
            let raw = format!("{class}{subclass}");
            assert_eq!(classifier.classify(&raw), Ok(color), "type {raw}");
        }
    }

    #[test]
    fn test_missing_luminosity_defaults_to_dwarf() {
        assert_eq!(classify("G2V"), classify("G2"));
        assert_eq!(classify("G2").unwrap(), main_color(MainClass::G, 2, Luminosity::V));
    }

    #[test]
    fn test_rounding_clamps_m_class() {
        assert_eq!(classify("M9.5").unwrap(), main_color(MainClass::M, 9, Luminosity::V));
    }

    #[test]
    fn test_negative_half_rounds_up_to_zero() {
        assert_eq!(classify("G-0.5V").unwrap(), main_color(MainClass::G, 0, Luminosity::V));
        assert!(classify("G-0.6V").is_err());
    }

    #[test]
    fn test_rounding_rolls_over_to_next_class() {
        assert_eq!(classify("O9.8").unwrap(), main_color(MainClass::B, 0, Luminosity::V));
        assert_eq!(classify("G9.6III").unwrap(), main_color(MainClass::K, 0, Luminosity::III));
    }

    #[rstest]
    #[case("K1.5III", MainClass::K, 2, Luminosity::III)]
    #[case("G8III-IV", MainClass::G, 8, Luminosity::III)]
    #[case("B2IVe", MainClass::B, 2, Luminosity::IV)]
    #[case("A1Vm", MainClass::A, 1, Luminosity::V)]
    #[case("F5Ib", MainClass::F, 5, Luminosity::I)]
    #[case("M1.5Iab", MainClass::M, 2, Luminosity::I)]
    #[case("K0II", MainClass::K, 0, Luminosity::II)]
    #[case("sdB6", MainClass::B, 6, Luminosity::V)]
    #[case("Am", MainClass::A, 5, Luminosity::V)]
    #[case("kA2hF0mA5 V", MainClass::A, 2, Luminosity::V)]
    #[case("ON9.7Iab", MainClass::B, 0, Luminosity::I)]
    #[case("G 2 V", MainClass::G, 2, Luminosity::V)]
    fn test_main_sequence_grammar(
        #[case] raw: &str,
        #[case] class: MainClass,
        #[case] subclass: u8,
        #[case] lum: Luminosity,
    ) {
        assert_eq!(classify(raw).unwrap(), main_color(class, subclass, lum), "type {raw}");
    }

    #[rstest]
    #[case("")]
    #[case("???")]
    #[case("xyz")]
    #[case("O1V")] // no O1 row in the dataset
    #[case("B12V")]
    #[case("G-1V")]
    #[case("M9I")] // subclass present, numeral absent
    #[case("WR")]
    #[case("S0")]
    fn test_unclassified(#[case] raw: &str) {
        assert_eq!(classify(raw), Err(Unclassified(raw.to_string())));
    }

    #[test]
    fn test_supernova_checked_before_s_class() {
        assert_eq!(classify("SN1987A").unwrap(), SUPERNOVA_COLOR);
        assert_eq!(classify("SNIa G2V").unwrap(), SUPERNOVA_COLOR);
        assert_eq!(classify("SN").unwrap(), Rgb::new(169, 196, 255));
    }

    #[test]
    fn test_wolf_rayet_default_subclass() {
        let table = ColorTable::builtin();
        assert_eq!(classify("WN").unwrap(), table.wolf_rayet(WolfRayet::WN, 5).unwrap());
        assert_eq!(classify("WC7+O5").unwrap(), table.wolf_rayet(WolfRayet::WC, 7).unwrap());
        assert_eq!(classify("WNh").unwrap(), table.wolf_rayet(WolfRayet::WN, 5).unwrap());
    }

    #[test]
    fn test_flat_classes() {
        let table = ColorTable::builtin();
        assert_eq!(classify("DA2").unwrap(), table.flat(FlatClass::D, 5).unwrap());
        assert_eq!(classify("S3/2").unwrap(), table.flat(FlatClass::S, 3).unwrap());
        assert_eq!(classify("R").unwrap(), table.flat(FlatClass::R, 5).unwrap());
        assert_eq!(classify("N3").unwrap(), table.flat(FlatClass::N, 3).unwrap());
    }

    #[test]
    fn test_carbon() {
        let carbon = ColorTable::builtin().carbon().unwrap();
        assert_eq!(classify("C").unwrap(), carbon);
        assert_eq!(classify("C5,4").unwrap(), carbon);
        assert_eq!(classify("CH").unwrap(), carbon);
    }

    #[test]
    fn test_custom_table() {
        let mut table = ColorTable::empty();
        table.set_main(MainClass::G, 2, Luminosity::V, Rgb::new(1, 2, 3));
        let classifier = SpectralClassifier::new(&table);
        assert_eq!(classifier.classify("G2"), Ok(Rgb::new(1, 2, 3)));
        assert!(classifier.classify("G3").is_err());
        assert!(classifier.classify("C").is_err());
        assert_eq!(classifier.classify("SN").unwrap(), SUPERNOVA_COLOR);
    }

    #[test]
    fn test_parse_dispatch() {
        assert_eq!(
            SpectralClass::parse("xxG2V"),
            Some(SpectralClass::Main {
                class: MainClass::G,
                body: "2V"
            })
        );
        assert_eq!(
            SpectralClass::parse("WC8"),
            Some(SpectralClass::WolfRayet {
                kind: WolfRayet::WC,
                subclass: Some('8')
            })
        );
        assert_eq!(SpectralClass::parse("SN2011fe"), Some(SpectralClass::Supernova));
        assert_eq!(SpectralClass::parse("C"), Some(SpectralClass::Carbon));
        assert_eq!(SpectralClass::parse("WX"), None);
        assert_eq!(SpectralClass::parse("123"), None);
    }

    #[test]
    fn test_parse_leading_number() {
        assert_eq!(parse_leading_number("2V"), Some((2.0, "V")));
        assert_eq!(parse_leading_number("1.5III"), Some((1.5, "III")));
        assert_eq!(parse_leading_number(".5"), Some((0.5, "")));
        assert_eq!(parse_leading_number(" 3e"), Some((3.0, "e")));
        assert_eq!(parse_leading_number("2e1x"), Some((20.0, "x")));
        assert_eq!(parse_leading_number("III"), None);
        assert_eq!(parse_leading_number("."), None);
        assert_eq!(parse_leading_number("-"), None);
    }

    #[test]
    fn test_parse_numeral_priority() {
        assert_eq!(parse_numeral("III"), Some(Luminosity::III));
        assert_eq!(parse_numeral("IIb"), Some(Luminosity::II));
        assert_eq!(parse_numeral("IV-V"), Some(Luminosity::IV));
        assert_eq!(parse_numeral("Iab"), Some(Luminosity::I));
        assert_eq!(parse_numeral("V"), Some(Luminosity::V));
        assert_eq!(parse_numeral("x"), None);
    }
}
