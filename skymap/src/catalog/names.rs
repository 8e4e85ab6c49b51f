//! Display names from catalog designations.
//!
//! Source catalogs use SIMBAD-style identifiers: `NAME Betelgeuse`,
//! `* alf Ori`, `* 61 Cyg A`. These are turned into readable names such as
//! `Betelgeuse`, `Betelgeuse (α Orionis)` or `61 Cygni A`.

use std::collections::HashMap;

/// SIMBAD Greek-letter abbreviations
const GREEK_LETTERS: [(&str, &str); 24] = [
    ("alf", "α"),
    ("bet", "β"),
    ("gam", "γ"),
    ("del", "δ"),
    ("eps", "ε"),
    ("zet", "ζ"),
    ("eta", "η"),
    ("tet", "θ"),
    ("iot", "ι"),
    ("kap", "κ"),
    ("lam", "λ"),
    ("mu.", "μ"),
    ("nu.", "ν"),
    ("ksi", "ξ"),
    ("omi", "ο"),
    ("pi.", "π"),
    ("rho", "ρ"),
    ("sig", "σ"),
    ("tau", "τ"),
    ("ups", "υ"),
    ("phi", "φ"),
    ("chi", "χ"),
    ("psi", "ψ"),
    ("ome", "ω"),
];

/// IAU constellation abbreviations and their genitive forms
const CONSTELLATIONS: [(&str, &str); 88] = [
    ("And", "Andromedae"),
    ("Ant", "Antliae"),
    ("Aps", "Apodis"),
    ("Aqr", "Aquarii"),
    ("Aql", "Aquilae"),
    ("Ara", "Arae"),
    ("Ari", "Arietis"),
    ("Aur", "Aurigae"),
    ("Boo", "Boötis"),
    ("Cae", "Caeli"),
    ("Cam", "Camelopardalis"),
    ("Cnc", "Cancri"),
    ("CVn", "Canum Venaticorum"),
    ("CMa", "Canis Majoris"),
    ("CMi", "Canis Minoris"),
    ("Cap", "Capricorni"),
    ("Car", "Carinae"),
    ("Cas", "Cassiopeiae"),
    ("Cen", "Centauri"),
    ("Cep", "Cephei"),
    ("Cet", "Ceti"),
    ("Cha", "Chamaeleontis"),
    ("Cir", "Circini"),
    ("Col", "Columbae"),
    ("Com", "Comae Berenices"),
    ("CrA", "Coronae Australis"),
    ("CrB", "Coronae Borealis"),
    ("Crv", "Corvi"),
    ("Crt", "Crateris"),
    ("Cru", "Crucis"),
    ("Cyg", "Cygni"),
    ("Del", "Delphini"),
    ("Dor", "Doradus"),
    ("Dra", "Draconis"),
    ("Equ", "Equulei"),
    ("Eri", "Eridani"),
    ("For", "Fornacis"),
    ("Gem", "Geminorum"),
    ("Gru", "Gruis"),
    ("Her", "Herculis"),
    ("Hor", "Horologii"),
    ("Hya", "Hydrae"),
    ("Hyi", "Hydri"),
    ("Ind", "Indi"),
    ("Lac", "Lacertae"),
    ("Leo", "Leonis"),
    ("LMi", "Leonis Minoris"),
    ("Lep", "Leporis"),
    ("Lib", "Librae"),
    ("Lup", "Lupi"),
    ("Lyn", "Lyncis"),
    ("Lyr", "Lyrae"),
    ("Men", "Mensae"),
    ("Mic", "Microscopii"),
    ("Mon", "Monocerotis"),
    ("Mus", "Muscae"),
    ("Nor", "Normae"),
    ("Oct", "Octantis"),
    ("Oph", "Ophiuchi"),
    ("Ori", "Orionis"),
    ("Pav", "Pavonis"),
    ("Peg", "Pegasi"),
    ("Per", "Persei"),
    ("Phe", "Phoenicis"),
    ("Pic", "Pictoris"),
    ("Psc", "Piscium"),
    ("PsA", "Piscis Austrini"),
    ("Pup", "Puppis"),
    ("Pyx", "Pyxidis"),
    ("Ret", "Reticuli"),
    ("Sge", "Sagittae"),
    ("Sgr", "Sagittarii"),
    ("Sco", "Scorpii"),
    ("Scl", "Sculptoris"),
    ("Sct", "Scuti"),
    ("Ser", "Serpentis"),
    ("Sex", "Sextantis"),
    ("Tau", "Tauri"),
    ("Tel", "Telescopii"),
    ("Tri", "Trianguli"),
    ("TrA", "Trianguli Australis"),
    ("Tuc", "Tucanae"),
    ("UMa", "Ursae Majoris"),
    ("UMi", "Ursae Minoris"),
    ("Vel", "Velorum"),
    ("Vir", "Virginis"),
    ("Vol", "Volantis"),
    ("Vul", "Vulpeculae"),
];

/// Greek letter for a SIMBAD abbreviation (`alf`, `mu.`, ...)
pub fn greek_letter(abbr: &str) -> Option<&'static str> {
    GREEK_LETTERS
        .iter()
        .find(|(key, _)| *key == abbr)
        .map(|(_, letter)| *letter)
}

/// Genitive form for an IAU constellation abbreviation
pub fn constellation_genitive(abbr: &str) -> Option<&'static str> {
    CONSTELLATIONS
        .iter()
        .find(|(key, _)| *key == abbr)
        .map(|(_, genitive)| *genitive)
}

/// Proper star names keyed by their Bayer designation
/// (`α Canis Majoris` → `Sirius`)
#[derive(Debug, Clone, Default)]
pub struct ProperNames {
    by_designation: HashMap<String, String>,
}

impl ProperNames {
    /// Parse a `;`-separated star name list.
    ///
    /// Columns 0, 2 and 3 hold the proper name, the Greek letter and the
    /// constellation abbreviation. Rows with too few columns or an unknown
    /// constellation are skipped.
    pub fn from_csv_str(text: &str) -> Self {
        let mut by_designation = HashMap::new();
        for line in text.lines() {
            let fields: Vec<&str> = line.split(';').map(str::trim).collect();
            if fields.len() < 4 || fields[0].is_empty() {
                continue;
            }
            let Some(genitive) = constellation_genitive(fields[3]) else {
                log::debug!("Skipping star name row with unknown constellation: {line}");
                continue;
            };
            by_designation.insert(format!("{} {}", fields[2], genitive), fields[0].to_string());
        }
        Self { by_designation }
    }

    pub fn insert(&mut self, designation: impl Into<String>, name: impl Into<String>) {
        self.by_designation.insert(designation.into(), name.into());
    }

    pub fn get(&self, designation: &str) -> Option<&str> {
        self.by_designation.get(designation).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_designation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_designation.is_empty()
    }
}

/// Turn a catalog designation into a display name
pub fn display_name(raw: &str, proper_names: Option<&ProperNames>) -> String {
    let collapsed = collapse_spaces(raw);

    if let Some(name) = collapsed.strip_prefix("NAME ") {
        return name.to_string();
    }

    let Some(star) = collapsed.strip_prefix("* ") else {
        return collapsed;
    };

    let mut parts = star.split(' ');
    let (Some(designator), Some(abbr)) = (parts.next(), parts.next()) else {
        return collapsed;
    };
    let component = parts.next();

    // `alf01` and `alf02` both read as α
    let prefix: String = designator.chars().take(3).collect();
    let letter = greek_letter(&prefix).unwrap_or(designator);
    let genitive = constellation_genitive(abbr).unwrap_or(abbr);

    let designation = format!("{letter} {genitive}");
    match component {
        Some(component) => format!("{designation} {component}"),
        None => match proper_names.and_then(|names| names.get(&designation)) {
            Some(proper) => format!("{proper} ({designation})"),
            None => designation,
        },
    }
}

fn collapse_spaces(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut previous_space = false;
    for c in raw.chars() {
        if c == ' ' {
            if !previous_space {
                out.push(c);
            }
            previous_space = true;
        } else {
            out.push(c);
            previous_space = false;
        }
    }
    out
}
